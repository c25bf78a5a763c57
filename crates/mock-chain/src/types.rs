//! RPC-compatible types for the mock chain.
//!
//! Amounts travel as decimal strings and addresses as hex, matching the
//! serde representation of the core types.

use auctions_module::{AuctionError, AuctionEvent};
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};

/// Block info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
}

/// Result of ending a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedBlockRpc {
    /// Height that was committed
    pub height: u64,
    /// Settlement or rollover performed at that height
    pub settlement: Option<AuctionEvent>,
}

/// Result of a delivered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    /// Block the message was included in
    pub height: u64,
    pub event: AuctionEvent,
}

/// Structured data attached to a rejected message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionRpc {
    pub code: u32,
    pub kind: String,
}

/// JSON-RPC error code for rejected messages.
pub const REJECTED: i32 = -32000;

/// JSON-RPC error code for malformed request parameters.
pub const INVALID_PARAMS: i32 = -32602;

pub fn rejection(err: &AuctionError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        REJECTED,
        err.to_string(),
        Some(RejectionRpc {
            code: err.code(),
            kind: err.kind().to_string(),
        }),
    )
}

pub fn invalid_params(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(INVALID_PARAMS, msg.into(), None::<()>)
}
