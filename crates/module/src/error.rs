//! Auction module error types.

use thiserror::Error;

use crate::ledger::LedgerError;
use auctions_types::{Coin, CoinsError, ParamsError};

/// Errors that can occur in the auction module.
///
/// Every variant is raised before the operation mutates anything, except
/// `Ledger` during settlement, which aborts the whole block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("auctions are disabled")]
    Disabled,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("bid must be greater than current highest bid {highest}")]
    BidTooLow { highest: Coin },

    #[error("not authorized: {0} is not the module authority")]
    Unauthorized(String),

    #[error("invalid params: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AuctionError {
    /// Stable numeric error kind surfaced to callers alongside the message.
    pub fn code(&self) -> u32 {
        match self {
            AuctionError::Disabled => 2,
            AuctionError::InvalidAmount(_) => 3,
            AuctionError::BidTooLow { .. } => 4,
            AuctionError::Ledger(LedgerError::InsufficientFunds { .. }) => 5,
            AuctionError::Unauthorized(_) => 6,
            AuctionError::InvalidParams(_) => 7,
            AuctionError::Ledger(_) => 8,
        }
    }

    /// Stable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuctionError::Disabled => "disabled",
            AuctionError::InvalidAmount(_) => "invalid_amount",
            AuctionError::BidTooLow { .. } => "bid_too_low",
            AuctionError::Ledger(LedgerError::InsufficientFunds { .. }) => "insufficient_funds",
            AuctionError::Unauthorized(_) => "unauthorized",
            AuctionError::InvalidParams(_) => "invalid_params",
            AuctionError::Ledger(_) => "ledger",
        }
    }

    /// Whether the error came from a caller-supplied amount the ledger could not cover.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            AuctionError::Ledger(LedgerError::InsufficientFunds { .. })
        )
    }
}

impl From<CoinsError> for AuctionError {
    fn from(err: CoinsError) -> Self {
        AuctionError::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_too_low_surfaces_highest_bid() {
        let err = AuctionError::BidTooLow {
            highest: Coin::new("ubid", 50),
        };
        assert_eq!(
            err.to_string(),
            "bid must be greater than current highest bid 50ubid"
        );
        assert_eq!(err.code(), 4);
    }

    #[test]
    fn test_insufficient_funds_code() {
        let err = AuctionError::from(LedgerError::InsufficientFunds {
            account: "0x01".into(),
            denom: "ubid".into(),
            required: 10,
            available: 3,
        });
        assert!(err.is_insufficient_funds());
        assert_eq!(err.code(), 5);

        let overflow = AuctionError::from(LedgerError::Overflow("ubid".into()));
        assert_eq!(overflow.code(), 8);
    }
}
