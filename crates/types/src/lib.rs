//! Core type definitions for the rolling auctions module.
//!
//! This crate provides the shared data structures used across the workspace:
//! account addresses, coin amounts, module parameters and the round snapshot
//! returned by queries.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use thiserror::Error;

pub mod coins;

pub use coins::{validate_denom, Coin, Coins, CoinsError};

// =========================
// ACCOUNTS
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Name of the auctions module; also seeds its escrow account address.
pub const MODULE_NAME: &str = "auctions";

/// Derive the address of a module-owned account.
///
/// Module accounts have no private key; their address is a domain-separated
/// hash of the module name.
pub fn module_address(name: &str) -> Address {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"module:");
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid hex address: {0}")]
    InvalidHex(String),

    #[error("address must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Parse a hex address, with or without a `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| AddressError::InvalidLength(len))
}

/// Hex-encode an address with a `0x` prefix.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

// =========================
// PARAMETERS
// =========================

/// Default number of blocks per auction round.
pub const DEFAULT_ROUND_DURATION: u64 = 100;

/// Default denomination bids are placed in.
pub const DEFAULT_BID_DENOM: &str = "ubid";

/// Governance-controlled module parameters.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Params {
    /// Whether bidding, deposits and settlement are active
    pub enabled: bool,
    /// Number of blocks per round
    pub round_duration: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
            round_duration: DEFAULT_ROUND_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("round duration must be positive")]
    ZeroRoundDuration,
}

impl Params {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.round_duration == 0 {
            return Err(ParamsError::ZeroRoundDuration);
        }
        Ok(())
    }
}

// =========================
// ROUNDS
// =========================

/// The current highest bid of a round.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Bid {
    #[serde_as(as = "Hex")]
    pub bidder: Address,
    pub amount: Coin,
}

/// One auction cycle.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Round {
    /// Rounds completed since activation
    pub number: u64,
    /// Height at which the round settles
    pub end_height: u64,
    /// Revenue accumulated for the winner, held by the escrow account
    pub pot: Coins,
    /// Absent until the first valid bid of the round
    pub highest_bid: Option<Bid>,
}

impl Round {
    pub fn new(number: u64, end_height: u64, pot: Coins) -> Self {
        Self {
            number,
            end_height,
            pot,
            highest_bid: None,
        }
    }
}

/// Snapshot of the live round returned by the `AuctionInfo` query.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionInfo {
    pub round: u64,
    pub end_height: u64,
    pub bid_denom: String,
    pub pot: Coins,
    pub highest_bid: Option<Bid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_address_is_stable_and_distinct() {
        assert_eq!(module_address(MODULE_NAME), module_address("auctions"));
        assert_ne!(module_address("auctions"), module_address("bank"));
    }

    #[test]
    fn test_parse_address() {
        let addr = [7u8; 32];
        let encoded = format_address(&addr);
        assert!(encoded.starts_with("0x"));
        assert_eq!(parse_address(&encoded).unwrap(), addr);
        assert_eq!(parse_address(&hex::encode(addr)).unwrap(), addr);
        assert_eq!(parse_address("0xabcd"), Err(AddressError::InvalidLength(2)));
        let invalid = parse_address("zz");
        assert!(matches!(invalid, Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn test_params_validate() {
        assert!(Params::default().validate().is_ok());
        let params = Params {
            enabled: true,
            round_duration: 0,
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroRoundDuration));
    }

    #[test]
    fn test_bid_json_hex_bidder() {
        let bid = Bid {
            bidder: [1u8; 32],
            amount: Coin::new("ubid", 50),
        };
        let value = serde_json::to_value(&bid).unwrap();
        assert_eq!(value["bidder"], hex::encode([1u8; 32]));
        assert_eq!(value["amount"]["amount"], "50");
    }

    #[test]
    fn test_round_borsh() {
        let round = Round::new(3, 1200, Coins::from(Coin::new("uatom", 9)));
        let encoded = borsh::to_vec(&round).unwrap();
        let decoded: Round = borsh::from_slice(&encoded).unwrap();
        assert_eq!(round, decoded);
    }
}
