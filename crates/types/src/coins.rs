//! Single- and multi-asset amounts.
//!
//! `Coins` keeps its entries ordered by denomination and never stores a zero
//! amount, so two balances with the same contents always compare, hash and
//! serialize identically on every node.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors produced while building or combining coin amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsError {
    #[error("invalid denomination: {0:?}")]
    InvalidDenom(String),

    #[error("amount for {0} must be positive")]
    ZeroAmount(String),

    #[error("amount overflow for {0}")]
    Overflow(String),
}

/// Check that a denomination is well formed.
///
/// Accepts 3 to 128 characters: a leading ASCII letter followed by ASCII
/// alphanumerics or one of `/ : . _ -`.
pub fn validate_denom(denom: &str) -> Result<(), CoinsError> {
    let bytes = denom.as_bytes();
    let valid_len = (3..=128).contains(&bytes.len());
    let valid_head = bytes.first().is_some_and(|b| b.is_ascii_alphabetic());
    let valid_tail = bytes
        .iter()
        .skip(1)
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'));

    if valid_len && valid_head && valid_tail {
        Ok(())
    } else {
        Err(CoinsError::InvalidDenom(denom.to_string()))
    }
}

/// An amount of a single asset.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Coin {
    pub denom: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Reject malformed denominations and zero amounts.
    pub fn validate(&self) -> Result<(), CoinsError> {
        validate_denom(&self.denom)?;
        if self.amount == 0 {
            return Err(CoinsError::ZeroAmount(self.denom.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A multi-asset amount.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(into = "Vec<Coin>", try_from = "Vec<Coin>")]
pub struct Coins(BTreeMap<String, u128>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a balance from a list of coins, merging repeated denominations.
    ///
    /// Every entry must be valid; a zero entry is an error rather than being
    /// silently dropped.
    pub fn from_coins(coins: impl IntoIterator<Item = Coin>) -> Result<Self, CoinsError> {
        let mut map = BTreeMap::new();
        for coin in coins {
            coin.validate()?;
            let entry: &mut u128 = map.entry(coin.denom.clone()).or_default();
            *entry = entry
                .checked_add(coin.amount)
                .ok_or(CoinsError::Overflow(coin.denom))?;
        }
        Ok(Self(map))
    }

    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn contains_denom(&self, denom: &str) -> bool {
        self.0.contains_key(denom)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u128)> + '_ {
        self.0
            .iter()
            .map(|(denom, amount)| (denom.as_str(), *amount))
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<Coin> {
        self.iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect()
    }

    /// Add `other` into `self`. On overflow `self` is left untouched.
    pub fn add(&mut self, other: &Coins) -> Result<(), CoinsError> {
        let mut next = self.0.clone();
        for (denom, amount) in other.iter() {
            let entry = next.entry(denom.to_string()).or_default();
            *entry = entry
                .checked_add(amount)
                .ok_or_else(|| CoinsError::Overflow(denom.to_string()))?;
        }
        self.0 = next;
        Ok(())
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        let mut map = BTreeMap::new();
        if coin.amount > 0 {
            map.insert(coin.denom, coin.amount);
        }
        Self(map)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.to_vec()
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinsError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::from_coins(coins)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<empty>");
        }
        for (i, (denom, amount)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", amount, denom)?;
        }
        Ok(())
    }
}
