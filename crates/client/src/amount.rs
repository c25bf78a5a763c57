//! Parsing of coin amounts given on the command line.
//!
//! Amounts are written the way chain tooling usually prints them: the
//! integer amount immediately followed by the denomination (`100ubid`), and
//! several of them separated by commas (`10uatom,5uosmo`).

use auctions_types::{Coin, Coins, CoinsError};
use thiserror::Error;

/// Errors that can occur while parsing an amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid coin {0:?}: expected <amount><denom>, e.g. 100ubid")]
    Malformed(String),

    #[error("Amount too large in {0:?}")]
    TooLarge(String),

    #[error(transparent)]
    Coins(#[from] CoinsError),
}

/// Parse a single coin such as `100ubid`.
pub fn parse_coin(input: &str) -> Result<Coin, AmountError> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| AmountError::Malformed(input.to_string()))?;
    let (digits, denom) = input.split_at(split);
    if digits.is_empty() {
        return Err(AmountError::Malformed(input.to_string()));
    }

    let amount = digits
        .parse::<u128>()
        .map_err(|_| AmountError::TooLarge(input.to_string()))?;
    let coin = Coin::new(denom, amount);
    coin.validate()?;
    Ok(coin)
}

/// Parse a comma-separated list such as `10uatom,5uosmo`.
pub fn parse_coins(input: &str) -> Result<Coins, AmountError> {
    let coins = input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_coin)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Coins::from_coins(coins)?)
}
