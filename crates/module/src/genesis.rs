//! Genesis configuration for the auction module.
//!
//! This module defines the initial state and configuration for the auction
//! system when the chain starts, and the export used to restart a chain from
//! a live state.

use crate::state::AuctionState;
use auctions_types::{
    module_address, validate_denom, Address, CoinsError, Params, ParamsError, Round,
    DEFAULT_BID_DENOM,
};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Genesis configuration for the auction module.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionGenesisConfig {
    /// Initial module parameters
    pub params: Params,

    /// Denomination bids are placed in
    pub bid_denom: String,

    /// Round to resume from; a fresh round 0 is opened when absent
    #[serde(default)]
    pub round: Option<Round>,

    /// Account allowed to update parameters (governance)
    #[serde_as(as = "Hex")]
    pub authority: Address,
}

impl Default for AuctionGenesisConfig {
    fn default() -> Self {
        Self {
            params: Params::default(),
            bid_denom: DEFAULT_BID_DENOM.to_string(),
            round: None,
            authority: module_address("gov"),
        }
    }
}

impl AuctionGenesisConfig {
    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        self.params.validate()?;

        validate_denom(&self.bid_denom)
            .map_err(|_| GenesisValidationError::InvalidBidDenom(self.bid_denom.clone()))?;

        if let Some(round) = &self.round {
            for coin in round.pot.to_vec() {
                coin.validate()?;
            }
            if round.pot.contains_denom(&self.bid_denom) {
                return Err(GenesisValidationError::PotContainsBidDenom(
                    self.bid_denom.clone(),
                ));
            }
            if let Some(bid) = &round.highest_bid {
                if bid.amount.denom != self.bid_denom || bid.amount.amount == 0 {
                    return Err(GenesisValidationError::InvalidHighestBid(
                        bid.amount.to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Build the module state from a validated genesis config.
///
/// `height` is the chain's initial height; a fresh round 0 ends
/// `round_duration` blocks after it. The host is responsible for funding the
/// escrow account with any pot and locked bid carried by `config.round`.
pub fn init_genesis(
    config: &AuctionGenesisConfig,
    height: u64,
) -> Result<AuctionState, GenesisValidationError> {
    config.validate()?;

    let mut state = AuctionState::new(config.params.clone(), config.bid_denom.clone(), height);
    if let Some(round) = &config.round {
        state.round = round.clone();
    }
    Ok(state)
}

/// Export the live state as a genesis config.
pub fn export_genesis(state: &AuctionState, authority: Address) -> AuctionGenesisConfig {
    AuctionGenesisConfig {
        params: state.params.clone(),
        bid_denom: state.bid_denom.clone(),
        round: Some(state.round.clone()),
        authority,
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Invalid params: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Invalid bid denomination: {0:?}")]
    InvalidBidDenom(String),

    #[error("Invalid pot: {0}")]
    InvalidPot(#[from] CoinsError),

    #[error("Pot must not contain the bid denomination {0}")]
    PotContainsBidDenom(String),

    #[error("Invalid highest bid: {0}")]
    InvalidHighestBid(String),
}
