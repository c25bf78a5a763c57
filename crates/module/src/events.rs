//! Events emitted by successful auction operations.

use auctions_types::{Address, Bid, Coin, Coins, Params};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// An event recorded in the block's event log.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// A bid became the round's highest bid.
    Bid {
        round: u64,
        #[serde_as(as = "Hex")]
        sender: Address,
        amount: Coin,
        /// Bid released back to its bidder by this one
        refunded: Option<Bid>,
    },

    /// Coins were added to the round's pot.
    DepositCoin {
        round: u64,
        #[serde_as(as = "Hex")]
        sender: Address,
        amount: Coins,
    },

    /// Parameters were replaced.
    UpdateParams { params: Params },

    /// A round closed with a winner.
    RoundSettled {
        round: u64,
        #[serde_as(as = "Hex")]
        winner: Address,
        /// Pot paid to the winner
        coins: Coins,
        /// Winning bid removed from supply
        burned: Coin,
    },

    /// A round closed without bids; its pot seeds the next round.
    RoundRolledOver { round: u64, pot: Coins },
}
