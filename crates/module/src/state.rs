//! On-chain state structures for the auction module.

use auctions_types::{module_address, Address, AuctionInfo, Bid, Coins, Params, Round, MODULE_NAME};
use borsh::{BorshDeserialize, BorshSerialize};

/// Auction module state: the parameter store and the live round.
///
/// Funds are not stored here. The pot and the locked bid are balances of
/// `escrow_account` in the ledger; `round` records how they are attributed.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AuctionState {
    /// Governance-controlled parameters
    pub params: Params,

    /// Denomination every bid is placed in, fixed at genesis
    pub bid_denom: String,

    /// The open round
    pub round: Round,

    /// Module account holding the pot and the locked bid
    pub escrow_account: Address,
}

impl AuctionState {
    /// Create state with round 0 opening at `start_height`.
    pub fn new(params: Params, bid_denom: impl Into<String>, start_height: u64) -> Self {
        let end_height = start_height.saturating_add(params.round_duration);
        Self {
            params,
            bid_denom: bid_denom.into(),
            round: Round::new(0, end_height, Coins::new()),
            escrow_account: module_address(MODULE_NAME),
        }
    }

    /// The bid currently locked in escrow, if any.
    pub fn locked_bid(&self) -> Option<&Bid> {
        self.round.highest_bid.as_ref()
    }

    /// Amount of the bid denomination locked in escrow for the current round.
    pub fn locked_bid_amount(&self) -> u128 {
        self.locked_bid().map(|bid| bid.amount.amount).unwrap_or(0)
    }

    /// Replace the live round with the next one, seeded with `pot`.
    ///
    /// The new round ends `round_duration` blocks after `height`, using the
    /// parameters in force right now.
    pub fn open_next_round(&mut self, height: u64, pot: Coins) -> &Round {
        let number = self.round.number + 1;
        let end_height = height.saturating_add(self.params.round_duration);
        self.round = Round::new(number, end_height, pot);
        &self.round
    }

    /// Restart the live round's window at `height`, keeping its number, pot and bid.
    pub fn restart_round_window(&mut self, height: u64) {
        self.round.end_height = height.saturating_add(self.params.round_duration);
    }

    /// Snapshot for the `AuctionInfo` query.
    pub fn auction_info(&self) -> AuctionInfo {
        AuctionInfo {
            round: self.round.number,
            end_height: self.round.end_height,
            bid_denom: self.bid_denom.clone(),
            pot: self.round.pot.clone(),
            highest_bid: self.round.highest_bid.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auctions_types::Coin;

    #[test]
    fn test_new_state_opens_round_zero() {
        let state = AuctionState::new(Params::default(), "ubid", 1000);
        assert_eq!(state.round.number, 0);
        assert_eq!(state.round.end_height, 1100);
        assert!(state.round.pot.is_empty());
        assert_eq!(state.locked_bid_amount(), 0);
        assert_eq!(state.escrow_account, module_address("auctions"));
    }

    #[test]
    fn test_open_next_round_uses_current_duration() {
        let mut state = AuctionState::new(Params::default(), "ubid", 1000);
        state.params.round_duration = 10;
        let pot = Coins::from(Coin::new("uatom", 500));

        let round = state.open_next_round(1100, pot.clone());
        assert_eq!(round.number, 1);
        assert_eq!(round.end_height, 1110);
        assert_eq!(round.pot, pot);
        assert!(round.highest_bid.is_none());
    }

    #[test]
    fn test_locked_bid_amount() {
        let mut state = AuctionState::new(Params::default(), "ubid", 0);
        state.round.highest_bid = Some(Bid {
            bidder: [1u8; 32],
            amount: Coin::new("ubid", 60),
        });
        assert_eq!(state.locked_bid_amount(), 60);
        assert_eq!(state.auction_info().highest_bid.unwrap().amount.amount, 60);
    }
}
