//! End-of-block round scheduling.
//!
//! The host calls [`end_block`] once per block, after every message of that
//! block has been applied. When the open round has reached its end height it
//! is settled and the next round opens.

use crate::events::AuctionEvent;
use crate::handlers::{HandlerResult, ModuleContext};
use crate::ledger::Ledger;
use auctions_types::{format_address, Coins};
use tracing::{debug, info};

/// Settle the open round if `height` has reached its end height.
///
/// With a winner, the pot goes to the highest bidder and the winning bid is
/// disposed of. Without one, the pot carries into the next round. Returns
/// `None` when nothing was due, so repeated calls at one height settle at most
/// once.
///
/// A ledger error here leaves the ledger partially updated; the host must
/// discard the whole block.
pub fn end_block<L: Ledger + ?Sized>(
    module: &mut ModuleContext<'_, L>,
    height: u64,
) -> HandlerResult<Option<AuctionEvent>> {
    let state = &mut *module.state;

    if !state.params.enabled || height < state.round.end_height {
        return Ok(None);
    }

    let closing = state.round.clone();
    let escrow = state.escrow_account;

    let event = match closing.highest_bid {
        Some(winner) => {
            if !closing.pot.is_empty() {
                module
                    .ledger
                    .transfer(&escrow, &winner.bidder, &closing.pot)?;
            }
            module
                .ledger
                .dispose(&escrow, &Coins::from(winner.amount.clone()))?;

            info!(
                round = closing.number,
                winner = %format_address(&winner.bidder),
                pot = %closing.pot,
                burned = %winner.amount,
                "Round settled"
            );

            state.open_next_round(height, Coins::new());
            AuctionEvent::RoundSettled {
                round: closing.number,
                winner: winner.bidder,
                coins: closing.pot,
                burned: winner.amount,
            }
        }
        None => {
            info!(
                round = closing.number,
                pot = %closing.pot,
                "Round closed without bids, pot rolls over"
            );

            state.open_next_round(height, closing.pot.clone());
            AuctionEvent::RoundRolledOver {
                round: closing.number,
                pot: closing.pot,
            }
        }
    };

    debug!(
        round = state.round.number,
        end_height = state.round.end_height,
        "Round opened"
    );

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuctionError;
    use crate::handlers::{handle_bid, handle_deposit_coin, CallContext};
    use crate::ledger::{Bank, LedgerError};
    use crate::state::AuctionState;
    use auctions_types::{Address, Bid, Coin, Params};

    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];
    const GOV: Address = [9u8; 32];

    fn setup() -> (AuctionState, Bank) {
        let mut bank = Bank::new();
        let funds = Coins::from_coins(vec![Coin::new("ubid", 1_000), Coin::new("uatom", 2_000)]);
        let funds = funds.unwrap();
        for who in [ALICE, BOB] {
            bank.mint(&who, &funds).unwrap();
        }
        (AuctionState::new(Params::default(), "ubid", 1000), bank)
    }

    fn ctx(sender: Address) -> CallContext {
        CallContext {
            sender,
            block_height: 1050,
        }
    }

    #[test]
    fn test_no_op_before_end_height() {
        let (mut state, mut bank) = setup();
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        assert_eq!(end_block(&mut module, 1099).unwrap(), None);
        assert_eq!(state.round.number, 0);
    }

    #[test]
    fn test_settles_with_winner() {
        let (mut state, mut bank) = setup();
        let escrow = state.escrow_account;
        {
            let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);
            let deposit = Coins::from(Coin::new("uatom", 1_000));
            handle_deposit_coin(&mut module, &ctx(ALICE), deposit).unwrap();
            handle_bid(&mut module, &ctx(ALICE), Coin::new("ubid", 50)).unwrap();
            handle_bid(&mut module, &ctx(BOB), Coin::new("ubid", 60)).unwrap();

            let event = end_block(&mut module, 1100).unwrap().unwrap();
            assert_eq!(
                event,
                AuctionEvent::RoundSettled {
                    round: 0,
                    winner: BOB,
                    coins: Coins::from(Coin::new("uatom", 1_000)),
                    burned: Coin::new("ubid", 60),
                }
            );
        }

        assert_eq!(bank.balance_of(&BOB, "uatom"), 3_000);
        assert_eq!(bank.balance_of(&BOB, "ubid"), 940);
        assert_eq!(bank.balance_of(&ALICE, "ubid"), 1_000);
        assert!(bank.balances_of(&escrow).is_empty());
        assert_eq!(bank.supply_of("ubid"), 1_940);

        assert_eq!(state.round.number, 1);
        assert_eq!(state.round.end_height, 1200);
        assert!(state.round.pot.is_empty());
        assert!(state.round.highest_bid.is_none());
    }

    #[test]
    fn test_rolls_over_without_bids() {
        let (mut state, mut bank) = setup();
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);
        let deposit = Coins::from(Coin::new("uatom", 500));
        handle_deposit_coin(&mut module, &ctx(ALICE), deposit).unwrap();

        let event = end_block(&mut module, 1100).unwrap().unwrap();
        assert!(matches!(event, AuctionEvent::RoundRolledOver { round: 0, .. }));

        assert_eq!(state.round.number, 1);
        assert_eq!(state.round.pot.amount_of("uatom"), 500);
        assert_eq!(bank.balance_of(&state.escrow_account, "uatom"), 500);
    }

    #[test]
    fn test_settles_once_per_height() {
        let (mut state, mut bank) = setup();
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        assert!(end_block(&mut module, 1100).unwrap().is_some());
        assert!(end_block(&mut module, 1100).unwrap().is_none());
        assert_eq!(state.round.number, 1);
    }

    #[test]
    fn test_late_call_still_settles() {
        let (mut state, mut bank) = setup();
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        assert!(end_block(&mut module, 1105).unwrap().is_some());
        assert_eq!(state.round.end_height, 1205);
    }

    #[test]
    fn test_disabled_never_settles() {
        let (mut state, mut bank) = setup();
        state.params.enabled = false;
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        assert!(end_block(&mut module, 5000).unwrap().is_none());
        assert_eq!(state.round.number, 0);
    }

    #[test]
    fn test_next_round_uses_duration_at_settlement() {
        let (mut state, mut bank) = setup();
        state.params.round_duration = 7;
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        // The open round keeps its original end height.
        assert!(end_block(&mut module, 1007).unwrap().is_none());
        assert!(end_block(&mut module, 1100).unwrap().is_some());
        assert_eq!(state.round.end_height, 1107);
    }

    #[test]
    fn test_unbacked_bid_fails_settlement() {
        let (mut state, mut bank) = setup();
        state.round.highest_bid = Some(Bid {
            bidder: ALICE,
            amount: Coin::new("ubid", 3),
        });
        let mut module = ModuleContext::new(&mut state, &mut bank, &GOV);

        let err = end_block(&mut module, 1100).unwrap_err();
        assert!(matches!(
            err,
            AuctionError::Ledger(LedgerError::InsufficientFunds { required: 3, available: 0, .. })
        ));
        // The round is not advanced past the failure.
        assert_eq!(state.round.number, 0);
        assert_eq!(state.round.end_height, 1100);
    }
}
