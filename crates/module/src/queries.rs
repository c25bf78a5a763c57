//! Query handlers for the auction module.
//!
//! These functions provide read-only access to auction state.

use crate::ledger::Ledger;
use crate::state::AuctionState;
use auctions_types::{AuctionInfo, Coin, Coins, Params};
use serde::{Deserialize, Serialize};

/// Query request types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionQuery {
    /// Snapshot of the open round.
    AuctionInfo,

    /// Current module parameters.
    Params,

    /// What the escrow account actually holds for the pot and bid denominations.
    EscrowBalance,
}

/// Query response types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionQueryResponse {
    AuctionInfo(AuctionInfo),
    Params(Params),
    EscrowBalance(Coins),
}

/// Handle a query.
pub fn handle_query<L: Ledger + ?Sized>(
    state: &AuctionState,
    ledger: &L,
    query: AuctionQuery,
) -> AuctionQueryResponse {
    match query {
        AuctionQuery::AuctionInfo => AuctionQueryResponse::AuctionInfo(state.auction_info()),
        AuctionQuery::Params => AuctionQueryResponse::Params(state.params.clone()),
        AuctionQuery::EscrowBalance => {
            AuctionQueryResponse::EscrowBalance(escrow_balance(state, ledger))
        }
    }
}

/// Ledger balances of the escrow account for every denomination the round tracks.
pub fn escrow_balance<L: Ledger + ?Sized>(state: &AuctionState, ledger: &L) -> Coins {
    let denoms = state
        .round
        .pot
        .denoms()
        .chain(std::iter::once(state.bid_denom.as_str()));

    let held = denoms
        .map(|denom| Coin::new(denom, ledger.balance_of(&state.escrow_account, denom)))
        .filter(|coin| coin.amount > 0);

    // Denoms come from validated state and are distinct.
    Coins::from_coins(held).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{handle_bid, handle_deposit_coin, CallContext, ModuleContext};
    use crate::ledger::Bank;

    #[test]
    fn test_params_query() {
        let state = AuctionState::new(Params::default(), "ubid", 0);
        let response = handle_query(&state, &Bank::new(), AuctionQuery::Params);
        assert_eq!(response, AuctionQueryResponse::Params(Params::default()));
    }

    #[test]
    fn test_auction_info_reflects_latest_state() {
        let mut state = AuctionState::new(Params::default(), "ubid", 1000);
        let mut bank = Bank::new();
        let alice = [1u8; 32];
        let funds = Coins::from_coins(vec![Coin::new("ubid", 100), Coin::new("uatom", 40)]);
        bank.mint(&alice, &funds.unwrap()).unwrap();

        let ctx = CallContext {
            sender: alice,
            block_height: 1001,
        };
        {
            let mut module = ModuleContext::new(&mut state, &mut bank, &alice);
            handle_bid(&mut module, &ctx, Coin::new("ubid", 30)).unwrap();
            handle_deposit_coin(&mut module, &ctx, Coins::from(Coin::new("uatom", 40))).unwrap();
        }

        match handle_query(&state, &bank, AuctionQuery::AuctionInfo) {
            AuctionQueryResponse::AuctionInfo(info) => {
                assert_eq!(info.round, 0);
                assert_eq!(info.end_height, 1100);
                assert_eq!(info.bid_denom, "ubid");
                assert_eq!(info.pot.amount_of("uatom"), 40);
                assert_eq!(info.highest_bid.unwrap().amount, Coin::new("ubid", 30));
            }
            other => panic!("unexpected response {:?}", other),
        }

        let expected = Coins::from_coins(vec![Coin::new("ubid", 30), Coin::new("uatom", 40)]);
        assert_eq!(
            handle_query(&state, &bank, AuctionQuery::EscrowBalance),
            AuctionQueryResponse::EscrowBalance(expected.unwrap())
        );
    }

    #[test]
    fn test_escrow_balance_empty() {
        let state = AuctionState::new(Params::default(), "ubid", 0);
        assert!(escrow_balance(&state, &Bank::new()).is_empty());
    }
}
