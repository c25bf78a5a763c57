//! End-to-end integration tests for the rolling auctions module.
//!
//! These tests drive the module the way a host chain does:
//! 1. Genesis and account funding
//! 2. Messages delivered in block order, each applied atomically
//! 3. End-of-block settlement or rollover
//! 4. Queries and state export between rounds

use auctions_client::{parse_coin, parse_coins};
use auctions_module::{
    dispatch, end_block, export_genesis, handle_query, init_genesis, AuctionCall, AuctionError,
    AuctionEvent, AuctionGenesisConfig, AuctionQuery, AuctionQueryResponse, AuctionState, Bank,
    CallContext, Ledger, ModuleContext,
};
use auctions_types::{Address, AuctionInfo, Coins, Params};
use borsh::BorshDeserialize;

const ALICE: Address = [0xa1; 32];
const BOB: Address = [0xb0; 32];
const CAROL: Address = [0xc4; 32];
const GOV: Address = [0x90; 32];

/// Minimal host: one committed copy of module state and bank, branched per
/// message and per block end.
struct Node {
    state: AuctionState,
    bank: Bank,
    authority: Address,
    height: u64,
}

impl Node {
    fn new(start_height: u64) -> Self {
        let config = AuctionGenesisConfig {
            authority: GOV,
            ..Default::default()
        };
        let state = init_genesis(&config, start_height).unwrap();

        let mut bank = Bank::new();
        for account in [ALICE, BOB, CAROL] {
            bank.mint(&account, &parse_coins("1000ubid,5000uatom").unwrap())
                .unwrap();
        }

        Self {
            state,
            bank,
            authority: GOV,
            height: start_height,
        }
    }

    fn deliver(
        &mut self,
        sender: Address,
        call: AuctionCall,
    ) -> Result<AuctionEvent, AuctionError> {
        let mut state = self.state.clone();
        let mut bank = self.bank.clone();
        let ctx = CallContext {
            sender,
            block_height: self.height,
        };
        let event = {
            let mut module = ModuleContext::new(&mut state, &mut bank, &self.authority);
            dispatch(&mut module, &ctx, call)?
        };
        self.state = state;
        self.bank = bank;
        Ok(event)
    }

    fn bid(&mut self, sender: Address, amount: &str) -> Result<AuctionEvent, AuctionError> {
        self.deliver(
            sender,
            AuctionCall::Bid {
                amount: parse_coin(amount).unwrap(),
            },
        )
    }

    fn deposit(&mut self, sender: Address, amount: &str) -> Result<AuctionEvent, AuctionError> {
        self.deliver(
            sender,
            AuctionCall::DepositCoin {
                amount: parse_coins(amount).unwrap(),
            },
        )
    }

    /// End the current block and move to the next one.
    fn end_block(&mut self) -> Option<AuctionEvent> {
        let mut module = ModuleContext::new(&mut self.state, &mut self.bank, &self.authority);
        let event = end_block(&mut module, self.height).unwrap();
        self.height += 1;
        event
    }

    /// End blocks up to and including `height`, collecting settlement events.
    fn run_until(&mut self, height: u64) -> Vec<(u64, AuctionEvent)> {
        let mut events = Vec::new();
        while self.height <= height {
            let at = self.height;
            if let Some(event) = self.end_block() {
                events.push((at, event));
            }
        }
        events
    }

    fn info(&self) -> AuctionInfo {
        match handle_query(&self.state, &self.bank, AuctionQuery::AuctionInfo) {
            AuctionQueryResponse::AuctionInfo(info) => info,
            other => panic!("unexpected response {:?}", other),
        }
    }

    fn escrow(&self) -> Coins {
        match handle_query(&self.state, &self.bank, AuctionQuery::EscrowBalance) {
            AuctionQueryResponse::EscrowBalance(coins) => coins,
            other => panic!("unexpected response {:?}", other),
        }
    }

    fn balance(&self, account: &Address, denom: &str) -> u128 {
        self.bank.balance_of(account, denom)
    }

    /// Escrow holds exactly the pot plus the locked bid.
    fn assert_escrow_matches_round(&self) {
        let escrow = self.escrow();
        for (denom, amount) in self.state.round.pot.iter() {
            assert_eq!(escrow.amount_of(denom), amount);
        }
        assert_eq!(
            escrow.amount_of(&self.state.bid_denom),
            self.state.locked_bid_amount()
        );
    }
}

/// A full round: deposits, competing bids, settlement at the end height.
#[test]
fn test_round_with_competing_bids() {
    let mut node = Node::new(1000);
    assert_eq!(node.info().end_height, 1100);

    node.deposit(CAROL, "1000uatom").unwrap();

    node.height = 1010;
    node.bid(ALICE, "50ubid").unwrap();
    assert_eq!(node.balance(&ALICE, "ubid"), 950);

    let rejected = node.bid(BOB, "40ubid").unwrap_err();
    assert_eq!(rejected.kind(), "bid_too_low");
    assert_eq!(node.balance(&BOB, "ubid"), 1000);

    let event = node.bid(BOB, "60ubid").unwrap();
    match event {
        AuctionEvent::Bid { refunded, .. } => {
            assert_eq!(refunded.unwrap().bidder, ALICE);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(node.balance(&ALICE, "ubid"), 1000);
    assert_eq!(node.balance(&BOB, "ubid"), 940);
    node.assert_escrow_matches_round();

    let settled = node.run_until(1100);
    assert_eq!(settled.len(), 1);
    let (height, event) = &settled[0];
    assert_eq!(*height, 1100);
    assert_eq!(
        *event,
        AuctionEvent::RoundSettled {
            round: 0,
            winner: BOB,
            coins: parse_coins("1000uatom").unwrap(),
            burned: parse_coin("60ubid").unwrap(),
        }
    );

    assert_eq!(node.balance(&BOB, "uatom"), 6000);
    assert_eq!(node.bank.supply_of("ubid"), 2940);
    assert!(node.escrow().is_empty());

    let info = node.info();
    assert_eq!(info.round, 1);
    assert_eq!(info.end_height, 1200);
    assert!(info.pot.is_empty());
    assert!(info.highest_bid.is_none());
}

/// A round nobody bids on carries its pot into the next round.
#[test]
fn test_unbid_round_rolls_pot_forward() {
    let mut node = Node::new(1000);
    node.deposit(CAROL, "500uatom").unwrap();

    let events = node.run_until(1100);
    assert_eq!(
        events,
        vec![(
            1100,
            AuctionEvent::RoundRolledOver {
                round: 0,
                pot: parse_coins("500uatom").unwrap(),
            }
        )]
    );

    let info = node.info();
    assert_eq!(info.round, 1);
    assert_eq!(info.end_height, 1200);
    assert_eq!(info.pot.amount_of("uatom"), 500);
    node.assert_escrow_matches_round();

    // The carried pot goes to the next winner together with new deposits.
    node.deposit(ALICE, "250uatom").unwrap();
    node.bid(BOB, "10ubid").unwrap();
    node.run_until(1200);
    assert_eq!(node.balance(&BOB, "uatom"), 5750);
    assert_eq!(node.info().round, 2);
}

/// Escrow tracks pot and highest bid through every kind of message.
#[test]
fn test_escrow_invariant_across_messages() {
    let mut node = Node::new(0);
    node.assert_escrow_matches_round();

    let steps: Vec<(Address, &str, bool)> = vec![
        (ALICE, "10ubid", true),
        (BOB, "100uatom", false),
        (BOB, "11ubid", true),
        (ALICE, "11ubid", true),
        (CAROL, "20uatom,3uosmo", false),
        (ALICE, "30ubid", true),
        (CAROL, "5000ubid", true),
    ];

    for (sender, amount, is_bid) in steps {
        let result = if is_bid {
            node.bid(sender, amount)
        } else {
            node.deposit(sender, amount)
        };
        if let Err(err) = result {
            assert!(matches!(
                err,
                AuctionError::BidTooLow { .. } | AuctionError::Ledger(_)
            ));
        }
        node.assert_escrow_matches_round();
    }

    assert_eq!(node.state.locked_bid().unwrap().bidder, ALICE);
    assert_eq!(node.state.locked_bid_amount(), 30);
    assert_eq!(node.info().pot.amount_of("uatom"), 100);

    // CAROL holds no uosmo, so her multi-asset deposit moved nothing.
    assert!(!node.info().pot.contains_denom("uosmo"));
    assert_eq!(node.balance(&CAROL, "uatom"), 5000);

    // Total supply of the bid denomination is unchanged until settlement.
    assert_eq!(node.bank.supply_of("ubid"), 3000);
}

/// Messages in one block apply in delivery order.
#[test]
fn test_same_block_ordering() {
    let mut node = Node::new(1000);
    node.bid(ALICE, "50ubid").unwrap();
    node.bid(BOB, "60ubid").unwrap();
    assert!(node.bid(CAROL, "55ubid").is_err());
    node.bid(CAROL, "61ubid").unwrap();

    assert_eq!(node.state.locked_bid().unwrap().bidder, CAROL);
    assert_eq!(node.balance(&BOB, "ubid"), 1000);
    node.assert_escrow_matches_round();
}

/// Settlement fires once per round even when end_block is re-run at a height.
#[test]
fn test_settlement_is_idempotent_per_height() {
    let mut node = Node::new(1000);
    node.bid(ALICE, "50ubid").unwrap();
    node.height = 1100;

    let mut module = ModuleContext::new(&mut node.state, &mut node.bank, &node.authority);
    assert!(end_block(&mut module, 1100).unwrap().is_some());
    assert!(end_block(&mut module, 1100).unwrap().is_none());
    assert_eq!(node.state.round.number, 1);
    assert_eq!(node.bank.supply_of("ubid"), 2950);
}

/// Governance disables the module, then re-enables it mid-flight.
#[test]
fn test_governance_pause_and_resume() {
    let mut node = Node::new(1000);
    node.bid(ALICE, "50ubid").unwrap();

    let paused = Params {
        enabled: false,
        round_duration: 100,
    };
    let pause = AuctionCall::UpdateParams { params: paused };
    let rejected = node.deliver(BOB, pause.clone());
    assert!(matches!(rejected, Err(AuctionError::Unauthorized(_))));
    node.deliver(GOV, pause).unwrap();

    let bid = node.bid(BOB, "60ubid");
    assert!(matches!(bid, Err(AuctionError::Disabled)));
    let deposit = node.deposit(BOB, "1uatom");
    assert!(matches!(deposit, Err(AuctionError::Disabled)));

    // No settlement while disabled, even past the end height.
    assert!(node.run_until(1150).is_empty());
    assert_eq!(node.info().round, 0);

    let resumed = Params {
        enabled: true,
        round_duration: 20,
    };
    let resume = AuctionCall::UpdateParams { params: resumed };
    node.deliver(GOV, resume).unwrap();
    assert_eq!(node.info().end_height, 1171);
    assert_eq!(node.state.locked_bid().unwrap().bidder, ALICE);

    let settled = node.run_until(1171);
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, 1171);
    assert_eq!(node.info().end_height, 1191);
}

/// Invalid parameters are rejected and leave the old ones in place.
#[test]
fn test_invalid_params_rejected() {
    let mut node = Node::new(1000);
    let err = node
        .deliver(
            GOV,
            AuctionCall::UpdateParams {
                params: Params {
                    enabled: true,
                    round_duration: 0,
                },
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_params");
    assert_eq!(node.state.params, Params::default());
}

/// A bidder without funds is rejected without touching the locked bid.
#[test]
fn test_insufficient_funds_bid() {
    let mut node = Node::new(1000);
    node.bid(ALICE, "50ubid").unwrap();

    let err = node.bid(BOB, "1001ubid").unwrap_err();
    assert!(err.is_insufficient_funds());
    assert_eq!(err.code(), 5);
    assert_eq!(node.state.locked_bid().unwrap().bidder, ALICE);
    node.assert_escrow_matches_round();
}

/// Wrong-denomination bids and bid-denomination deposits are invalid amounts.
#[test]
fn test_denomination_checks() {
    let mut node = Node::new(1000);
    assert!(matches!(
        node.bid(ALICE, "50uatom"),
        Err(AuctionError::InvalidAmount(_))
    ));
    assert!(matches!(
        node.deposit(ALICE, "50ubid"),
        Err(AuctionError::InvalidAmount(_))
    ));
    assert!(node.escrow().is_empty());
}

/// Module state survives a borsh snapshot and a genesis export mid-round.
#[test]
fn test_restart_from_snapshot_and_export() {
    let mut node = Node::new(1000);
    node.deposit(CAROL, "300uatom").unwrap();
    node.bid(ALICE, "70ubid").unwrap();

    let bytes = borsh::to_vec(&node.state).unwrap();
    let restored = AuctionState::try_from_slice(&bytes).unwrap();
    assert_eq!(restored, node.state);

    let exported = export_genesis(&node.state, GOV);
    let json = serde_json::to_string(&exported).unwrap();
    let imported: AuctionGenesisConfig = serde_json::from_str(&json).unwrap();
    let resumed = init_genesis(&imported, 1050).unwrap();
    assert_eq!(resumed, node.state);

    node.state = resumed;
    let settled = node.run_until(1100);
    assert_eq!(settled.len(), 1);
    assert_eq!(node.balance(&ALICE, "uatom"), 5300);
}
