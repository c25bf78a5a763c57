//! Simulated chain state hosting the auction module.
//!
//! Each message runs against a cloned branch of the module state and bank,
//! and the branch replaces the committed state only if the message succeeds.
//! End-of-block settlement is branched the same way: if it fails the block is
//! not committed and the height does not advance.

use auctions_module::{
    dispatch, end_block, export_genesis, handle_query, init_genesis, AuctionCall, AuctionError,
    AuctionEvent, AuctionGenesisConfig, AuctionQuery, AuctionQueryResponse, AuctionState, Bank,
    CallContext, GenesisValidationError, LedgerError, ModuleContext,
};
use auctions_types::{Address, Coins};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info, warn};

/// Funded account at genesis.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAccount {
    #[serde_as(as = "Hex")]
    pub address: Address,
    pub coins: Coins,
}

/// Genesis file for the mock chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainGenesis {
    #[serde(default = "default_initial_height")]
    pub initial_height: u64,
    #[serde(default)]
    pub auctions: AuctionGenesisConfig,
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
}

fn default_initial_height() -> u64 {
    1
}

impl Default for ChainGenesis {
    fn default() -> Self {
        Self {
            initial_height: default_initial_height(),
            auctions: AuctionGenesisConfig::default(),
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid auctions genesis: {0}")]
    Genesis(#[from] GenesisValidationError),

    #[error("genesis funding failed: {0}")]
    Funding(#[from] LedgerError),
}

/// Result of a block end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBlock {
    pub height: u64,
    pub settlement: Option<AuctionEvent>,
}

/// Shared chain state.
pub struct ChainState {
    /// Module state
    module: AuctionState,
    /// Balances
    bank: Bank,
    /// Governance account
    authority: Address,
    /// Height of the block currently being built
    block_height: u64,
    /// Events per height
    events: BTreeMap<u64, Vec<AuctionEvent>>,
}

impl ChainState {
    pub fn from_genesis(genesis: &ChainGenesis) -> Result<Self, ChainError> {
        let module = init_genesis(&genesis.auctions, genesis.initial_height)?;

        let mut bank = Bank::new();
        for account in &genesis.accounts {
            bank.mint(&account.address, &account.coins)?;
        }

        // Back any resumed pot and locked bid with real escrow balances.
        let mut escrow = module.round.pot.clone();
        if let Some(bid) = module.locked_bid() {
            escrow
                .add(&Coins::from(bid.amount.clone()))
                .map_err(|_| LedgerError::Overflow(bid.amount.denom.clone()))?;
        }
        bank.mint(&module.escrow_account, &escrow)?;

        info!(
            height = genesis.initial_height,
            accounts = genesis.accounts.len(),
            bid_denom = %module.bid_denom,
            "Chain initialized"
        );

        Ok(Self {
            module,
            bank,
            authority: genesis.auctions.authority,
            block_height: genesis.initial_height,
            events: BTreeMap::new(),
        })
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Apply one message in the current block. Nothing is kept on failure.
    pub fn deliver(
        &mut self,
        sender: Address,
        call: AuctionCall,
    ) -> Result<AuctionEvent, AuctionError> {
        let mut module = self.module.clone();
        let mut bank = self.bank.clone();
        let ctx = CallContext {
            sender,
            block_height: self.block_height,
        };

        let event = {
            let mut branch = ModuleContext::new(&mut module, &mut bank, &self.authority);
            dispatch(&mut branch, &ctx, call)
        };

        match event {
            Ok(event) => {
                self.module = module;
                self.bank = bank;
                self.events
                    .entry(self.block_height)
                    .or_default()
                    .push(event.clone());
                Ok(event)
            }
            Err(err) => {
                warn!(
                    height = self.block_height,
                    kind = err.kind(),
                    "Message rejected: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Run end-of-block processing for the current height and move to the next.
    pub fn advance_block(&mut self) -> Result<CommittedBlock, AuctionError> {
        let height = self.block_height;
        let mut module = self.module.clone();
        let mut bank = self.bank.clone();

        let settlement = {
            let mut branch = ModuleContext::new(&mut module, &mut bank, &self.authority);
            end_block(&mut branch, height)
        };

        let settlement = match settlement {
            Ok(settlement) => settlement,
            Err(err) => {
                error!(height, "End block failed, block not committed: {}", err);
                return Err(err);
            }
        };

        self.module = module;
        self.bank = bank;
        if let Some(event) = &settlement {
            self.events.entry(height).or_default().push(event.clone());
        }
        self.block_height += 1;

        Ok(CommittedBlock { height, settlement })
    }

    pub fn query(&self, query: AuctionQuery) -> AuctionQueryResponse {
        handle_query(&self.module, &self.bank, query)
    }

    pub fn balances(&self, address: &Address) -> Coins {
        self.bank.balances_of(address)
    }

    pub fn supply_of(&self, denom: &str) -> u128 {
        self.bank.supply_of(denom)
    }

    /// Faucet for local testing.
    pub fn mint(&mut self, to: &Address, coins: &Coins) -> Result<(), LedgerError> {
        self.bank.mint(to, coins)
    }

    pub fn events_at(&self, height: u64) -> Vec<AuctionEvent> {
        self.events.get(&height).cloned().unwrap_or_default()
    }

    pub fn export_genesis(&self) -> AuctionGenesisConfig {
        export_genesis(&self.module, self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auctions_module::Ledger;
    use auctions_types::{Bid, Coin, Params, Round};

    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];
    const GOV: Address = [9u8; 32];

    fn genesis() -> ChainGenesis {
        let mut funds = Coins::from(Coin::new("ubid", 1_000));
        funds.add(&Coins::from(Coin::new("uatom", 1_000))).unwrap();
        ChainGenesis {
            initial_height: 1000,
            auctions: AuctionGenesisConfig {
                authority: GOV,
                ..Default::default()
            },
            accounts: vec![
                GenesisAccount {
                    address: ALICE,
                    coins: funds.clone(),
                },
                GenesisAccount {
                    address: BOB,
                    coins: funds,
                },
            ],
        }
    }

    fn bid(
        chain: &mut ChainState,
        sender: Address,
        amount: u128,
    ) -> Result<AuctionEvent, AuctionError> {
        let amount = Coin::new("ubid", amount);
        chain.deliver(sender, AuctionCall::Bid { amount })
    }

    fn update_params(
        chain: &mut ChainState,
        sender: Address,
        params: &Params,
    ) -> Result<AuctionEvent, AuctionError> {
        let params = params.clone();
        chain.deliver(sender, AuctionCall::UpdateParams { params })
    }

    fn advance_to(chain: &mut ChainState, height: u64) -> Vec<CommittedBlock> {
        let mut blocks = Vec::new();
        while chain.block_height() <= height {
            blocks.push(chain.advance_block().unwrap());
        }
        blocks
    }

    #[test]
    fn test_rejected_message_leaves_state_untouched() {
        let mut chain = ChainState::from_genesis(&genesis()).unwrap();
        bid(&mut chain, ALICE, 50).unwrap();

        let result = bid(&mut chain, BOB, 40);
        assert!(matches!(result, Err(AuctionError::BidTooLow { .. })));
        assert_eq!(chain.balances(&BOB).amount_of("ubid"), 1_000);
        assert_eq!(chain.events_at(1000).len(), 1);
    }

    #[test]
    fn test_bids_in_same_block_apply_in_order() {
        let mut chain = ChainState::from_genesis(&genesis()).unwrap();
        bid(&mut chain, ALICE, 50).unwrap();
        bid(&mut chain, BOB, 60).unwrap();
        let late = bid(&mut chain, ALICE, 55);
        assert!(matches!(late, Err(AuctionError::BidTooLow { .. })));
    }

    #[test]
    fn test_full_round_through_blocks() {
        let mut chain = ChainState::from_genesis(&genesis()).unwrap();
        chain
            .deliver(
                ALICE,
                AuctionCall::DepositCoin {
                    amount: Coins::from(Coin::new("uatom", 1_000)),
                },
            )
            .unwrap();
        bid(&mut chain, BOB, 60).unwrap();

        let blocks = advance_to(&mut chain, 1100);
        let settled: Vec<_> = blocks.iter().filter(|b| b.settlement.is_some()).collect();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].height, 1100);

        assert_eq!(chain.balances(&BOB).amount_of("uatom"), 2_000);
        assert_eq!(chain.supply_of("ubid"), 1_940);
        assert_eq!(chain.events_at(1100).len(), 1);

        match chain.query(AuctionQuery::AuctionInfo) {
            AuctionQueryResponse::AuctionInfo(info) => {
                assert_eq!(info.round, 1);
                assert_eq!(info.end_height, 1200);
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_update_params() {
        let mut chain = ChainState::from_genesis(&genesis()).unwrap();
        let params = Params {
            enabled: false,
            round_duration: 10,
        };
        let result = update_params(&mut chain, ALICE, &params);
        assert_eq!(result.unwrap_err().kind(), "unauthorized");

        update_params(&mut chain, GOV, &params).unwrap();
        assert_eq!(
            chain.query(AuctionQuery::Params),
            AuctionQueryResponse::Params(params)
        );
    }

    #[test]
    fn test_genesis_funds_resumed_escrow() {
        let mut genesis = genesis();
        let mut round = Round::new(3, 1050, Coins::from(Coin::new("uatom", 70)));
        round.highest_bid = Some(Bid {
            bidder: ALICE,
            amount: Coin::new("ubid", 25),
        });
        genesis.auctions.round = Some(round);

        let mut chain = ChainState::from_genesis(&genesis).unwrap();
        let expected = Coins::from_coins(vec![Coin::new("uatom", 70), Coin::new("ubid", 25)]);
        assert_eq!(
            chain.query(AuctionQuery::EscrowBalance),
            AuctionQueryResponse::EscrowBalance(expected.unwrap())
        );

        advance_to(&mut chain, 1050);
        assert_eq!(chain.balances(&ALICE).amount_of("uatom"), 1_070);
        assert_eq!(chain.export_genesis().round.unwrap().number, 4);
    }

    #[test]
    fn test_failed_settlement_does_not_commit_block() {
        let mut genesis = genesis();
        let mut round = Round::new(3, 1000, Coins::from(Coin::new("uatom", 5)));
        round.highest_bid = Some(Bid {
            bidder: ALICE,
            amount: Coin::new("ubid", 3),
        });
        genesis.auctions.round = Some(round);

        let mut chain = ChainState::from_genesis(&genesis).unwrap();
        let escrow = chain.module.escrow_account;
        // Leave the locked bid without escrow backing.
        chain
            .bank
            .dispose(&escrow, &Coins::from(Coin::new("ubid", 3)))
            .unwrap();

        let module_before = chain.module.clone();
        let bank_before = chain.bank.clone();

        let result = chain.advance_block();
        assert!(matches!(result, Err(AuctionError::Ledger(_))));

        assert_eq!(chain.block_height(), 1000);
        assert_eq!(chain.module, module_before);
        assert_eq!(chain.bank, bank_before);
        assert_eq!(chain.bank.balance_of(&escrow, "uatom"), 5);
        assert_eq!(chain.balances(&ALICE).amount_of("uatom"), 1_000);
        assert!(chain.events_at(1000).is_empty());
    }
}
