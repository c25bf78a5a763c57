//! Rolling auction module.
//!
//! This module implements on-chain logic for a continuous sequence of
//! fixed-length auction rounds:
//!
//! - Revenue deposits accumulate into the open round's pot
//! - Bids in a single bid denomination, with the highest bid locked in escrow
//!   and the outbid bidder refunded in the same call
//! - End-of-block settlement: pot to the winner, winning bid burned, or the
//!   pot carried forward when nobody bid
//! - Governance-controlled parameters
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `scheduler`: End-of-block settlement and round rollover
//! - `queries`: Read-only state access
//! - `state`: On-chain state structures
//! - `ledger`: Ledger and authority capabilities, plus an in-memory bank
//! - `genesis`: Initial configuration and export
//! - `events`: Events emitted by successful operations
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use auctions_module::{genesis, handlers, scheduler, Bank, CallContext, ModuleContext};
//!
//! let mut state = genesis::init_genesis(&config, height)?;
//! let mut bank = Bank::new();
//! let mut module = ModuleContext::new(&mut state, &mut bank, &config.authority);
//!
//! handlers::handle_bid(&mut module, &CallContext { sender, block_height: height }, amount)?;
//! scheduler::end_block(&mut module, height)?;
//! ```

pub mod call;
pub mod error;
pub mod events;
pub mod genesis;
pub mod handlers;
pub mod ledger;
pub mod queries;
pub mod scheduler;
pub mod state;

pub use call::AuctionCall;
pub use error::AuctionError;
pub use events::AuctionEvent;
pub use genesis::{export_genesis, init_genesis, AuctionGenesisConfig, GenesisValidationError};
pub use handlers::{dispatch, CallContext, HandlerResult, ModuleContext};
pub use ledger::{Authority, Bank, Ledger, LedgerError};
pub use queries::{handle_query, AuctionQuery, AuctionQueryResponse};
pub use scheduler::end_block;
pub use state::AuctionState;
