//! Client SDK for the rolling auctions module.
//!
//! This crate provides:
//! - Parsing of coin amounts written as `100ubid` / `10uatom,5uosmo`
//! - A typed JSON-RPC client for bidding, depositing and querying rounds

pub mod amount;
pub mod rpc;

pub use amount::{parse_coin, parse_coins, AmountError};
pub use rpc::AuctionRpcClient;
