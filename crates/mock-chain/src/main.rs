//! Mock chain server for local testing of the rolling auctions module.
//!
//! This provides a JSON-RPC server that simulates block production around the
//! auction module without requiring a real blockchain. Messages are applied to
//! the block currently being built; `admin_advanceBlock` ends that block,
//! running round settlement, and opens the next one.

use anyhow::{Context, Result};
use clap::Parser;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use auctions_module::{
    AuctionCall, AuctionEvent, AuctionGenesisConfig, AuctionQuery, AuctionQueryResponse,
};
use auctions_types::{format_address, parse_address, Address, AuctionInfo, Coin, Coins, Params};

mod chain;
mod types;

use chain::{ChainGenesis, ChainState};
use types::*;

#[derive(Parser)]
#[command(name = "mock-chain")]
#[command(about = "JSON-RPC chain simulator for the rolling auctions module")]
struct Cli {
    /// Address to serve JSON-RPC on
    #[arg(long, default_value = "127.0.0.1:9944")]
    listen: SocketAddr,

    /// Genesis file (JSON); defaults are used when omitted
    #[arg(long)]
    genesis: Option<PathBuf>,
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// End the current block and start the next one.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<CommittedBlockRpc, ErrorObjectOwned>;

    /// Credit an account with freshly minted coins.
    #[method(name = "admin_mint")]
    async fn admin_mint(&self, address: String, coins: Coins) -> Result<Coins, ErrorObjectOwned>;

    // ============ Auction Methods ============

    /// Bid on the open round.
    #[method(name = "auction_bid")]
    async fn auction_bid(
        &self,
        sender: String,
        amount: Coin,
    ) -> Result<TxResponse, ErrorObjectOwned>;

    /// Deposit coins into the open round's pot.
    #[method(name = "auction_depositCoin")]
    async fn auction_deposit_coin(
        &self,
        sender: String,
        amount: Coins,
    ) -> Result<TxResponse, ErrorObjectOwned>;

    /// Replace module parameters (authority only).
    #[method(name = "auction_updateParams")]
    async fn auction_update_params(
        &self,
        sender: String,
        params: Params,
    ) -> Result<TxResponse, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Snapshot of the open round.
    #[method(name = "query_auctionInfo")]
    async fn query_auction_info(&self) -> Result<AuctionInfo, ErrorObjectOwned>;

    /// Current module parameters.
    #[method(name = "query_params")]
    async fn query_params(&self) -> Result<Params, ErrorObjectOwned>;

    /// Balances held by the module's escrow account.
    #[method(name = "query_escrowBalance")]
    async fn query_escrow_balance(&self) -> Result<Coins, ErrorObjectOwned>;

    /// Balances of an account.
    #[method(name = "query_balance")]
    async fn query_balance(&self, address: String) -> Result<Coins, ErrorObjectOwned>;

    /// Total circulating amount of a denomination.
    #[method(name = "query_supply")]
    async fn query_supply(&self, denom: String) -> Result<Coin, ErrorObjectOwned>;

    /// Events emitted at a height.
    #[method(name = "query_events")]
    async fn query_events(&self, height: u64) -> Result<Vec<AuctionEvent>, ErrorObjectOwned>;

    /// Module state as a genesis config.
    #[method(name = "query_exportGenesis")]
    async fn query_export_genesis(&self) -> Result<AuctionGenesisConfig, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MockChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MockChainServer {
    fn new(chain: ChainState) -> Self {
        Self {
            state: Arc::new(RwLock::new(chain)),
        }
    }

    fn deliver(&self, sender: &str, call: AuctionCall) -> Result<TxResponse, ErrorObjectOwned> {
        let sender = address_param(sender)?;
        let mut state = self.state.write();
        let height = state.block_height();
        let event = state.deliver(sender, call).map_err(|e| rejection(&e))?;
        Ok(TxResponse { height, event })
    }
}

fn address_param(s: &str) -> Result<Address, ErrorObjectOwned> {
    parse_address(s).map_err(|e| invalid_params(format!("Invalid address {}: {}", s, e)))
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn admin_advance_block(&self) -> Result<CommittedBlockRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        let block = state.advance_block().map_err(|e| rejection(&e))?;
        if let Some(event) = &block.settlement {
            info!("Block {} ended with {:?}", block.height, event);
        }
        Ok(CommittedBlockRpc {
            height: block.height,
            settlement: block.settlement,
        })
    }

    async fn admin_mint(&self, address: String, coins: Coins) -> Result<Coins, ErrorObjectOwned> {
        let address = address_param(&address)?;
        let mut state = self.state.write();
        state
            .mint(&address, &coins)
            .map_err(|e| invalid_params(format!("Mint failed: {}", e)))?;
        info!("Minted {} to {}", coins, format_address(&address));
        Ok(state.balances(&address))
    }

    async fn auction_bid(
        &self,
        sender: String,
        amount: Coin,
    ) -> Result<TxResponse, ErrorObjectOwned> {
        self.deliver(&sender, AuctionCall::Bid { amount })
    }

    async fn auction_deposit_coin(
        &self,
        sender: String,
        amount: Coins,
    ) -> Result<TxResponse, ErrorObjectOwned> {
        self.deliver(&sender, AuctionCall::DepositCoin { amount })
    }

    async fn auction_update_params(
        &self,
        sender: String,
        params: Params,
    ) -> Result<TxResponse, ErrorObjectOwned> {
        self.deliver(&sender, AuctionCall::UpdateParams { params })
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(BlockInfo {
            height: state.block_height(),
        })
    }

    async fn query_auction_info(&self) -> Result<AuctionInfo, ErrorObjectOwned> {
        match self.state.read().query(AuctionQuery::AuctionInfo) {
            AuctionQueryResponse::AuctionInfo(info) => Ok(info),
            _ => Err(invalid_params("Unexpected query response")),
        }
    }

    async fn query_params(&self) -> Result<Params, ErrorObjectOwned> {
        match self.state.read().query(AuctionQuery::Params) {
            AuctionQueryResponse::Params(params) => Ok(params),
            _ => Err(invalid_params("Unexpected query response")),
        }
    }

    async fn query_escrow_balance(&self) -> Result<Coins, ErrorObjectOwned> {
        match self.state.read().query(AuctionQuery::EscrowBalance) {
            AuctionQueryResponse::EscrowBalance(coins) => Ok(coins),
            _ => Err(invalid_params("Unexpected query response")),
        }
    }

    async fn query_balance(&self, address: String) -> Result<Coins, ErrorObjectOwned> {
        let address = address_param(&address)?;
        Ok(self.state.read().balances(&address))
    }

    async fn query_supply(&self, denom: String) -> Result<Coin, ErrorObjectOwned> {
        let amount = self.state.read().supply_of(&denom);
        Ok(Coin::new(denom, amount))
    }

    async fn query_events(&self, height: u64) -> Result<Vec<AuctionEvent>, ErrorObjectOwned> {
        Ok(self.state.read().events_at(height))
    }

    async fn query_export_genesis(&self) -> Result<AuctionGenesisConfig, ErrorObjectOwned> {
        Ok(self.state.read().export_genesis())
    }
}

fn load_genesis(path: Option<&PathBuf>) -> Result<ChainGenesis> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading genesis file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing genesis file {}", path.display()))
        }
        None => Ok(ChainGenesis::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse()?)
                .add_directive("auctions_module=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let genesis = load_genesis(cli.genesis.as_ref())?;
    let chain = ChainState::from_genesis(&genesis)?;

    info!("Starting mock chain server on {}", cli.listen);

    let server = Server::builder().build(cli.listen).await?;
    let handle = server.start(MockChainServer::new(chain).into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
