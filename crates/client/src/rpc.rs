//! Typed access to the mock chain's JSON-RPC interface.

use anyhow::Result;
use auctions_types::{AuctionInfo, Coin, Coins, Params};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::{Deserialize, Serialize};

/// Block info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
}

/// Result of ending a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedBlockRpc {
    pub height: u64,
    pub settlement: Option<serde_json::Value>,
}

/// Result of a delivered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub height: u64,
    pub event: serde_json::Value,
}

/// Client for the auctions RPC methods.
pub struct AuctionRpcClient {
    client: HttpClient,
}

impl AuctionRpcClient {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: HttpClientBuilder::default().build(url)?,
        })
    }

    pub async fn bid(&self, sender: &str, amount: &Coin) -> Result<TxResponse> {
        Ok(self.client.request("auction_bid", (sender, amount)).await?)
    }

    pub async fn deposit(&self, sender: &str, amount: &Coins) -> Result<TxResponse> {
        Ok(self
            .client
            .request("auction_depositCoin", (sender, amount))
            .await?)
    }

    pub async fn update_params(&self, sender: &str, params: &Params) -> Result<TxResponse> {
        Ok(self
            .client
            .request("auction_updateParams", (sender, params))
            .await?)
    }

    pub async fn auction_info(&self) -> Result<AuctionInfo> {
        Ok(self
            .client
            .request("query_auctionInfo", Vec::<()>::new())
            .await?)
    }

    pub async fn params(&self) -> Result<Params> {
        Ok(self
            .client
            .request("query_params", Vec::<()>::new())
            .await?)
    }

    pub async fn escrow_balance(&self) -> Result<Coins> {
        Ok(self
            .client
            .request("query_escrowBalance", Vec::<()>::new())
            .await?)
    }

    pub async fn balance(&self, address: &str) -> Result<Coins> {
        Ok(self.client.request("query_balance", vec![address]).await?)
    }

    pub async fn supply(&self, denom: &str) -> Result<Coin> {
        Ok(self.client.request("query_supply", vec![denom]).await?)
    }

    pub async fn events(&self, height: u64) -> Result<Vec<serde_json::Value>> {
        Ok(self.client.request("query_events", vec![height]).await?)
    }

    pub async fn block_info(&self) -> Result<BlockInfo> {
        Ok(self
            .client
            .request("chain_getBlockInfo", Vec::<()>::new())
            .await?)
    }

    pub async fn advance_block(&self) -> Result<CommittedBlockRpc> {
        Ok(self
            .client
            .request("admin_advanceBlock", Vec::<()>::new())
            .await?)
    }

    pub async fn mint(&self, address: &str, coins: &Coins) -> Result<Coins> {
        Ok(self.client.request("admin_mint", (address, coins)).await?)
    }
}
