//! CLI for interacting with rolling auctions.
//!
//! This binary provides commands for:
//! - Bidding on the open round and depositing into its pot
//! - Updating module parameters (authority only)
//! - Querying the open round, parameters, balances and events
//! - Driving the mock chain (minting, ending blocks)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use auctions_client::{parse_coin, parse_coins, AuctionRpcClient};
use auctions_types::{format_address, parse_address, Params};

#[derive(Parser)]
#[command(name = "auctions-cli")]
#[command(about = "CLI for rolling auctions")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bid on the open round
    Bid {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Bid amount, e.g. 100ubid
        #[arg(long)]
        amount: String,
    },

    /// Deposit coins into the open round's pot
    Deposit {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Coins to deposit, e.g. 10uatom,5uosmo
        #[arg(long)]
        amount: String,
    },

    /// Replace module parameters
    UpdateParams {
        /// Authority address (hex)
        #[arg(long)]
        sender: String,

        /// Whether bidding and deposits are accepted (true or false)
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,

        /// Round length in blocks
        #[arg(long)]
        round_duration: u64,
    },

    /// Show the open round
    Info,

    /// Show module parameters
    Params,

    /// Show an account's balances
    Balance {
        /// Account address (hex); the escrow account when omitted
        #[arg(long)]
        address: Option<String>,
    },

    /// Mint coins to an account (for testing)
    Mint {
        /// Account address (hex)
        #[arg(long)]
        address: String,

        /// Coins to mint, e.g. 1000ubid,500uatom
        #[arg(long)]
        amount: String,
    },

    /// End the current block (for testing)
    AdvanceBlock {
        /// Number of blocks to end
        #[arg(long, default_value = "1")]
        count: u64,
    },

    /// Show events emitted at a height
    Events {
        /// Block height; the current block when omitted
        #[arg(long)]
        height: Option<u64>,
    },
}

/// Normalize an address argument to the canonical hex form.
fn address_arg(s: &str) -> Result<String> {
    let address = parse_address(s).with_context(|| format!("invalid address {}", s))?;
    Ok(format_address(&address))
}

async fn bid_cmd(client: &AuctionRpcClient, sender: &str, amount: &str) -> Result<()> {
    let sender = address_arg(sender)?;
    let amount = parse_coin(amount)?;

    let tx = client.bid(&sender, &amount).await?;

    info!("Bid {} included at height {}", amount, tx.height);
    println!("Bid accepted at height {}", tx.height);
    println!("{}", serde_json::to_string_pretty(&tx.event)?);
    Ok(())
}

async fn deposit_cmd(client: &AuctionRpcClient, sender: &str, amount: &str) -> Result<()> {
    let sender = address_arg(sender)?;
    let amount = parse_coins(amount)?;

    let tx = client.deposit(&sender, &amount).await?;

    info!("Deposit {} included at height {}", amount, tx.height);
    println!("Deposited {} at height {}", amount, tx.height);
    Ok(())
}

async fn update_params_cmd(client: &AuctionRpcClient, sender: &str, params: Params) -> Result<()> {
    let sender = address_arg(sender)?;
    let tx = client.update_params(&sender, &params).await?;

    println!("Params updated at height {}", tx.height);
    println!("  Enabled: {}", params.enabled);
    println!("  Round Duration: {}", params.round_duration);
    Ok(())
}

async fn info_cmd(client: &AuctionRpcClient) -> Result<()> {
    let info = client.auction_info().await?;
    let block = client.block_info().await?;

    println!("Round {}:", info.round);
    println!("  Current Height: {}", block.height);
    println!("  End Height: {}", info.end_height);
    println!("  Bid Denom: {}", info.bid_denom);
    println!("  Pot: {}", info.pot);
    match info.highest_bid {
        Some(bid) => {
            println!("  Highest Bid: {}", bid.amount);
            println!("  Bidder: {}", format_address(&bid.bidder));
        }
        None => println!("  Highest Bid: none"),
    }
    Ok(())
}

async fn params_cmd(client: &AuctionRpcClient) -> Result<()> {
    let params = client.params().await?;
    println!("Params:");
    println!("  Enabled: {}", params.enabled);
    println!("  Round Duration: {}", params.round_duration);
    Ok(())
}

async fn balance_cmd(client: &AuctionRpcClient, address: Option<&str>) -> Result<()> {
    match address {
        Some(address) => {
            let address = address_arg(address)?;
            let coins = client.balance(&address).await?;
            println!("{}: {}", address, coins);
        }
        None => {
            let coins = client.escrow_balance().await?;
            println!("Escrow: {}", coins);
        }
    }
    Ok(())
}

async fn mint_cmd(client: &AuctionRpcClient, address: &str, amount: &str) -> Result<()> {
    let address = address_arg(address)?;
    let coins = parse_coins(amount)?;

    let balance = client.mint(&address, &coins).await?;
    info!("Minted {} to {}", coins, address);
    println!("Balance of {}: {}", address, balance);
    Ok(())
}

async fn advance_block_cmd(client: &AuctionRpcClient, count: u64) -> Result<()> {
    for _ in 0..count {
        let block = client.advance_block().await?;
        match block.settlement {
            Some(event) => println!("Block {} ended: {}", block.height, event),
            None => println!("Block {} ended", block.height),
        }
    }
    Ok(())
}

async fn events_cmd(client: &AuctionRpcClient, height: Option<u64>) -> Result<()> {
    let height = match height {
        Some(height) => height,
        None => client.block_info().await?.height,
    };

    let events = client.events(height).await?;
    if events.is_empty() {
        println!("No events at height {}", height);
    } else {
        println!("Events at height {}:", height);
        for event in events {
            println!("  {}", event);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auctions_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let client = AuctionRpcClient::new(&cli.rpc)?;

    match cli.command {
        Commands::Bid { sender, amount } => bid_cmd(&client, &sender, &amount).await?,
        Commands::Deposit { sender, amount } => deposit_cmd(&client, &sender, &amount).await?,
        Commands::UpdateParams {
            sender,
            enabled,
            round_duration,
        } => {
            let params = Params {
                enabled,
                round_duration,
            };
            params.validate()?;
            update_params_cmd(&client, &sender, params).await?
        }
        Commands::Info => info_cmd(&client).await?,
        Commands::Params => params_cmd(&client).await?,
        Commands::Balance { address } => balance_cmd(&client, address.as_deref()).await?,
        Commands::Mint { address, amount } => mint_cmd(&client, &address, &amount).await?,
        Commands::AdvanceBlock { count } => advance_block_cmd(&client, count).await?,
        Commands::Events { height } => events_cmd(&client, height).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_params(enabled: &str) -> Commands {
        Cli::try_parse_from([
            "auctions-cli",
            "update-params",
            "--sender",
            "0x01",
            "--enabled",
            enabled,
            "--round-duration",
            "10",
        ])
        .unwrap()
        .command
    }

    #[test]
    fn test_update_params_takes_explicit_enabled_value() {
        assert!(matches!(
            update_params("false"),
            Commands::UpdateParams { enabled: false, round_duration: 10, .. }
        ));
        assert!(matches!(
            update_params("true"),
            Commands::UpdateParams { enabled: true, .. }
        ));
    }

    #[test]
    fn test_enabled_requires_a_value() {
        let result = Cli::try_parse_from([
            "auctions-cli",
            "update-params",
            "--sender",
            "0x01",
            "--enabled",
            "--round-duration",
            "10",
        ]);
        assert!(result.is_err());
    }
}
