//! Replays Pika protocol events into an in-memory store and prints the
//! derived vault and product state.

mod config;

use std::{process::exit, time::Duration};

use alloy::{
    providers::ProviderBuilder, rpc::client::RpcClient, transports::layers::RetryBackoffLayer,
};
use clap::Parser;
use futures::StreamExt;
use itertools::Itertools;
use perp_indexer::{
    config::IndexerConfig,
    entity::{EntityKind, Product, VAULT_ID, Vault},
    indexer::Indexer,
    num::Converter,
    store::{MemoryStore, Store},
    stream,
};
use tracing::{error, info};

use config::{CliConfig, EnvConfig};

/// Amounts are reported with 8 decimals.
const AMOUNT_DECIMALS: u8 = 8;

fn print_summary(store: &MemoryStore) {
    let c = Converter::new(AMOUNT_DECIMALS);
    println!("\n{:=^80}", " VAULT ");
    match store.load::<Vault>(VAULT_ID) {
        Some(vault) => {
            println!("Balance:         {}", c.to_decimal(vault.balance));
            println!("Staked:          {}", c.to_decimal(vault.staked));
            println!("Volume:          {}", c.to_decimal(vault.cumulative_volume));
            println!("Fees:            {}", c.to_decimal(vault.cumulative_fee));
            println!("PnL:             {}", c.to_decimal(vault.cumulative_pnl));
            println!("Open positions:  {}", vault.position_count);
            println!("Trades:          {}", vault.trade_count);
            println!("Users:           {}", vault.user_count);
            println!("Liquidations:    {}", vault.liquidation_count);
        }
        None => println!("(not created yet)"),
    }

    println!("\n{:=^80}", " PRODUCTS ");
    println!(
        "{:>4} │ {:<20} │ {:<20} │ {:<20} │ {:>8}",
        "Id", "OI long", "OI short", "Volume", "Trades"
    );
    for product in store
        .all::<Product>()
        .sorted_by_key(|p| p.id.parse::<u64>().unwrap_or(u64::MAX))
    {
        println!(
            "{:>4} │ {:<20} │ {:<20} │ {:<20} │ {:>8}",
            product.id,
            format!("{}", c.to_decimal(product.open_interest_long)),
            format!("{}", c.to_decimal(product.open_interest_short)),
            format!("{}", c.to_decimal(product.cumulative_volume)),
            product.trade_count,
        );
    }

    let counts = [
        EntityKind::Position,
        EntityKind::Trade,
        EntityKind::User,
        EntityKind::Order,
        EntityKind::MarketOrder,
        EntityKind::Staker,
    ]
    .iter()
    .map(|kind| format!("{kind}: {}", store.count(*kind)))
    .join(" │ ");
    println!("{:=^80}\n{counts}", "");
}

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };
    let indexer_config = match IndexerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid indexer configuration: {}", e);
            exit(1);
        }
    };
    let cli_config = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let deployment = match env_config.deployment() {
        Ok(deployment) => deployment,
        Err(e) => {
            eprintln!("Invalid deployment: {}", e);
            exit(1);
        }
    };
    let node_url = match env_config.node_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid RPC URL: {}", e);
            exit(1);
        }
    };

    let client = match RpcClient::builder()
        .layer(RetryBackoffLayer::new(10, 100, 200))
        .connect(node_url.as_str())
        .await
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", node_url, e);
            exit(1);
        }
    };
    client.set_poll_interval(Duration::from_millis(cli_config.poll_interval));
    let provider = ProviderBuilder::new().connect_client(client);

    let from_block = cli_config
        .from_block
        .unwrap_or(deployment.deployed_at_block());
    info!(from_block, contracts = deployment.addresses().len(), "replaying");

    let mut indexer = Indexer::new(&indexer_config);
    let mut store = MemoryStore::new();
    let blocks = stream::logs(&deployment, provider, from_block, tokio::time::sleep);
    let mut blocks = match cli_config.blocks {
        Some(count) => blocks.take(count).boxed_local(),
        None => blocks.boxed_local(),
    };

    let mut applied_blocks = 0u64;
    while let Some(block) = blocks.next().await {
        let block = match block {
            Ok(block) => block,
            Err(e) => {
                error!(%e, "failed to fetch block");
                exit(1);
            }
        };
        match indexer.apply_block(&mut store, block) {
            Ok(Some(_)) => {
                applied_blocks += 1;
                if cli_config.summary_every > 0 && applied_blocks % cli_config.summary_every == 0 {
                    print_summary(&store);
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(%e, "failed to apply block");
                exit(1);
            }
        }
    }

    info!(
        applied_blocks,
        last_block = indexer.instant().map(|i| i.block_number()),
        "replay finished"
    );
    print_summary(&store);
}
