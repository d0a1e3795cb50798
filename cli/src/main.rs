//! zerionkit CLI — query the Zerion API from the terminal.
//!
//! Usage:
//! ```bash
//! export ZERION_API_KEY=zk_prod_...
//!
//! # List supported chains
//! zerionkit chains
//!
//! # Current gas prices on a chain
//! zerionkit gas ethereum
//!
//! # Portfolio overview for a wallet
//! zerionkit portfolio 0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D
//! ```

use std::env;
use std::process;

use anyhow::{anyhow, Context, Result};
use zerionkit_core::ApiEnv;
use zerionkit_services::{PositionsQuery, Zerion};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    tracing::debug!(command = %args[1], "dispatching");
    let result = match args[1].as_str() {
        "chains" => cmd_chains(&args[2..]).await,
        "gas" => cmd_gas(&args[2..]).await,
        "portfolio" => cmd_portfolio(&args[2..]).await,
        "positions" => cmd_positions(&args[2..]).await,
        "health" => cmd_health(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("zerionkit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("zerionkit {}", env!("CARGO_PKG_VERSION"));
    println!("Query the Zerion blockchain-data API\n");
    println!("USAGE:");
    println!("    zerionkit <COMMAND> [ARGS]\n");
    println!("COMMANDS:");
    println!("    chains                List supported chains");
    println!("    gas <CHAIN_ID>        Current gas prices on a chain");
    println!("    portfolio <ADDRESS>   Portfolio overview for a wallet");
    println!("    positions <ADDRESS>   Fungible positions held by a wallet");
    println!("    health                Probe API reachability");
    println!("    version               Print version");
    println!("    help                  Print this help\n");
    println!("ENVIRONMENT:");
    println!("    ZERION_API_KEY        API key (zk_prod_... or zk_dev_...)  [required]");
    println!("\nFLAGS:");
    println!("    --testnet             Query testnet data instead of mainnet");
}

fn client(args: &[String]) -> Result<Zerion> {
    let api_key = env::var("ZERION_API_KEY")
        .context("ZERION_API_KEY is not set; get a key at https://developers.zerion.io")?;
    let client = Zerion::new(&api_key).map_err(|e| anyhow!("{e}"))?;
    if args.iter().any(|a| a == "--testnet") {
        client.set_environment(ApiEnv::Testnet);
    }
    Ok(client)
}

fn positional(args: &[String]) -> Option<&String> {
    args.iter().find(|a| !a.starts_with("--"))
}

async fn cmd_chains(args: &[String]) -> Result<()> {
    let client = client(args)?;
    let chains = client.chains().chains(true).await?;

    println!("{} chains supported:\n", chains.len());
    for chain in &chains {
        let trading = if chain.attributes.flags.supports_trading {
            "trading"
        } else {
            "-"
        };
        println!(
            "  {:<24} external_id={:<10} {trading}",
            chain.id, chain.attributes.external_id
        );
    }
    Ok(())
}

async fn cmd_gas(args: &[String]) -> Result<()> {
    let chain_id = positional(args).ok_or_else(|| anyhow!("usage: zerionkit gas <CHAIN_ID>"))?;
    let client = client(args)?;
    let prices = client.gas().chain_gas_prices(chain_id, false).await?;

    if prices.is_empty() {
        println!("No gas prices published for {chain_id}");
        return Ok(());
    }
    println!("Gas prices on {chain_id} (wei):\n");
    for price in &prices {
        let info = &price.attributes.info;
        println!(
            "  {:<10} slow={:<14} standard={:<14} fast={}",
            price.attributes.gas_type.as_str(),
            info.slow,
            info.standard,
            info.fast
        );
    }
    Ok(())
}

async fn cmd_portfolio(args: &[String]) -> Result<()> {
    let address =
        positional(args).ok_or_else(|| anyhow!("usage: zerionkit portfolio <ADDRESS>"))?;
    let client = client(args)?;
    let portfolio = client.wallets().portfolio(address, None).await?;

    println!("{}", serde_json::to_string_pretty(&portfolio)?);
    Ok(())
}

async fn cmd_positions(args: &[String]) -> Result<()> {
    let address =
        positional(args).ok_or_else(|| anyhow!("usage: zerionkit positions <ADDRESS>"))?;
    let client = client(args)?;
    let positions = client
        .wallets()
        .all_positions(address, &PositionsQuery::default())
        .await?;

    println!("{} positions:\n", positions.len());
    for position in &positions {
        let value = position
            .attributes
            .value
            .map(|v| format!("${v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<8} {:<28} {:>12}",
            position.attributes.fungible_info.symbol, position.attributes.name, value
        );
    }
    Ok(())
}

async fn cmd_health(args: &[String]) -> Result<()> {
    let client = client(args)?;
    let health = client.health_status().await;

    println!("Status:        {:?}", health.status);
    println!("Response time: {}ms", health.response_time.as_millis());
    for (service, ok) in &health.services {
        println!("  {:<12} {}", service, if *ok { "up" } else { "down" });
    }
    Ok(())
}
