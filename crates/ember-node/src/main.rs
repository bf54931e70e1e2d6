use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::serialize::strip_hex_prefix;
use ember_core::Transaction;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod apply;
mod cli;
mod config;

use apply::{apply_block, Mode};
use cli::{Cli, Commands};
use config::{generate_sample_block, generate_sample_config, NodeConfig};

const DEFAULT_LOG_LEVEL: &str = "info";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output, block } => {
            init_logging(DEFAULT_LOG_LEVEL);
            init_config(output, block)?;
        }
        Commands::Apply {
            config,
            block,
            number,
            build,
        } => {
            // The config carries the default log level
            let config = load_config(&config)?;
            init_logging(&config.log_level);
            run_apply(&config, &block, number, build)?;
        }
        Commands::Intrinsic { data, create } => {
            init_logging(DEFAULT_LOG_LEVEL);
            show_intrinsic(&data, create)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays machine-readable
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<NodeConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {}. Run 'ember init' to create one.",
            path.display()
        ));
    }
    NodeConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Initialize a new configuration file
fn init_config(output: PathBuf, block: Option<PathBuf>) -> Result<()> {
    info!("Generating sample configuration");

    let config = generate_sample_config();
    config.save(&output)?;
    info!("Configuration saved to {:?}", output);
    println!("Configuration file created: {}", output.display());

    if let Some(path) = block {
        let txs = generate_sample_block(&config);
        std::fs::write(&path, serde_json::to_string_pretty(&txs)?)?;
        println!("Sample block created: {}", path.display());
        println!("\nTo apply it, run:");
        println!(
            "  ember apply --config {} --block {}",
            output.display(),
            path.display()
        );
    }

    Ok(())
}

/// Apply a block file and print the report as JSON
fn run_apply(config: &NodeConfig, block: &Path, number: u64, build: bool) -> Result<()> {
    let content = std::fs::read_to_string(block)
        .with_context(|| format!("Failed to read block file {}", block.display()))?;
    let txs: Vec<Transaction> = serde_json::from_str(&content)?;
    let mode = if build { Mode::Build } else { Mode::Verify };

    let report = match apply_block(config, number, txs, mode) {
        Ok(report) => report,
        Err(e) => {
            error!("Block {} rejected: {:#}", number, e);
            return Err(e);
        }
    };

    info!(
        "Block {} applied: {} receipts, {} gas used, state root {}",
        number,
        report.receipts.len(),
        report.gas_used,
        report.state_root
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Print the intrinsic gas of a hex payload
fn show_intrinsic(data: &str, create: bool) -> Result<()> {
    let bytes = hex::decode(strip_hex_prefix(data)).context("Payload is not valid hex")?;
    let gas = ember_vm::intrinsic_gas(&bytes, create)?;
    println!("{}", gas);
    Ok(())
}
