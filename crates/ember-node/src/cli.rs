use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ember - transaction state transition engine
#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Apply blocks of transactions to a genesis state")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sample configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Also write a sample block spending from the genesis accounts
        #[arg(short, long)]
        block: Option<PathBuf>,
    },

    /// Apply a block of transactions to the configured genesis state
    Apply {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Block file: a JSON array of transactions
        #[arg(short, long)]
        block: PathBuf,

        /// Block number reported in the output
        #[arg(short, long, default_value_t = 1)]
        number: u64,

        /// Build a block from the transactions, skipping invalid ones,
        /// instead of verifying them all
        #[arg(long)]
        build: bool,
    },

    /// Compute the intrinsic gas of a payload
    Intrinsic {
        /// Payload as hex, with or without 0x
        #[arg(short, long, default_value = "")]
        data: String,

        /// Price the payload as a contract creation
        #[arg(long)]
        create: bool,
    },
}
