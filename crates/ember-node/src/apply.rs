use anyhow::Result;
use ember_chain::{BlockContext, BlockProcessor, Receipt};
use ember_core::{Hash, Transaction};
use serde::Serialize;
use tracing::info;

use crate::config::NodeConfig;

/// What `ember apply` prints
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub chain_id: u64,
    pub block_number: u64,
    pub mode: Mode,
    pub gas_used: u64,
    pub receipts: Vec<Receipt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<Skipped>,
    pub state_root: Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Verify,
    Build,
}

#[derive(Debug, Serialize)]
pub struct Skipped {
    pub index: usize,
    pub tx_hash: Hash,
    pub error: String,
}

/// Run `txs` against the genesis state of `config`
pub fn apply_block(
    config: &NodeConfig,
    number: u64,
    txs: Vec<Transaction>,
    mode: Mode,
) -> Result<ApplyReport> {
    let mut state = config.genesis_state();
    let mut env = config.environment();
    let processor = BlockProcessor::new(BlockContext {
        number,
        coinbase: config.coinbase,
        gas_limit: config.block_gas_limit,
    });

    info!(
        "Applying {} transactions to block {} ({:?})",
        txs.len(),
        number,
        mode
    );

    let (gas_used, receipts, skipped) = match mode {
        Mode::Verify => {
            let outcome = processor.process(&mut state, &mut env, &txs)?;
            (outcome.gas_used, outcome.receipts, Vec::new())
        }
        Mode::Build => {
            let built = processor.build(&mut state, &mut env, txs)?;
            let skipped = built
                .skipped
                .into_iter()
                .map(|s| Skipped {
                    index: s.index,
                    tx_hash: s.tx_hash,
                    error: s.error.to_string(),
                })
                .collect();
            (built.gas_used, built.receipts, skipped)
        }
    };

    Ok(ApplyReport {
        chain_id: config.chain_id,
        block_number: number,
        mode,
        gas_used,
        receipts,
        skipped,
        state_root: state.state_root()?,
    })
}
