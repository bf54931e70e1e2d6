use ember_core::{Address, GasPool, Hash, Transaction};
use ember_state::StateDb;
use ember_vm::{apply_message, ExecutionEnvironment, TransitionError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::ChainError;
use crate::receipt::Receipt;

/// Block-level parameters the transactions run under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub number: u64,
    /// Receives every fee paid in the block
    pub coinbase: Address,
    pub gas_limit: u64,
}

/// Receipts of a verified block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub receipts: Vec<Receipt>,
    pub gas_used: u64,
}

/// A candidate left out of a built block
#[derive(Debug)]
pub struct SkippedTransaction {
    /// Position in the candidate list
    pub index: usize,
    pub tx_hash: Hash,
    pub error: TransitionError,
}

/// A block assembled from candidates
#[derive(Debug)]
pub struct BuiltBlock {
    pub included: Vec<Transaction>,
    pub receipts: Vec<Receipt>,
    pub gas_used: u64,
    pub skipped: Vec<SkippedTransaction>,
}

/// Runs block transactions through the state transition
pub struct BlockProcessor {
    ctx: BlockContext,
}

impl BlockProcessor {
    pub fn new(ctx: BlockContext) -> Self {
        BlockProcessor { ctx }
    }

    pub fn context(&self) -> &BlockContext {
        &self.ctx
    }

    /// Apply every transaction of a block in order.
    ///
    /// A transaction that cannot be applied invalidates the whole block and
    /// the state is reverted to where it was before the block. On success
    /// the changes are committed.
    pub fn process<S, E>(
        &self,
        state: &mut S,
        env: &mut E,
        txs: &[Transaction],
    ) -> Result<BlockOutcome, ChainError>
    where
        S: StateDb,
        E: ExecutionEnvironment<S>,
    {
        let mut pool = GasPool::new(self.ctx.gas_limit);
        let mut receipts = Vec::with_capacity(txs.len());
        let mut cumulative = 0u64;
        let block_snapshot = state.snapshot();

        for (index, tx) in txs.iter().enumerate() {
            let tx_hash = tx.hash()?;
            state.clear_refunds();

            let result = match apply_message(state, env, tx, &mut pool, self.ctx.coinbase) {
                Ok(result) => result,
                Err(source @ TransitionError::State(_)) => {
                    state.revert_to_snapshot(block_snapshot);
                    return Err(self.inconsistency(index, tx_hash, source));
                }
                Err(source) => {
                    warn!(
                        "Block {} rejected at transaction {} ({}): {}",
                        self.ctx.number, index, tx_hash, source
                    );
                    state.revert_to_snapshot(block_snapshot);
                    return Err(ChainError::InvalidTransaction {
                        index,
                        tx_hash,
                        source,
                    });
                }
            };

            cumulative += result.gas_used;
            debug!(
                "Applied transaction {} ({}): gas {}, failed {}",
                index, tx_hash, result.gas_used, result.failed
            );
            receipts.push(Receipt::new(tx_hash, result, cumulative));
        }

        if let Err(e) = self.check_gas_accounting(&pool, cumulative) {
            state.revert_to_snapshot(block_snapshot);
            return Err(e);
        }
        state.commit();

        info!(
            "Processed block {} with {} transactions, {} gas used",
            self.ctx.number,
            receipts.len(),
            cumulative
        );

        Ok(BlockOutcome {
            receipts,
            gas_used: cumulative,
        })
    }

    /// Assemble a block from candidate transactions.
    ///
    /// Each candidate runs under its own snapshot. One that cannot be applied
    /// is rolled back, pool included, and recorded as skipped. A settlement
    /// shortfall aborts the whole block instead.
    pub fn build<S, E>(
        &self,
        state: &mut S,
        env: &mut E,
        candidates: Vec<Transaction>,
    ) -> Result<BuiltBlock, ChainError>
    where
        S: StateDb,
        E: ExecutionEnvironment<S>,
    {
        info!(
            "Building block {} from {} candidates",
            self.ctx.number,
            candidates.len()
        );

        let mut pool = GasPool::new(self.ctx.gas_limit);
        let mut included = Vec::new();
        let mut receipts = Vec::new();
        let mut skipped = Vec::new();
        let mut cumulative = 0u64;
        let block_snapshot = state.snapshot();

        for (index, tx) in candidates.into_iter().enumerate() {
            let tx_hash = tx.hash()?;
            let snapshot = state.snapshot();
            let pool_before = pool;
            state.clear_refunds();

            match apply_message(state, env, &tx, &mut pool, self.ctx.coinbase) {
                Ok(result) => {
                    cumulative += result.gas_used;
                    receipts.push(Receipt::new(tx_hash, result, cumulative));
                    included.push(tx);
                }
                Err(source @ TransitionError::State(_)) => {
                    state.revert_to_snapshot(block_snapshot);
                    return Err(self.inconsistency(index, tx_hash, source));
                }
                Err(error) => {
                    warn!("Skipping transaction {} ({}): {}", index, tx_hash, error);
                    state.revert_to_snapshot(snapshot);
                    pool = pool_before;
                    skipped.push(SkippedTransaction {
                        index,
                        tx_hash,
                        error,
                    });
                }
            }
        }

        if let Err(e) = self.check_gas_accounting(&pool, cumulative) {
            state.revert_to_snapshot(block_snapshot);
            return Err(e);
        }
        state.commit();

        info!(
            "Built block {} with {} transactions ({} skipped), {} gas used",
            self.ctx.number,
            included.len(),
            skipped.len(),
            cumulative
        );

        Ok(BuiltBlock {
            included,
            receipts,
            gas_used: cumulative,
            skipped,
        })
    }

    /// A settlement shortfall is never a property of the transaction alone
    fn inconsistency(&self, index: usize, tx_hash: Hash, source: TransitionError) -> ChainError {
        error!(
            "Block {} state inconsistency at transaction {} ({}): {}",
            self.ctx.number, index, tx_hash, source
        );
        ChainError::StateInconsistency {
            index,
            tx_hash,
            source,
        }
    }

    /// Gas taken from the pool must equal the gas charged in receipts
    fn check_gas_accounting(&self, pool: &GasPool, receipts: u64) -> Result<(), ChainError> {
        let consumed = self.ctx.gas_limit - pool.gas();
        if consumed != receipts {
            error!(
                "Block {} gas pool consumed {} but receipts total {}",
                self.ctx.number, consumed, receipts
            );
            return Err(ChainError::GasAccounting { consumed, receipts });
        }
        Ok(())
    }
}
