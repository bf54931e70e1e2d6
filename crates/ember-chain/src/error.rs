use ember_core::Hash;
use ember_vm::TransitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid transaction {index} ({tx_hash}): {source}")]
    InvalidTransaction {
        index: usize,
        tx_hash: Hash,
        #[source]
        source: TransitionError,
    },

    /// Settlement found a balance unable to cover a fee it already owed
    #[error("State inconsistency at transaction {index} ({tx_hash}): {source}")]
    StateInconsistency {
        index: usize,
        tx_hash: Hash,
        #[source]
        source: TransitionError,
    },

    #[error("Gas accounting mismatch: pool consumed {consumed}, receipts total {receipts}")]
    GasAccounting { consumed: u64, receipts: u64 },

    #[error("Core error: {0}")]
    Core(#[from] ember_core::CoreError),
}
