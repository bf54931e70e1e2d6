use ember_core::{Address, Balance};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Insufficient balance for {address}: have {have}, need {need}")]
    InsufficientBalance {
        address: Address,
        have: Balance,
        need: Balance,
    },

    #[error("Core error: {0}")]
    Core(#[from] ember_core::CoreError),
}
