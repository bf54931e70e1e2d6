use ember_core::GasPoolError;
use thiserror::Error;

use crate::intrinsic::OutOfGas;

/// Failure to back or reserve the gas a message asks for.
///
/// The three insufficiency variants share one message but record which
/// quantity was checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    /// Plain transfer whose value does not cover the gas
    #[error("insufficient balance to pay for gas")]
    InsufficientForTransfer,

    /// Contract creation whose sender balance does not cover the gas
    #[error("insufficient balance to pay for gas")]
    InsufficientBySenderBalance,

    /// Message call whose recipient balance does not cover the gas
    #[error("insufficient balance to pay for gas")]
    InsufficientByRecipientBalance,

    #[error(transparent)]
    BlockGasLimitExceeded(#[from] GasPoolError),
}

/// Errors that keep a message out of the block.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("nonce too high: account nonce {state}, message nonce {message}")]
    NonceTooHigh { state: u64, message: u64 },

    #[error("nonce too low: account nonce {state}, message nonce {message}")]
    NonceTooLow { state: u64, message: u64 },

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    OutOfGas(#[from] OutOfGas),

    /// A value transfer inside execution could not be paid
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// Settlement found a balance that cannot cover the fee it owes
    #[error("state inconsistency: {0}")]
    State(#[from] ember_state::StateError),
}
