//! Ember VM - Transaction state transition
//!
//! This crate applies a single message to the world state: intrinsic gas,
//! fee-payer resolution and gas purchase, dispatch into the execution
//! environment, and refund and fee settlement.

pub mod dispatch;
pub mod env;
pub mod error;
pub mod gas;
pub mod intrinsic;
pub mod settlement;
pub mod transfer;
pub mod transition;

pub use env::{EnvError, ExecOutput, ExecutionEnvironment};
pub use error::{FeeError, TransitionError};
pub use gas::FeePayer;
pub use intrinsic::{intrinsic_gas, intrinsic_gas_for_counts, OutOfGas};
pub use transfer::TransferEnv;
pub use transition::{apply_message, ExecutionResult, StateTransition};
