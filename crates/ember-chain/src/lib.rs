//! Ember Chain - Block processing
//!
//! This crate runs the transactions of a block through the state transition,
//! either verifying a given block or building one from candidates, and
//! produces a receipt per included transaction.

pub mod error;
pub mod processor;
pub mod receipt;

pub use error::ChainError;
pub use processor::{BlockContext, BlockOutcome, BlockProcessor, BuiltBlock, SkippedTransaction};
pub use receipt::Receipt;
