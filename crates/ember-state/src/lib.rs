//! Ember State - World state management
//!
//! This crate provides the account state store used by the state transition,
//! an in-memory journaled implementation, and state root computation.

pub mod error;
pub mod merkle;
pub mod state;
pub mod state_db;

pub use error::StateError;
pub use merkle::compute_state_root;
pub use state::WorldState;
pub use state_db::{SnapshotId, StateDb};
