//! Ember Core - Core types, gas parameters, and serialization
//!
//! This crate provides the foundational types shared by the Ember state
//! transition engine: addresses, accounts, transaction messages and the
//! block gas pool.

pub mod crypto;
pub mod error;
pub mod gas_pool;
pub mod params;
pub mod serialize;
pub mod types;

pub use crypto::{hash_blake3, hash_parts, merkle_root, Hash};
pub use error::CoreError;
pub use gas_pool::{GasPool, GasPoolError};
pub use types::*;
