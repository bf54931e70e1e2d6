//! Protocol gas parameters.
//!
//! These values are consensus-critical: every node must charge exactly the
//! same intrinsic cost for the same transaction.

/// Per-transaction base cost for a message call or value transfer.
pub const TX_GAS: u64 = 21_000;

/// Per-transaction base cost for a transaction that creates a contract.
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;

/// Cost per zero byte of transaction payload.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Cost per non-zero byte of transaction payload.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// Denominator of the refund cap: at most `gas_used / REFUND_QUOTIENT` is refunded.
pub const REFUND_QUOTIENT: u64 = 2;
