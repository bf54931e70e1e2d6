use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GasPoolError {
    #[error("gas limit reached: requested {requested}, available {available}")]
    GasLimitReached { requested: u64, available: u64 },
}

/// Gas remaining for the transactions of one block.
///
/// Each transaction reserves its full gas limit up front and hands the unused
/// part back once it has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GasPool(u64);

impl GasPool {
    pub fn new(gas: u64) -> Self {
        GasPool(gas)
    }

    /// Remaining gas in the pool
    pub fn gas(&self) -> u64 {
        self.0
    }

    /// Reserve `amount` gas, failing if the block cannot cover it
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), GasPoolError> {
        if self.0 < amount {
            return Err(GasPoolError::GasLimitReached {
                requested: amount,
                available: self.0,
            });
        }
        self.0 -= amount;
        Ok(())
    }

    /// Make `amount` gas available again
    pub fn add_gas(&mut self, amount: u64) {
        debug_assert!(self.0.checked_add(amount).is_some(), "gas pool overflow");
        self.0 = self.0.saturating_add(amount);
    }
}

impl fmt::Display for GasPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
