use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::serialize::decimal;
use crate::types::Balance;

/// An account in the world state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    /// Spendable balance
    #[serde(with = "decimal")]
    pub balance: Balance,
    /// Transaction nonce (incremented with each message call)
    pub nonce: u64,
}

impl Account {
    pub fn new(balance: Balance, nonce: u64) -> Self {
        Account { balance, nonce }
    }

    /// Credit the balance
    pub fn credit(&mut self, amount: &Balance) {
        self.balance += amount;
    }

    /// Debit the balance. Returns false and leaves the balance untouched
    /// when it does not cover `amount`.
    pub fn debit(&mut self, amount: &Balance) -> bool {
        if self.balance < *amount {
            return false;
        }
        self.balance -= amount;
        true
    }

    /// An account with no balance and no nonce carries no state
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0
    }
}
