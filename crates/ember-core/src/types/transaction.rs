use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, Hash};
use crate::error::CoreError;
use crate::serialize::{self, decimal, hex_bytes};
use crate::types::{Address, Balance};

/// A message applied to the world state.
///
/// The state transition only ever reads a message; any transaction type that
/// can answer these questions can be applied.
pub trait Message {
    /// Sender of the message
    fn from(&self) -> Address;
    /// Recipient, or `None` for contract creation
    fn to(&self) -> Option<Address>;
    fn gas_price(&self) -> &Balance;
    /// Gas limit granted to the message
    fn gas(&self) -> u64;
    /// Value transferred with the message
    fn value(&self) -> &Balance;
    fn nonce(&self) -> u64;
    /// Whether the sender nonce must match before the message is applied
    fn check_nonce(&self) -> bool;
    /// Call data or init code
    fn data(&self) -> &[u8];
}

fn default_check_nonce() -> bool {
    true
}

/// A decoded transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(with = "decimal")]
    pub gas_price: Balance,
    pub gas: u64,
    #[serde(with = "decimal", default)]
    pub value: Balance,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
    pub nonce: u64,
    #[serde(default = "default_check_nonce")]
    pub check_nonce: bool,
}

impl Transaction {
    /// A message call (or plain transfer) to `to`
    pub fn call(from: Address, to: Address, nonce: u64) -> Self {
        Transaction {
            from,
            to: Some(to),
            gas_price: Balance::zero(),
            gas: 0,
            value: Balance::zero(),
            data: Vec::new(),
            nonce,
            check_nonce: true,
        }
    }

    /// A contract creation
    pub fn create(from: Address, nonce: u64) -> Self {
        Transaction {
            to: None,
            ..Transaction::call(from, Address::ZERO, nonce)
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_gas_price(mut self, gas_price: impl Into<Balance>) -> Self {
        self.gas_price = gas_price.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Balance>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Skip the nonce pre-check (calls made on behalf of the node itself)
    pub fn without_nonce_check(mut self) -> Self {
        self.check_nonce = false;
        self
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Blake3 hash of the bincode encoding
    pub fn hash(&self) -> Result<Hash, CoreError> {
        let bytes = serialize::to_bytes(self)?;
        Ok(hash_blake3(&bytes))
    }
}

impl Message for Transaction {
    fn from(&self) -> Address {
        self.from
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn gas_price(&self) -> &Balance {
        &self.gas_price
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn value(&self) -> &Balance {
        &self.value
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn check_nonce(&self) -> bool {
        self.check_nonce
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
