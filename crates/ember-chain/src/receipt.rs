use ember_core::serialize::hex_bytes;
use ember_core::Hash;
use ember_vm::ExecutionResult;
use serde::{Deserialize, Serialize};

/// Result of one transaction included in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: Hash,
    /// Execution failed; the transaction was still charged
    pub failed: bool,
    pub gas_used: u64,
    /// Gas used by this and every earlier transaction in the block
    pub cumulative_gas_used: u64,
    #[serde(with = "hex_bytes")]
    pub return_data: Vec<u8>,
    /// Execution error message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Receipt {
    pub fn new(tx_hash: Hash, result: ExecutionResult, cumulative_gas_used: u64) -> Self {
        Receipt {
            tx_hash,
            failed: result.failed,
            gas_used: result.gas_used,
            cumulative_gas_used,
            error: result.vm_error.map(|e| e.to_string()),
            return_data: result.return_data,
        }
    }
}
