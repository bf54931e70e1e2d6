use ember_core::{Address, Balance};
use ember_state::StateDb;
use thiserror::Error;

/// Errors an execution environment can report back to the state transition.
///
/// Only [`EnvError::InsufficientBalance`] invalidates the transaction; every
/// other variant is a failed execution that is still charged for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    #[error("out of gas")]
    OutOfGas,

    #[error("execution reverted")]
    Reverted,

    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),

    #[error("max call depth exceeded")]
    DepthExceeded,

    #[error("contract address collision")]
    AddressCollision,

    #[error("{0}")]
    Other(String),
}

impl EnvError {
    /// Whether the error excludes the transaction from the block
    pub fn is_hard(&self) -> bool {
        matches!(self, EnvError::InsufficientBalance)
    }
}

/// What CALL or CREATE hands back
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutput {
    pub data: Vec<u8>,
    /// Gas left over from the amount passed in
    pub remaining_gas: u64,
    pub error: Option<EnvError>,
}

impl ExecOutput {
    pub fn success(data: Vec<u8>, remaining_gas: u64) -> Self {
        ExecOutput {
            data,
            remaining_gas,
            error: None,
        }
    }

    pub fn failure(error: EnvError, remaining_gas: u64) -> Self {
        ExecOutput {
            data: Vec::new(),
            remaining_gas,
            error: Some(error),
        }
    }
}

/// The machine that runs message calls and contract creations.
///
/// Implementations must roll back the state changes of a failed execution
/// themselves before returning an error.
pub trait ExecutionEnvironment<S: StateDb> {
    /// Create a contract from `code`, returning its address
    fn create(
        &mut self,
        state: &mut S,
        sender: Address,
        code: &[u8],
        gas: u64,
        value: &Balance,
    ) -> (Address, ExecOutput);

    /// Call `recipient` with `input`
    fn call(
        &mut self,
        state: &mut S,
        sender: Address,
        recipient: Address,
        input: &[u8],
        gas: u64,
        value: &Balance,
    ) -> ExecOutput;
}
