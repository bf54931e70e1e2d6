use ember_core::params::{
    TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS, TX_GAS_CONTRACT_CREATION,
};
use thiserror::Error;

/// Gas exhausted, or a gas figure that does not fit in 64 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of gas")]
pub struct OutOfGas;

/// Computes the gas a message owes before any execution.
pub fn intrinsic_gas(data: &[u8], contract_creation: bool) -> Result<u64, OutOfGas> {
    let non_zero = data.iter().filter(|&&b| b != 0).count() as u64;
    let zero = data.len() as u64 - non_zero;
    intrinsic_gas_for_counts(zero, non_zero, contract_creation)
}

/// [`intrinsic_gas`] over byte counts instead of the payload itself.
pub fn intrinsic_gas_for_counts(
    zero_bytes: u64,
    non_zero_bytes: u64,
    contract_creation: bool,
) -> Result<u64, OutOfGas> {
    let base = if contract_creation {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };

    non_zero_bytes
        .checked_mul(TX_DATA_NON_ZERO_GAS)
        .and_then(|gas| base.checked_add(gas))
        .and_then(|gas| {
            zero_bytes
                .checked_mul(TX_DATA_ZERO_GAS)
                .and_then(|z| gas.checked_add(z))
        })
        .ok_or(OutOfGas)
}
