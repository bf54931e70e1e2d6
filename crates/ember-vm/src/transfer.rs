//! A value-transfer-only execution environment.
//!
//! There is no interpreter behind it: calls move value and creations set up
//! an empty account. It is what the node runs blocks with and what the
//! integration tests exercise the full transition against.

use ember_core::{hash_parts, Address, Balance};
use ember_state::StateDb;
use tracing::debug;

use crate::env::{EnvError, ExecOutput, ExecutionEnvironment};

/// Execution environment that only moves value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferEnv {
    /// Flat execution gas charged per call
    pub call_gas: u64,
    /// Flat execution gas charged per creation
    pub create_gas: u64,
}

impl TransferEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_gas(mut self, gas: u64) -> Self {
        self.call_gas = gas;
        self
    }

    pub fn with_create_gas(mut self, gas: u64) -> Self {
        self.create_gas = gas;
        self
    }

    /// Address of the contract `sender` creates at `nonce`
    pub fn contract_address(sender: &Address, nonce: u64) -> Address {
        Address::from_hash(&hash_parts(&[sender.as_bytes(), &nonce.to_be_bytes()]))
    }
}

fn can_transfer<S: StateDb>(state: &S, from: &Address, value: &Balance) -> bool {
    state.get_balance(from) >= *value
}

fn transfer<S: StateDb>(
    state: &mut S,
    from: &Address,
    to: &Address,
    value: &Balance,
) -> Result<(), EnvError> {
    state
        .sub_balance(from, value)
        .map_err(|_| EnvError::InsufficientBalance)?;
    state.add_balance(to, value);
    Ok(())
}

impl<S: StateDb> ExecutionEnvironment<S> for TransferEnv {
    fn create(
        &mut self,
        state: &mut S,
        sender: Address,
        _code: &[u8],
        gas: u64,
        value: &Balance,
    ) -> (Address, ExecOutput) {
        let nonce = state.get_nonce(&sender);
        let address = Self::contract_address(&sender, nonce);

        if !can_transfer(state, &sender, value) {
            return (address, ExecOutput::failure(EnvError::InsufficientBalance, gas));
        }
        state.set_nonce(&sender, nonce.saturating_add(1));

        if state.get_nonce(&address) != 0 {
            return (address, ExecOutput::failure(EnvError::AddressCollision, 0));
        }

        let snapshot = state.snapshot();
        state.create_account(&address);
        if let Err(e) = transfer(state, &sender, &address, value) {
            state.revert_to_snapshot(snapshot);
            return (address, ExecOutput::failure(e, gas));
        }

        let Some(remaining) = gas.checked_sub(self.create_gas) else {
            state.revert_to_snapshot(snapshot);
            return (address, ExecOutput::failure(EnvError::OutOfGas, 0));
        };

        debug!("Created {} from {} with value {}", address, sender, value);
        (address, ExecOutput::success(Vec::new(), remaining))
    }

    fn call(
        &mut self,
        state: &mut S,
        sender: Address,
        recipient: Address,
        _input: &[u8],
        gas: u64,
        value: &Balance,
    ) -> ExecOutput {
        if !can_transfer(state, &sender, value) {
            return ExecOutput::failure(EnvError::InsufficientBalance, gas);
        }

        let snapshot = state.snapshot();
        if let Err(e) = transfer(state, &sender, &recipient, value) {
            state.revert_to_snapshot(snapshot);
            return ExecOutput::failure(e, gas);
        }

        let Some(remaining) = gas.checked_sub(self.call_gas) else {
            state.revert_to_snapshot(snapshot);
            return ExecOutput::failure(EnvError::OutOfGas, 0);
        };

        debug!("Transferred {} from {} to {}", value, sender, recipient);
        ExecOutput::success(Vec::new(), remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Account;
    use ember_state::WorldState;

    fn funded(balance: u32) -> (WorldState, Address) {
        let alice = Address::random();
        let state = WorldState::from_genesis([(alice, Account::new(Balance::from(balance), 0))]);
        (state, alice)
    }

    #[test]
    fn test_call_moves_value() {
        let (mut state, alice) = funded(1000);
        let bob = Address::random();

        let out = TransferEnv::new().call(&mut state, alice, bob, &[], 10_000, &Balance::from(300u32));

        assert_eq!(out, ExecOutput::success(Vec::new(), 10_000));
        assert_eq!(state.get_balance(&alice), Balance::from(700u32));
        assert_eq!(state.get_balance(&bob), Balance::from(300u32));
    }

    #[test]
    fn test_call_insufficient_balance_keeps_gas() {
        let (mut state, alice) = funded(100);
        let bob = Address::random();

        let out = TransferEnv::new().call(&mut state, alice, bob, &[], 10_000, &Balance::from(101u32));

        assert_eq!(out.error, Some(EnvError::InsufficientBalance));
        assert_eq!(out.remaining_gas, 10_000);
        assert_eq!(state.get_balance(&alice), Balance::from(100u32));
    }

    #[test]
    fn test_call_out_of_gas_reverts_transfer() {
        let (mut state, alice) = funded(1000);
        let bob = Address::random();
        let mut env = TransferEnv::new().with_call_gas(5_000);

        let out = env.call(&mut state, alice, bob, &[1], 4_999, &Balance::from(10u32));

        assert_eq!(out, ExecOutput::failure(EnvError::OutOfGas, 0));
        assert_eq!(state.get_balance(&alice), Balance::from(1000u32));
        assert!(!state.exists(&bob));
    }

    #[test]
    fn test_call_charges_flat_gas() {
        let (mut state, alice) = funded(1000);
        let mut env = TransferEnv::new().with_call_gas(5_000);

        let out = env.call(&mut state, alice, Address::random(), &[], 8_000, &Balance::from(0u32));
        assert_eq!(out.remaining_gas, 3_000);
    }

    #[test]
    fn test_create_derives_address_and_bumps_nonce() {
        let (mut state, alice) = funded(1000);
        let expected = TransferEnv::contract_address(&alice, 0);

        let (address, out) =
            TransferEnv::new().create(&mut state, alice, &[0x60], 10_000, &Balance::from(250u32));

        assert_eq!(address, expected);
        assert!(out.error.is_none());
        assert_eq!(state.get_nonce(&alice), 1);
        assert_eq!(state.get_balance(&address), Balance::from(250u32));
        assert_ne!(TransferEnv::contract_address(&alice, 1), expected);
    }

    #[test]
    fn test_create_insufficient_balance_leaves_nonce() {
        let (mut state, alice) = funded(10);

        let (_, out) =
            TransferEnv::new().create(&mut state, alice, &[], 10_000, &Balance::from(11u32));

        assert_eq!(out.error, Some(EnvError::InsufficientBalance));
        assert_eq!(state.get_nonce(&alice), 0);
    }

    #[test]
    fn test_create_collision() {
        let (mut state, alice) = funded(10);
        let taken = TransferEnv::contract_address(&alice, 0);
        state.set_nonce(&taken, 1);

        let (_, out) = TransferEnv::new().create(&mut state, alice, &[], 10_000, &Balance::from(0u32));

        assert_eq!(out, ExecOutput::failure(EnvError::AddressCollision, 0));
    }

    #[test]
    fn test_create_out_of_gas_reverts_account() {
        let (mut state, alice) = funded(1000);
        let mut env = TransferEnv::new().with_create_gas(32_000);

        let (address, out) = env.create(&mut state, alice, &[], 31_999, &Balance::from(5u32));

        assert_eq!(out.error, Some(EnvError::OutOfGas));
        assert!(!state.exists(&address));
        assert_eq!(state.get_balance(&alice), Balance::from(1000u32));
        assert_eq!(state.get_nonce(&alice), 1);
    }
}
