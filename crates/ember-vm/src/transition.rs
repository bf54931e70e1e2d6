use ember_core::{Address, GasPool, Message};
use ember_state::StateDb;
use tracing::debug;

use crate::env::{EnvError, ExecutionEnvironment};
use crate::error::TransitionError;
use crate::intrinsic::{intrinsic_gas, OutOfGas};

/// Outcome of a message that made it into the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Data returned by the call or creation
    pub return_data: Vec<u8>,
    /// Gas charged, after refunds
    pub gas_used: u64,
    /// Execution failed but the message is still included and charged
    pub failed: bool,
    /// Why execution failed, when it did
    pub vm_error: Option<EnvError>,
}

/// Applies a message to the world state.
///
/// On `Ok` the message belongs in the block even if `failed` is set. Any
/// error means the message can never be valid against this state and must
/// not be included.
pub fn apply_message<S, E, M>(
    state: &mut S,
    env: &mut E,
    msg: &M,
    pool: &mut GasPool,
    coinbase: Address,
) -> Result<ExecutionResult, TransitionError>
where
    S: StateDb,
    E: ExecutionEnvironment<S>,
    M: Message + ?Sized,
{
    StateTransition::new(state, env, msg, pool, coinbase).transition_db()
}

/// The state transition of one message.
///
/// 1. Nonce check
/// 2. Fee-payer resolution and gas purchase
/// 3. Intrinsic gas
/// 4. CALL or CREATE in the execution environment
/// 5. Refund, fee debit and coinbase credit
pub struct StateTransition<'a, S, E, M: ?Sized> {
    pub(crate) state: &'a mut S,
    pub(crate) env: &'a mut E,
    pub(crate) msg: &'a M,
    pub(crate) pool: &'a mut GasPool,
    pub(crate) coinbase: Address,
    /// Gas left to spend
    pub(crate) gas: u64,
    /// Gas granted at purchase
    pub(crate) initial_gas: u64,
}

impl<'a, S, E, M> StateTransition<'a, S, E, M>
where
    S: StateDb,
    E: ExecutionEnvironment<S>,
    M: Message + ?Sized,
{
    pub fn new(
        state: &'a mut S,
        env: &'a mut E,
        msg: &'a M,
        pool: &'a mut GasPool,
        coinbase: Address,
    ) -> Self {
        StateTransition {
            state,
            env,
            msg,
            pool,
            coinbase,
            gas: 0,
            initial_gas: 0,
        }
    }

    /// Run the transition to completion
    pub fn transition_db(mut self) -> Result<ExecutionResult, TransitionError> {
        self.pre_check()?;

        let intrinsic = intrinsic_gas(self.msg.data(), self.msg.to().is_none())?;
        self.use_gas(intrinsic)?;
        debug!(
            "Charged intrinsic gas {} to {}, {} remaining",
            intrinsic,
            self.msg.from(),
            self.gas
        );

        let dispatch = self.dispatch()?;

        self.refund_and_settle(&dispatch.recipient)?;

        Ok(ExecutionResult {
            return_data: dispatch.return_data,
            gas_used: self.gas_used(),
            failed: dispatch.vm_error.is_some(),
            vm_error: dispatch.vm_error,
        })
    }

    fn pre_check(&mut self) -> Result<(), TransitionError> {
        if self.msg.check_nonce() {
            let state_nonce = self.state.get_nonce(&self.msg.from());
            let msg_nonce = self.msg.nonce();
            if state_nonce < msg_nonce {
                return Err(TransitionError::NonceTooHigh {
                    state: state_nonce,
                    message: msg_nonce,
                });
            } else if state_nonce > msg_nonce {
                return Err(TransitionError::NonceTooLow {
                    state: state_nonce,
                    message: msg_nonce,
                });
            }
        }
        self.buy_gas()?;
        Ok(())
    }

    pub(crate) fn use_gas(&mut self, amount: u64) -> Result<(), OutOfGas> {
        self.gas = self.gas.checked_sub(amount).ok_or(OutOfGas)?;
        Ok(())
    }

    /// Gas granted at purchase
    pub fn initial_gas(&self) -> u64 {
        self.initial_gas
    }

    /// Gas not yet spent
    pub fn remaining_gas(&self) -> u64 {
        self.gas
    }

    /// Gas spent so far
    pub fn gas_used(&self) -> u64 {
        self.initial_gas - self.gas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ExecOutput;
    use crate::error::FeeError;
    use ember_core::{Account, Balance, Transaction};
    use ember_state::WorldState;

    /// Moves the value and burns a fixed amount of gas
    struct FixedCostEnv {
        cost: u64,
    }

    impl<S: StateDb> ExecutionEnvironment<S> for FixedCostEnv {
        fn create(
            &mut self,
            _state: &mut S,
            _sender: Address,
            _code: &[u8],
            gas: u64,
            _value: &Balance,
        ) -> (Address, ExecOutput) {
            (Address::ZERO, ExecOutput::success(Vec::new(), gas - self.cost))
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
            if state.sub_balance(&sender, value).is_err() {
                return ExecOutput::failure(EnvError::InsufficientBalance, gas);
            }
            state.add_balance(&recipient, value);
            ExecOutput::success(vec![0x2a], gas - self.cost)
        }
    }

    fn setup(nonce: u64) -> (WorldState, Address) {
        let sender = Address::random();
        let state =
            WorldState::from_genesis([(sender, Account::new(Balance::from(1_000_000u32), nonce))]);
        (state, sender)
    }

    fn transfer(sender: Address, nonce: u64) -> Transaction {
        Transaction::call(sender, Address::random(), nonce)
            .with_gas(21_000)
            .with_gas_price(1u32)
            .with_value(21_000u32)
    }

    #[test]
    fn test_nonce_matches() {
        let (mut state, sender) = setup(5);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let result = apply_message(
            &mut state,
            &mut env,
            &transfer(sender, 5),
            &mut pool,
            Address::random(),
        )
        .unwrap();
        assert_eq!(result.gas_used, 21_000);
        assert!(!result.failed);
    }

    #[test]
    fn test_nonce_too_high() {
        let (mut state, sender) = setup(5);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let err = apply_message(
            &mut state,
            &mut env,
            &transfer(sender, 6),
            &mut pool,
            Address::random(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::NonceTooHigh {
                state: 5,
                message: 6
            }
        ));
        assert_eq!(pool.gas(), 1_000_000);
    }

    #[test]
    fn test_nonce_too_low() {
        let (mut state, sender) = setup(5);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let err = apply_message(
            &mut state,
            &mut env,
            &transfer(sender, 4),
            &mut pool,
            Address::random(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::NonceTooLow {
                state: 5,
                message: 4
            }
        ));
    }

    #[test]
    fn test_nonce_unchecked() {
        let (mut state, sender) = setup(5);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let msg = transfer(sender, 99).without_nonce_check();
        assert!(apply_message(&mut state, &mut env, &msg, &mut pool, Address::random()).is_ok());
    }

    #[test]
    fn test_gas_limit_below_intrinsic() {
        let (mut state, sender) = setup(0);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let msg = transfer(sender, 0).with_gas(20_999);
        let err = apply_message(&mut state, &mut env, &msg, &mut pool, Address::random())
            .unwrap_err();
        assert!(matches!(err, TransitionError::OutOfGas(OutOfGas)));
    }

    #[test]
    fn test_fee_error_surfaces_before_pool() {
        let (mut state, sender) = setup(0);
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 0 };

        let msg = transfer(sender, 0).with_value(20_999u32);
        let err = apply_message(&mut state, &mut env, &msg, &mut pool, Address::random())
            .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::Fee(FeeError::InsufficientForTransfer)
        ));
        assert_eq!(pool.gas(), 1_000_000);
    }

    #[test]
    fn test_execution_gas_counted() {
        let (mut state, sender) = setup(0);
        let recipient = Address::random();
        state.add_balance(&recipient, &Balance::from(1_000_000u32));
        let mut pool = GasPool::new(1_000_000);
        let mut env = FixedCostEnv { cost: 5_000 };

        let msg = Transaction::call(sender, recipient, 0)
            .with_gas(100_000)
            .with_gas_price(1u32)
            .with_data(vec![0xaa]);
        let result =
            apply_message(&mut state, &mut env, &msg, &mut pool, Address::random()).unwrap();

        assert_eq!(result.gas_used, 21_000 + 68 + 5_000);
        assert_eq!(result.return_data, vec![0x2a]);
        assert_eq!(pool.gas(), 1_000_000 - result.gas_used);
    }
}
