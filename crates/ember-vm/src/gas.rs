use ember_core::{Address, Balance, Message};
use ember_state::StateDb;
use tracing::debug;

use crate::env::ExecutionEnvironment;
use crate::error::FeeError;
use crate::transition::StateTransition;

/// The quantity that has to cover `gas_price * gas` before a message runs.
///
/// Plain transfers are backed by the value they move, contract creations by
/// the sender and message calls by the called account. Gas is later charged
/// to the same account that settlement debits, so the recipient of a call
/// pays for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePayer {
    /// Empty payload: the transferred value
    TransferValue,
    /// Payload without recipient: the sender balance
    Sender(Address),
    /// Payload with a recipient: the recipient balance
    Recipient(Address),
}

impl FeePayer {
    pub fn resolve<M: Message + ?Sized>(msg: &M) -> Self {
        if msg.data().is_empty() {
            FeePayer::TransferValue
        } else {
            match msg.to() {
                None => FeePayer::Sender(msg.from()),
                Some(to) => FeePayer::Recipient(to),
            }
        }
    }

    /// The amount checked against the required fee
    pub fn available<M, S>(&self, msg: &M, state: &S) -> Balance
    where
        M: Message + ?Sized,
        S: StateDb,
    {
        match self {
            FeePayer::TransferValue => msg.value().clone(),
            FeePayer::Sender(address) | FeePayer::Recipient(address) => {
                state.get_balance(address)
            }
        }
    }

    /// The error reported when the available amount falls short
    pub fn insufficient(&self) -> FeeError {
        match self {
            FeePayer::TransferValue => FeeError::InsufficientForTransfer,
            FeePayer::Sender(_) => FeeError::InsufficientBySenderBalance,
            FeePayer::Recipient(_) => FeeError::InsufficientByRecipientBalance,
        }
    }
}

impl<S, E, M> StateTransition<'_, S, E, M>
where
    S: StateDb,
    E: ExecutionEnvironment<S>,
    M: Message + ?Sized,
{
    /// Check the resolved payer covers the gas limit and reserve it from the
    /// block gas pool. No balance moves here.
    pub(crate) fn buy_gas(&mut self) -> Result<(), FeeError> {
        let gas = self.msg.gas();
        let payer = FeePayer::resolve(self.msg);
        let required = self.msg.gas_price() * gas;
        let available = payer.available(self.msg, &*self.state);

        if available < required {
            debug!(
                "Gas purchase rejected: {:?} has {}, needs {}",
                payer, available, required
            );
            return Err(payer.insufficient());
        }

        self.pool.sub_gas(gas)?;
        self.gas = gas;
        self.initial_gas = gas;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{Account, GasPool, GasPoolError, Transaction};
    use ember_state::WorldState;

    use crate::env::ExecOutput;

    struct NoopEnv;

    impl<S: StateDb> ExecutionEnvironment<S> for NoopEnv {
        fn create(
            &mut self,
            _: &mut S,
            _: Address,
            _: &[u8],
            gas: u64,
            _: &Balance,
        ) -> (Address, ExecOutput) {
            (Address::ZERO, ExecOutput::success(Vec::new(), gas))
        }

        fn call(
            &mut self,
            _: &mut S,
            _: Address,
            _: Address,
            _: &[u8],
            gas: u64,
            _: &Balance,
        ) -> ExecOutput {
            ExecOutput::success(Vec::new(), gas)
        }
    }

    fn buy(state: &mut WorldState, pool: &mut GasPool, msg: &Transaction) -> Result<u64, FeeError> {
        let mut env = NoopEnv;
        let mut st = StateTransition::new(state, &mut env, msg, pool, Address::ZERO);
        st.buy_gas()?;
        assert_eq!(st.initial_gas(), msg.gas);
        Ok(st.remaining_gas())
    }

    fn state_with(balances: &[(Address, u64)]) -> WorldState {
        WorldState::from_genesis(
            balances
                .iter()
                .map(|(a, b)| (*a, Account::new(Balance::from(*b), 0))),
        )
    }

    #[test]
    fn test_resolve_payer() {
        let from = Address::random();
        let to = Address::random();

        let transfer = Transaction::call(from, to, 0);
        assert_eq!(FeePayer::resolve(&transfer), FeePayer::TransferValue);

        let create = Transaction::create(from, 0).with_data(vec![1]);
        assert_eq!(FeePayer::resolve(&create), FeePayer::Sender(from));

        let call = Transaction::call(from, to, 0).with_data(vec![1]);
        assert_eq!(FeePayer::resolve(&call), FeePayer::Recipient(to));

        let empty_create = Transaction::create(from, 0);
        assert_eq!(FeePayer::resolve(&empty_create), FeePayer::TransferValue);
    }

    #[test]
    fn test_transfer_checks_value_not_balances() {
        let from = Address::random();
        let to = Address::random();
        // Sender is rich, but the value alone must cover the fee
        let mut state = state_with(&[(from, 10_000_000)]);
        let mut pool = GasPool::new(1_000_000);

        let msg = Transaction::call(from, to, 0)
            .with_gas(21_000)
            .with_gas_price(2u32)
            .with_value(41_999u32);
        assert_eq!(
            buy(&mut state, &mut pool, &msg),
            Err(FeeError::InsufficientForTransfer)
        );

        let msg = msg.with_value(42_000u32);
        assert_eq!(buy(&mut state, &mut pool, &msg), Ok(21_000));
        assert_eq!(pool.gas(), 1_000_000 - 21_000);
    }

    #[test]
    fn test_creation_checks_sender_balance() {
        let from = Address::random();
        let mut state = state_with(&[(from, 59_999)]);
        let mut pool = GasPool::new(1_000_000);

        let msg = Transaction::create(from, 0)
            .with_gas(60_000)
            .with_gas_price(1u32)
            .with_value(1_000_000u32)
            .with_data(vec![0x60]);
        assert_eq!(
            buy(&mut state, &mut pool, &msg),
            Err(FeeError::InsufficientBySenderBalance)
        );

        state.add_balance(&from, &Balance::from(1u32));
        assert_eq!(buy(&mut state, &mut pool, &msg), Ok(60_000));
    }

    #[test]
    fn test_call_checks_recipient_balance() {
        let from = Address::random();
        let to = Address::random();
        let mut state = state_with(&[(from, 10_000_000), (to, 99_999)]);
        let mut pool = GasPool::new(1_000_000);

        let msg = Transaction::call(from, to, 0)
            .with_gas(100_000)
            .with_gas_price(1u32)
            .with_data(vec![0x01]);
        assert_eq!(
            buy(&mut state, &mut pool, &msg),
            Err(FeeError::InsufficientByRecipientBalance)
        );
        assert_eq!(pool.gas(), 1_000_000);

        state.add_balance(&to, &Balance::from(1u32));
        assert_eq!(buy(&mut state, &mut pool, &msg), Ok(100_000));
    }

    #[test]
    fn test_fee_errors_share_message_but_differ() {
        let errors = [
            FeeError::InsufficientForTransfer,
            FeeError::InsufficientBySenderBalance,
            FeeError::InsufficientByRecipientBalance,
        ];
        for err in &errors {
            assert_eq!(err.to_string(), "insufficient balance to pay for gas");
        }
        assert_ne!(errors[0], errors[1]);
        assert_ne!(errors[1], errors[2]);
    }

    #[test]
    fn test_block_gas_limit_exceeded() {
        let from = Address::random();
        let to = Address::random();
        let mut state = WorldState::new();
        let mut pool = GasPool::new(30_000);

        let msg = Transaction::call(from, to, 0)
            .with_gas(30_001)
            .with_gas_price(1u32)
            .with_value(1_000_000u32);
        assert_eq!(
            buy(&mut state, &mut pool, &msg),
            Err(FeeError::BlockGasLimitExceeded(
                GasPoolError::GasLimitReached {
                    requested: 30_001,
                    available: 30_000
                }
            ))
        );
        assert_eq!(pool.gas(), 30_000);
    }

    #[test]
    fn test_zero_gas_price_needs_nothing() {
        let from = Address::random();
        let to = Address::random();
        let mut state = WorldState::new();
        let mut pool = GasPool::new(100_000);

        let msg = Transaction::call(from, to, 0)
            .with_gas(50_000)
            .with_data(vec![1, 2, 3]);
        assert_eq!(buy(&mut state, &mut pool, &msg), Ok(50_000));
    }
}
