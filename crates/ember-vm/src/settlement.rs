use ember_core::params::REFUND_QUOTIENT;
use ember_core::{Address, Message};
use ember_state::StateDb;
use tracing::{debug, error};

use crate::env::ExecutionEnvironment;
use crate::error::TransitionError;
use crate::transition::StateTransition;

impl<S, E, M> StateTransition<'_, S, E, M>
where
    S: StateDb,
    E: ExecutionEnvironment<S>,
    M: Message + ?Sized,
{
    /// Apply the refund counter, capped to half of the gas used, and hand the
    /// remaining gas back to the block.
    pub(crate) fn refund_gas(&mut self) {
        let cap = self.gas_used() / REFUND_QUOTIENT;
        let refund = cap.min(self.state.get_refund(&self.msg.from()));
        self.gas += refund;

        self.pool.add_gas(self.gas);
    }

    /// Charge `gas_price * gas_used` to `recipient` and pay it to the coinbase
    pub(crate) fn refund_and_settle(&mut self, recipient: &Address) -> Result<(), TransitionError> {
        self.refund_gas();

        let fee = self.msg.gas_price() * self.gas_used();
        if let Err(e) = self.state.sub_balance(recipient, &fee) {
            error!("Cannot settle fee of {} against {}: {}", fee, recipient, e);
            return Err(e.into());
        }
        self.state.add_balance(&self.coinbase, &fee);

        debug!(
            "Settled {} gas ({}) from {} to coinbase {}",
            self.gas_used(),
            fee,
            recipient,
            self.coinbase
        );
        Ok(())
    }
}
