use ember_core::{Address, Message};
use ember_state::StateDb;
use tracing::{debug, warn};

use crate::env::{EnvError, ExecOutput, ExecutionEnvironment};
use crate::error::TransitionError;
use crate::transition::StateTransition;

/// What the execution environment left behind for settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dispatch {
    pub(crate) return_data: Vec<u8>,
    /// Account charged for the gas: the sender of a creation, the target of a call
    pub(crate) recipient: Address,
    pub(crate) vm_error: Option<EnvError>,
}

impl<S, E, M> StateTransition<'_, S, E, M>
where
    S: StateDb,
    E: ExecutionEnvironment<S>,
    M: Message + ?Sized,
{
    /// Run the message through CREATE or CALL.
    ///
    /// Only a message call bumps the sender nonce here; a creation leaves it
    /// to the environment.
    pub(crate) fn dispatch(&mut self) -> Result<Dispatch, TransitionError> {
        let sender = self.msg.from();

        let (recipient, output) = match self.msg.to() {
            None => {
                let (_, output) = self.env.create(
                    self.state,
                    sender,
                    self.msg.data(),
                    self.gas,
                    self.msg.value(),
                );
                (sender, output)
            }
            Some(to) => {
                let nonce = self.state.get_nonce(&sender);
                self.state.set_nonce(&sender, nonce.saturating_add(1));
                let output = self.env.call(
                    self.state,
                    sender,
                    to,
                    self.msg.data(),
                    self.gas,
                    self.msg.value(),
                );
                (to, output)
            }
        };

        let ExecOutput {
            data,
            remaining_gas,
            error,
        } = output;

        if remaining_gas > self.gas {
            warn!(
                "Execution returned {} gas but was given {}, ignoring the excess",
                remaining_gas, self.gas
            );
        }
        self.gas = remaining_gas.min(self.gas);

        if let Some(err) = &error {
            debug!("VM returned with error: {}", err);
            if err.is_hard() {
                return Err(TransitionError::InsufficientBalance);
            }
        }

        Ok(Dispatch {
            return_data: data,
            recipient,
            vm_error: error,
        })
    }
}
