use ember_core::{Address, Balance};

use crate::error::StateError;

/// Identifier returned by [`StateDb::snapshot`]
pub type SnapshotId = usize;

/// Account state store consumed by the state transition and by execution
/// environments.
///
/// Accounts that were never written read as zero balance and zero nonce.
pub trait StateDb {
    fn get_balance(&self, address: &Address) -> Balance;

    fn get_nonce(&self, address: &Address) -> u64;

    fn set_nonce(&mut self, address: &Address, nonce: u64);

    fn add_balance(&mut self, address: &Address, amount: &Balance);

    /// Debit `amount`. Never lets a balance go negative.
    fn sub_balance(&mut self, address: &Address, amount: &Balance) -> Result<(), StateError>;

    /// Whether the account has been written
    fn exists(&self, address: &Address) -> bool;

    /// Create an empty account, keeping the balance of an existing one
    fn create_account(&mut self, address: &Address);

    /// Gas refund accumulated by `address` during the current transaction
    fn get_refund(&self, address: &Address) -> u64;

    fn add_refund(&mut self, address: &Address, gas: u64);

    fn sub_refund(&mut self, address: &Address, gas: u64);

    /// Reset all refund counters; called before each transaction
    fn clear_refunds(&mut self);

    /// Mark a point the state can be reverted to
    fn snapshot(&mut self) -> SnapshotId;

    /// Undo every change made since `id` was taken
    fn revert_to_snapshot(&mut self, id: SnapshotId);

    /// Make all changes permanent and drop outstanding snapshots
    fn commit(&mut self);
}
