use std::collections::BTreeMap;

use ember_core::{serialize, Account, Address, Balance, Hash};
use tracing::{debug, info, warn};

use crate::error::StateError;
use crate::merkle::compute_state_root;
use crate::state_db::{SnapshotId, StateDb};

/// A reversible change to the world state
#[derive(Debug, Clone)]
enum JournalEntry {
    AccountCreated { address: Address },
    BalanceChange { address: Address, prev: Balance },
    NonceChange { address: Address, prev: u64 },
    RefundChange { address: Address, prev: u64 },
}

/// In-memory world state with a change journal for snapshots
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    accounts: BTreeMap<Address, Account>,
    refunds: BTreeMap<Address, u64>,
    journal: Vec<JournalEntry>,
    /// Journal length at each outstanding snapshot
    snapshots: Vec<usize>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from a genesis allocation
    pub fn from_genesis<I>(alloc: I) -> Self
    where
        I: IntoIterator<Item = (Address, Account)>,
    {
        let accounts: BTreeMap<_, _> = alloc.into_iter().collect();
        info!("Initialized world state with {} accounts", accounts.len());
        WorldState {
            accounts,
            ..Self::default()
        }
    }

    /// Get account (read-only)
    pub fn get_account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Compute the current state root over all accounts
    pub fn state_root(&self) -> Result<Hash, StateError> {
        let mut entries = Vec::with_capacity(self.accounts.len());
        for (address, account) in &self.accounts {
            entries.push((address.as_bytes().to_vec(), serialize::to_bytes(account)?));
        }
        Ok(compute_state_root(
            entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())),
        ))
    }

    fn account_mut(&mut self, address: &Address) -> &mut Account {
        if !self.accounts.contains_key(address) {
            self.journal.push(JournalEntry::AccountCreated { address: *address });
        }
        self.accounts.entry(*address).or_default()
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountCreated { address } => {
                self.accounts.remove(&address);
            }
            JournalEntry::BalanceChange { address, prev } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.balance = prev;
                }
            }
            JournalEntry::NonceChange { address, prev } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.nonce = prev;
                }
            }
            JournalEntry::RefundChange { address, prev } => {
                if prev == 0 {
                    self.refunds.remove(&address);
                } else {
                    self.refunds.insert(address, prev);
                }
            }
        }
    }

    fn set_refund(&mut self, address: &Address, refund: u64) {
        let prev = self.get_refund(address);
        self.journal.push(JournalEntry::RefundChange {
            address: *address,
            prev,
        });
        if refund == 0 {
            self.refunds.remove(address);
        } else {
            self.refunds.insert(*address, refund);
        }
    }
}

impl StateDb for WorldState {
    fn get_balance(&self, address: &Address) -> Balance {
        self.accounts
            .get(address)
            .map(|a| a.balance.clone())
            .unwrap_or_default()
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    fn set_nonce(&mut self, address: &Address, nonce: u64) {
        let account = self.account_mut(address);
        let prev = account.nonce;
        account.nonce = nonce;
        self.journal.push(JournalEntry::NonceChange {
            address: *address,
            prev,
        });
    }

    fn add_balance(&mut self, address: &Address, amount: &Balance) {
        let account = self.account_mut(address);
        let prev = account.balance.clone();
        account.credit(amount);
        self.journal.push(JournalEntry::BalanceChange {
            address: *address,
            prev,
        });
    }

    fn sub_balance(&mut self, address: &Address, amount: &Balance) -> Result<(), StateError> {
        // Debit a copy so a failed debit never creates the account
        let mut debited = self.accounts.get(address).cloned().unwrap_or_default();
        let prev = debited.balance.clone();
        if !debited.debit(amount) {
            return Err(StateError::InsufficientBalance {
                address: *address,
                have: prev,
                need: amount.clone(),
            });
        }
        self.account_mut(address).balance = debited.balance;
        self.journal.push(JournalEntry::BalanceChange {
            address: *address,
            prev,
        });
        Ok(())
    }

    fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn create_account(&mut self, address: &Address) {
        self.account_mut(address);
    }

    fn get_refund(&self, address: &Address) -> u64 {
        self.refunds.get(address).copied().unwrap_or(0)
    }

    fn add_refund(&mut self, address: &Address, gas: u64) {
        let refund = self.get_refund(address).saturating_add(gas);
        self.set_refund(address, refund);
    }

    fn sub_refund(&mut self, address: &Address, gas: u64) {
        let refund = self.get_refund(address).saturating_sub(gas);
        self.set_refund(address, refund);
    }

    fn clear_refunds(&mut self) {
        let cleared: Vec<Address> = self.refunds.keys().copied().collect();
        for address in cleared {
            self.set_refund(&address, 0);
        }
    }

    fn snapshot(&mut self) -> SnapshotId {
        self.snapshots.push(self.journal.len());
        self.snapshots.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: SnapshotId) {
        let Some(&len) = self.snapshots.get(id) else {
            warn!("Revert to unknown snapshot {}", id);
            return;
        };
        let reverted = self.journal.len() - len;
        while self.journal.len() > len {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
        self.snapshots.truncate(id);
        debug!("Reverted {} state changes to snapshot {}", reverted, id);
    }

    fn commit(&mut self) {
        self.journal.clear();
        self.snapshots.clear();
    }
}
