//! In-memory store
//!
//! Same unit-of-work semantics as the RocksDB store, without durability.
//! Used by tests and by embedders that persist elsewhere.

use crate::store::{ChangeSet, Snapshot, Store};
use crate::types::{
    CustomerTransaction, CustomerWallet, Wallet, WalletTransaction, WithdrawalReceipt,
};
use crate::Result;
use canteen_model::{Order, UserId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    wallet: Option<Wallet>,
    orders: HashMap<Uuid, Order>,
    customers: HashMap<UserId, CustomerWallet>,
    transactions: Vec<WalletTransaction>,
    customer_transactions: Vec<CustomerTransaction>,
    withdrawals: Vec<WithdrawalReceipt>,
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    writer: Mutex<()>,
}

impl MemoryStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the wallet, bypassing the ledger (fixtures only)
    pub fn with_wallet(self, wallet: Wallet) -> Self {
        self.state.write().wallet = Some(wallet);
        self
    }
}

impl Snapshot for MemoryStore {
    fn load_wallet(&self) -> Result<Option<Wallet>> {
        Ok(self.state.read().wallet.clone())
    }

    fn load_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.state.read().orders.get(&id).cloned())
    }

    fn load_customer(&self, user_id: &UserId) -> Result<Option<CustomerWallet>> {
        Ok(self.state.read().customers.get(user_id).cloned())
    }
}

impl Store for MemoryStore {
    fn writer(&self) -> &Mutex<()> {
        &self.writer
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut state = self.state.write();

        if let Some(wallet) = changes.wallet {
            state.wallet = Some(wallet);
        }
        state.orders.extend(changes.orders);
        state.customers.extend(changes.customers);
        state.transactions.extend(changes.transactions);
        state.customer_transactions.extend(changes.customer_transactions);
        state.withdrawals.extend(changes.withdrawals);

        Ok(())
    }

    fn transactions(&self, limit: Option<usize>) -> Result<Vec<WalletTransaction>> {
        let state = self.state.read();
        Ok(state
            .transactions
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalReceipt>> {
        Ok(self.state.read().withdrawals.iter().rev().cloned().collect())
    }

    fn customer_transactions(&self, user_id: &UserId) -> Result<Vec<CustomerTransaction>> {
        let state = self.state.read();
        Ok(state
            .customer_transactions
            .iter()
            .rev()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect())
    }
}
