//! Atomic unit of work over the wallet store
//!
//! A [`Store`] serialises writers behind one lock. Inside
//! [`Store::atomically`] the caller gets a [`UnitOfWork`] that reads through
//! to committed state, stages every write in a [`ChangeSet`], and sees its
//! own staged writes on later reads. The change set is committed in one
//! atomic write when the closure returns `Ok`, and dropped otherwise.

use crate::types::{
    CustomerTransaction, CustomerWallet, Wallet, WalletTransaction, WithdrawalReceipt,
};
use crate::Result;
use canteen_model::{Order, UserId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Point reads of committed state
pub trait Snapshot {
    /// Load the merchant wallet
    fn load_wallet(&self) -> Result<Option<Wallet>>;

    /// Load an order by internal ID
    fn load_order(&self, id: Uuid) -> Result<Option<Order>>;

    /// Load a customer wallet
    fn load_customer(&self, user_id: &UserId) -> Result<Option<CustomerWallet>>;
}

/// Transactional wallet store
pub trait Store: Snapshot + Send + Sync + 'static {
    /// Writer lock serialising units of work
    fn writer(&self) -> &Mutex<()>;

    /// Commit a change set atomically
    fn commit(&self, changes: ChangeSet) -> Result<()>;

    /// Wallet log, most recent first
    fn transactions(&self, limit: Option<usize>) -> Result<Vec<WalletTransaction>>;

    /// Withdrawal receipts, most recent first
    fn withdrawals(&self) -> Result<Vec<WithdrawalReceipt>>;

    /// A customer's own log, most recent first
    fn customer_transactions(&self, user_id: &UserId) -> Result<Vec<CustomerTransaction>>;

    /// Run `work` as one all-or-nothing unit
    fn atomically<T, F>(&self, work: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut UnitOfWork<'_>) -> Result<T>,
    {
        let _guard = self.writer().lock();

        let mut unit = UnitOfWork::new(self);
        let output = work(&mut unit)?;

        let changes = unit.into_changes();
        if !changes.is_empty() {
            self.commit(changes)?;
        }

        Ok(output)
    }
}

/// Staged writes of one unit of work
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    /// New wallet state
    pub wallet: Option<Wallet>,
    /// Upserted orders
    pub orders: BTreeMap<Uuid, Order>,
    /// Upserted customer wallets
    pub customers: BTreeMap<UserId, CustomerWallet>,
    /// Appended wallet log entries, in order
    pub transactions: Vec<WalletTransaction>,
    /// Appended customer log entries, in order
    pub customer_transactions: Vec<CustomerTransaction>,
    /// Recorded withdrawals
    pub withdrawals: Vec<WithdrawalReceipt>,
}

impl ChangeSet {
    /// Check if nothing was staged
    pub fn is_empty(&self) -> bool {
        self.wallet.is_none()
            && self.orders.is_empty()
            && self.customers.is_empty()
            && self.transactions.is_empty()
            && self.customer_transactions.is_empty()
            && self.withdrawals.is_empty()
    }
}

/// Read-your-writes view over a snapshot
pub struct UnitOfWork<'a> {
    snapshot: &'a dyn Snapshot,
    changes: ChangeSet,
}

impl<'a> UnitOfWork<'a> {
    /// Start a unit over committed state
    pub fn new(snapshot: &'a dyn Snapshot) -> Self {
        Self {
            snapshot,
            changes: ChangeSet::default(),
        }
    }

    /// Current wallet
    pub fn wallet(&self) -> Result<Option<Wallet>> {
        match &self.changes.wallet {
            Some(wallet) => Ok(Some(wallet.clone())),
            None => self.snapshot.load_wallet(),
        }
    }

    /// Stage wallet state
    pub fn put_wallet(&mut self, wallet: Wallet) {
        self.changes.wallet = Some(wallet);
    }

    /// Current order
    pub fn order(&self, id: Uuid) -> Result<Option<Order>> {
        match self.changes.orders.get(&id) {
            Some(order) => Ok(Some(order.clone())),
            None => self.snapshot.load_order(id),
        }
    }

    /// Stage order state
    pub fn put_order(&mut self, order: Order) {
        self.changes.orders.insert(order.id, order);
    }

    /// Current customer wallet
    pub fn customer(&self, user_id: &UserId) -> Result<Option<CustomerWallet>> {
        match self.changes.customers.get(user_id) {
            Some(customer) => Ok(Some(customer.clone())),
            None => self.snapshot.load_customer(user_id),
        }
    }

    /// Stage customer wallet state
    pub fn put_customer(&mut self, customer: CustomerWallet) {
        self.changes.customers.insert(customer.user_id.clone(), customer);
    }

    /// Append a wallet log entry
    pub fn append_transaction(&mut self, entry: WalletTransaction) {
        self.changes.transactions.push(entry);
    }

    /// Append a customer log entry
    pub fn append_customer_transaction(&mut self, entry: CustomerTransaction) {
        self.changes.customer_transactions.push(entry);
    }

    /// Record a withdrawal receipt
    pub fn record_withdrawal(&mut self, receipt: WithdrawalReceipt) {
        self.changes.withdrawals.push(receipt);
    }

    /// Finish the unit and hand over its staged writes
    pub fn into_changes(self) -> ChangeSet {
        self.changes
    }
}

impl std::fmt::Debug for UnitOfWork<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}
