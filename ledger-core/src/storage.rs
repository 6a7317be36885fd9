//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `wallet` - Merchant wallet (key: merchant_id)
//! - `transactions` - Append-only wallet log (key: sequence, big-endian)
//! - `withdrawals` - Withdrawal receipts (key: sequence, big-endian)
//! - `orders` - Orders (key: internal order id)
//! - `customers` - Customer wallets (key: user_id)
//! - `customer_transactions` - Customer logs (key: len(user_id) as u32 || user_id || sequence)
//! - `meta` - Sequence counter
//!
//! Sequence keys make reverse iteration yield the most recent entry first.

use crate::{
    error::{Error, Result},
    store::{ChangeSet, Snapshot, Store},
    types::{CustomerTransaction, CustomerWallet, Wallet, WalletTransaction, WithdrawalReceipt},
    Config,
};
use canteen_model::{Order, UserId};
use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Column family names
const CF_WALLET: &str = "wallet";
const CF_TRANSACTIONS: &str = "transactions";
const CF_WITHDRAWALS: &str = "withdrawals";
const CF_ORDERS: &str = "orders";
const CF_CUSTOMERS: &str = "customers";
const CF_CUSTOMER_TRANSACTIONS: &str = "customer_transactions";
const CF_META: &str = "meta";

const KEY_SEQUENCE: &[u8] = b"sequence";

/// Store backed by RocksDB
pub struct RocksStore {
    db: DB,
    merchant_id: String,
    writer: Mutex<()>,
}

impl RocksStore {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_WALLET, Self::cf_options_state()),
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Self::cf_options_log()),
            ColumnFamilyDescriptor::new(CF_WITHDRAWALS, Self::cf_options_log()),
            ColumnFamilyDescriptor::new(CF_ORDERS, Self::cf_options_state()),
            ColumnFamilyDescriptor::new(CF_CUSTOMERS, Self::cf_options_state()),
            ColumnFamilyDescriptor::new(CF_CUSTOMER_TRANSACTIONS, Self::cf_options_log()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(
            path = ?path,
            merchant_id = %config.merchant_id,
            "Opened wallet store"
        );

        Ok(Self {
            db,
            merchant_id: config.merchant_id.clone(),
            writer: Mutex::new(()),
        })
    }

    // Column family options

    fn cf_options_log() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_options_state() -> Options {
        let mut opts = Options::default();
        // State is frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    fn get<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf_handle(cf)?;
        match self.db.get_cf(cf, key)? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Scan a column family newest first, optionally within a key prefix
    fn scan_reverse<T: DeserializeOwned>(
        &self,
        cf: &str,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let cf = self.cf_handle(cf)?;
        let limit = limit.unwrap_or(usize::MAX);
        let mut items = Vec::new();

        match prefix {
            None => {
                for item in self.db.iterator_cf(cf, IteratorMode::End).take(limit) {
                    let (_, value) = item?;
                    items.push(bincode::deserialize(&value)?);
                }
            }
            Some(prefix) => {
                let iter = self
                    .db
                    .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
                for item in iter {
                    let (key, value) = item?;
                    if !key.starts_with(prefix) {
                        break;
                    }
                    items.push(bincode::deserialize(&value)?);
                }
                items.reverse();
                items.truncate(limit);
            }
        }

        Ok(items)
    }

    fn load_sequence(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_META)?;
        match self.db.get_cf(cf, KEY_SEQUENCE)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    Error::Storage(format!("Corrupt sequence counter ({} bytes)", bytes.len()))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    /// Length-prefixed so no user's prefix is a prefix of another's
    fn customer_prefix(user_id: &UserId) -> Vec<u8> {
        let id = user_id.as_str().as_bytes();
        let mut key = Vec::with_capacity(4 + id.len() + 8);
        key.extend_from_slice(&(id.len() as u32).to_be_bytes());
        key.extend_from_slice(id);
        key
    }

    fn customer_transaction_key(user_id: &UserId, sequence: u64) -> Vec<u8> {
        let mut key = Self::customer_prefix(user_id);
        key.extend_from_slice(&sequence.to_be_bytes());
        key
    }
}

impl Snapshot for RocksStore {
    fn load_wallet(&self) -> Result<Option<Wallet>> {
        self.get(CF_WALLET, self.merchant_id.as_bytes())
    }

    fn load_order(&self, id: Uuid) -> Result<Option<Order>> {
        self.get(CF_ORDERS, id.as_bytes())
    }

    fn load_customer(&self, user_id: &UserId) -> Result<Option<CustomerWallet>> {
        self.get(CF_CUSTOMERS, user_id.as_str().as_bytes())
    }
}

impl Store for RocksStore {
    fn writer(&self) -> &Mutex<()> {
        &self.writer
    }

    /// Write the whole change set in one `WriteBatch`
    fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut batch = WriteBatch::default();
        let mut sequence = self.load_sequence()?;

        // 1. Wallet
        if let Some(wallet) = &changes.wallet {
            let cf = self.cf_handle(CF_WALLET)?;
            batch.put_cf(cf, self.merchant_id.as_bytes(), bincode::serialize(wallet)?);
        }

        // 2. Orders and customer wallets
        let cf_orders = self.cf_handle(CF_ORDERS)?;
        for (id, order) in &changes.orders {
            batch.put_cf(cf_orders, id.as_bytes(), bincode::serialize(order)?);
        }

        let cf_customers = self.cf_handle(CF_CUSTOMERS)?;
        for (user_id, customer) in &changes.customers {
            batch.put_cf(cf_customers, user_id.as_str().as_bytes(), bincode::serialize(customer)?);
        }

        // 3. Append-only logs
        let cf_transactions = self.cf_handle(CF_TRANSACTIONS)?;
        for entry in &changes.transactions {
            sequence += 1;
            batch.put_cf(cf_transactions, sequence.to_be_bytes(), bincode::serialize(entry)?);
        }

        let cf_withdrawals = self.cf_handle(CF_WITHDRAWALS)?;
        for receipt in &changes.withdrawals {
            sequence += 1;
            batch.put_cf(cf_withdrawals, sequence.to_be_bytes(), bincode::serialize(receipt)?);
        }

        let cf_customer_transactions = self.cf_handle(CF_CUSTOMER_TRANSACTIONS)?;
        for entry in &changes.customer_transactions {
            sequence += 1;
            let key = Self::customer_transaction_key(&entry.user_id, sequence);
            batch.put_cf(cf_customer_transactions, key, bincode::serialize(entry)?);
        }

        batch.put_cf(self.cf_handle(CF_META)?, KEY_SEQUENCE, sequence.to_be_bytes());

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(
            orders = changes.orders.len(),
            transactions = changes.transactions.len(),
            sequence,
            "Unit of work committed"
        );

        Ok(())
    }

    fn transactions(&self, limit: Option<usize>) -> Result<Vec<WalletTransaction>> {
        self.scan_reverse(CF_TRANSACTIONS, None, limit)
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalReceipt>> {
        self.scan_reverse(CF_WITHDRAWALS, None, None)
    }

    fn customer_transactions(&self, user_id: &UserId) -> Result<Vec<CustomerTransaction>> {
        let prefix = Self::customer_prefix(user_id);
        self.scan_reverse(CF_CUSTOMER_TRANSACTIONS, Some(prefix.as_slice()), None)
    }
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}
