//! Error types for the ledger

use canteen_model::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Withdrawal attempted before any transition created the wallet
    #[error("Wallet not found for merchant {0}")]
    WalletNotFound(String),

    /// Withdrawal larger than the settled balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Requested amount
        requested: Decimal,
        /// Settled balance at the time of the request
        available: Decimal,
    },

    /// Non-positive amount where a positive one is required
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order already recorded
    #[error("Duplicate order: {0}")]
    DuplicateOrder(String),

    /// Order is already cancelled
    #[error("Order already cancelled: {0}")]
    AlreadyCancelled(String),

    /// Status change with no defined wallet effect
    #[error("Illegal order transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Invariant violation (negative balance, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// CSV export error
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<canteen_model::ModelError> for Error {
    fn from(err: canteen_model::ModelError) -> Self {
        Error::Config(err.to_string())
    }
}
