//! Canteen Ledger Core
//!
//! Merchant wallet ledger driven by order status transitions.
//!
//! # Architecture
//!
//! - **Escrow**: Accepted orders park their total in `pending_amount`
//! - **Settlement**: Completion moves escrow into the withdrawable balance
//! - **Unit of Work**: Wallet mutation and log entry commit together or not at all
//! - **Single Writer**: One writer per store serializes every read-modify-write
//!
//! # Invariants
//!
//! - Balances never go negative: a violating transition aborts its unit
//! - Every non-zero wallet change is paired with exactly one log entry
//! - The wallet log is append-only
//! - `today_collection` only counts settlements on the current business day

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod memory;
pub mod metrics;
pub mod orders;
pub mod storage;
pub mod store;
pub mod transition;
pub mod types;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::{Ledger, TransitionOutcome};
pub use memory::MemoryStore;
pub use orders::{OrderService, StatusChange};
pub use storage::RocksStore;
pub use store::{ChangeSet, Snapshot, Store, UnitOfWork};
pub use transition::Edge;
pub use types::{
    CustomerTransaction, CustomerWallet, TransactionType, TransitionRequest, Wallet,
    WalletTransaction, WalletView, WithdrawalReceipt,
};
