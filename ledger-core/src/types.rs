//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact arithmetic (Decimal for money)
//! - Append-only audit records (transactions are never mutated)

use canteen_model::{OrderStatus, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Merchant wallet (one per merchant)
///
/// Only the ledger engine mutates it. Both balances must stay
/// non-negative; a negative value is a logic bug and aborts the unit of
/// work instead of being clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Settled, withdrawable funds
    pub total_balance: Decimal,

    /// Funds held in escrow for accepted, unfinished orders
    pub pending_amount: Decimal,

    /// Settled funds credited since `today_date` began
    pub today_collection: Decimal,

    /// Business date `today_collection` belongs to
    pub today_date: NaiveDate,

    /// Last mutation
    pub last_updated: DateTime<Utc>,
}

impl Wallet {
    /// Zeroed wallet for the given business date
    pub fn new(today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            total_balance: Decimal::ZERO,
            pending_amount: Decimal::ZERO,
            today_collection: Decimal::ZERO,
            today_date: today,
            last_updated: now,
        }
    }

    /// Reset the daily collection when the business date moved on.
    ///
    /// Returns true if a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.today_date == today {
            return false;
        }
        self.today_collection = Decimal::ZERO;
        self.today_date = today;
        true
    }

    /// Check the non-negative balance invariants
    pub fn check_invariants(&self) -> crate::Result<()> {
        if self.total_balance < Decimal::ZERO {
            return Err(crate::Error::InvariantViolation(format!(
                "total_balance would become {}",
                self.total_balance
            )));
        }
        if self.pending_amount < Decimal::ZERO {
            return Err(crate::Error::InvariantViolation(format!(
                "pending_amount would become {}",
                self.pending_amount
            )));
        }
        Ok(())
    }
}

/// Wallet read model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletView {
    /// Settled, withdrawable funds
    pub total_balance: Decimal,
    /// Funds in escrow
    pub pending_amount: Decimal,
    /// Collection for `today_date`
    pub today_collection: Decimal,
    /// Business date
    pub today_date: NaiveDate,
    /// Last mutation
    pub last_updated: DateTime<Utc>,
}

impl WalletView {
    /// Project a stored wallet as seen on `today`.
    ///
    /// A wallet that has not been touched since an earlier business date
    /// reports zero collection for today without rewriting the record.
    pub fn as_of(wallet: &Wallet, today: NaiveDate) -> Self {
        let stale = wallet.today_date != today;
        Self {
            total_balance: wallet.total_balance,
            pending_amount: wallet.pending_amount,
            today_collection: if stale {
                Decimal::ZERO
            } else {
                wallet.today_collection
            },
            today_date: today,
            last_updated: wallet.last_updated,
        }
    }
}

/// Wallet log entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Completed order settled into the balance
    Credit,
    /// Merchant withdrawal
    Withdrawal,
    /// Completed order cancelled after settlement
    RefundDeduction,
}

impl TransactionType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::RefundDeduction => "refund_deduction",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable wallet log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Entry ID (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Amount (always positive; direction follows from the type)
    pub amount: Decimal,

    /// Entry type
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Display ID of the order that caused it
    pub order_id: Option<String>,

    /// Human-readable description
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Create new entry
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        order_id: Option<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            amount,
            kind,
            order_id,
            description: description.into(),
            created_at,
        }
    }
}

/// Withdrawal status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Deducted from the balance
    Completed,
}

/// Withdrawal receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Receipt ID
    pub id: Uuid,
    /// Withdrawn amount
    pub amount: Decimal,
    /// Status
    pub status: WithdrawalStatus,
    /// When the merchant asked
    pub requested_at: DateTime<Utc>,
    /// When the balance was deducted
    pub processed_at: DateTime<Utc>,
}

/// Customer's personal wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerWallet {
    /// Owner
    pub user_id: UserId,
    /// Spendable balance
    pub balance: Decimal,
    /// Last mutation
    pub updated_at: DateTime<Utc>,
}

impl CustomerWallet {
    /// Zeroed wallet
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
            updated_at: now,
        }
    }
}

/// Customer log entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTransactionType {
    /// Money returned for a cancelled order
    Refund,
}

/// Immutable customer log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTransaction {
    /// Entry ID
    pub id: Uuid,
    /// Owner
    pub user_id: UserId,
    /// Amount (positive)
    pub amount: Decimal,
    /// Entry type
    #[serde(rename = "type")]
    pub kind: CustomerTransactionType,
    /// Display ID of the order
    pub order_id: Option<String>,
    /// Human-readable description
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Inbound transition request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Display ID of the order
    pub order_id: Option<String>,
    /// Status before the change
    pub old_status: OrderStatus,
    /// Status after the change
    pub new_status: OrderStatus,
    /// Order total
    pub amount: Decimal,
}

impl TransitionRequest {
    /// Create new request
    pub fn new(
        order_id: impl Into<String>,
        old_status: OrderStatus,
        new_status: OrderStatus,
        amount: Decimal,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            old_status,
            new_status,
            amount,
        }
    }

    /// Same status or non-positive amount: nothing to do
    pub fn is_noop(&self) -> bool {
        self.amount <= Decimal::ZERO || self.old_status == self.new_status
    }
}
