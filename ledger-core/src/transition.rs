//! Order-status transition table
//!
//! Every (old, new) status pair is classified into an [`Edge`], and every
//! edge maps to a fixed [`Effect`] on the wallet counters. The
//! classification is an exhaustive match, so adding a status forces a
//! decision here.
//!
//! | Old                         | New                         | Edge             |
//! |-----------------------------|-----------------------------|------------------|
//! | pending                     | confirmed/preparing/ready   | `Escrow`         |
//! | confirmed/preparing/ready   | completed                   | `Settle`         |
//! | pending                     | completed                   | `SettleDirect`   |
//! | confirmed/preparing/ready   | cancelled                   | `ReleaseEscrow`  |
//! | completed                   | cancelled                   | `Reverse`        |
//! | pending                     | cancelled                   | `DropUnpaid`     |
//! | confirmed/preparing/ready   | confirmed/preparing/ready   | `WithinEscrow`   |
//! | anything else               |                             | `Unaccounted`    |

use crate::types::{TransactionType, Wallet, WalletTransaction};
use crate::Result;
use canteen_model::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Kitchen accepted the order; funds move into escrow
    Escrow,
    /// Escrowed order handed over; funds settle
    Settle,
    /// Order completed without passing through escrow
    SettleDirect,
    /// Escrowed order cancelled; escrow released
    ReleaseEscrow,
    /// Settled order cancelled; settlement reversed
    Reverse,
    /// Order cancelled before acceptance; never escrowed
    DropUnpaid,
    /// Move between escrow states
    WithinEscrow,
    /// Pair the wallet does not account for (moves out of terminal states, backwards to pending)
    Unaccounted,
}

/// Counter deltas of an edge, as signs applied to the order amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    /// Sign applied to `pending_amount`
    pub pending: i8,
    /// Sign applied to `total_balance`
    pub total: i8,
    /// Sign applied to `today_collection`
    pub today: i8,
    /// Log entry written, if any
    pub entry: Option<TransactionType>,
}

impl Effect {
    const NONE: Effect = Effect {
        pending: 0,
        total: 0,
        today: 0,
        entry: None,
    };

    /// Check if the effect touches the wallet at all
    pub fn is_none(&self) -> bool {
        *self == Effect::NONE
    }
}

impl Edge {
    /// Classify a status change
    pub fn classify(old: OrderStatus, new: OrderStatus) -> Edge {
        use OrderStatus::*;

        match (old, new) {
            (Pending, Confirmed | Preparing | Ready) => Edge::Escrow,
            (Confirmed | Preparing | Ready, Completed) => Edge::Settle,
            (Pending, Completed) => Edge::SettleDirect,
            (Confirmed | Preparing | Ready, Cancelled) => Edge::ReleaseEscrow,
            (Completed, Cancelled) => Edge::Reverse,
            (Pending, Cancelled) => Edge::DropUnpaid,
            (Confirmed | Preparing | Ready, Confirmed | Preparing | Ready) => Edge::WithinEscrow,
            (Pending, Pending)
            | (Confirmed | Preparing | Ready, Pending)
            | (Completed, Pending | Confirmed | Preparing | Ready | Completed)
            | (Cancelled, _) => Edge::Unaccounted,
        }
    }

    /// Wallet effect of the edge
    pub const fn effect(self) -> Effect {
        match self {
            Edge::Escrow => Effect {
                pending: 1,
                total: 0,
                today: 0,
                entry: None,
            },
            Edge::Settle => Effect {
                pending: -1,
                total: 1,
                today: 1,
                entry: Some(TransactionType::Credit),
            },
            Edge::SettleDirect => Effect {
                pending: 0,
                total: 1,
                today: 1,
                entry: Some(TransactionType::Credit),
            },
            Edge::ReleaseEscrow => Effect {
                pending: -1,
                total: 0,
                today: 0,
                entry: None,
            },
            Edge::Reverse => Effect {
                pending: 0,
                total: -1,
                today: 0,
                entry: Some(TransactionType::RefundDeduction),
            },
            Edge::DropUnpaid | Edge::WithinEscrow | Edge::Unaccounted => Effect::NONE,
        }
    }

    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Escrow => "escrow",
            Edge::Settle => "settle",
            Edge::SettleDirect => "settle_direct",
            Edge::ReleaseEscrow => "release_escrow",
            Edge::Reverse => "reverse",
            Edge::DropUnpaid => "drop_unpaid",
            Edge::WithinEscrow => "within_escrow",
            Edge::Unaccounted => "unaccounted",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn signed(amount: Decimal, sign: i8) -> Decimal {
    amount * Decimal::from(sign)
}

/// Apply an effect to the wallet and build the log entry it calls for.
///
/// The wallet is only modified if the resulting balances satisfy the
/// invariants.
pub fn apply_effect(
    wallet: &mut Wallet,
    effect: Effect,
    amount: Decimal,
    order_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<WalletTransaction>> {
    let mut next = wallet.clone();
    next.pending_amount += signed(amount, effect.pending);
    next.total_balance += signed(amount, effect.total);
    next.today_collection += signed(amount, effect.today);
    next.check_invariants()?;

    next.last_updated = now;
    *wallet = next;

    Ok(effect.entry.map(|kind| {
        WalletTransaction::new(
            kind,
            amount,
            order_id.map(str::to_string),
            describe(kind, order_id),
            now,
        )
    }))
}

fn describe(kind: TransactionType, order_id: Option<&str>) -> String {
    let order = order_id.unwrap_or("unknown");
    match kind {
        TransactionType::Credit => format!("Payment received for order {}", order),
        TransactionType::RefundDeduction => format!("Refund deducted for cancelled order {}", order),
        TransactionType::Withdrawal => "Withdrawal".to_string(),
    }
}
