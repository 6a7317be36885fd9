//! Wallet ledger engine
//!
//! Applies order-status transitions and withdrawals to the merchant wallet.
//! Every mutation runs inside one unit of work of the underlying
//! [`Store`]; callers that need to bind other writes to the same unit
//! (the order orchestration does) use [`Ledger::apply_in`].
//!
//! # Example
//!
//! ```no_run
//! use canteen_model::OrderStatus;
//! use ledger_core::{Ledger, MemoryStore, TransitionRequest};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! fn main() -> ledger_core::Result<()> {
//!     let ledger = Ledger::new(Arc::new(MemoryStore::new()), Default::default())?;
//!
//!     ledger.apply_transition(&TransitionRequest::new(
//!         "A-1042",
//!         OrderStatus::Pending,
//!         OrderStatus::Completed,
//!         Decimal::from(120),
//!     ))?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    metrics::Metrics,
    store::{Store, UnitOfWork},
    transition::{apply_effect, Edge},
    types::{
        TransactionType, TransitionRequest, Wallet, WalletTransaction, WalletView,
        WithdrawalReceipt, WithdrawalStatus,
    },
    Error, Result,
};
use canteen_model::BusinessCalendar;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Result of a transition request
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Same status or non-positive amount; nothing touched
    Ignored,
    /// Edge without wallet effect; nothing touched
    Neutral(Edge),
    /// Counters changed
    Applied {
        /// Classified edge
        edge: Edge,
        /// Wallet after the transition
        wallet: Wallet,
        /// Log entry written, if the edge logs
        entry: Option<WalletTransaction>,
    },
}

/// Main ledger interface
pub struct Ledger<S: Store> {
    store: Arc<S>,
    calendar: BusinessCalendar,
    metrics: Metrics,
}

impl<S: Store> Ledger<S> {
    /// Create ledger over a store
    pub fn new(store: Arc<S>, calendar: BusinessCalendar) -> Result<Self> {
        Ok(Self::with_metrics(store, calendar, Metrics::new()?))
    }

    /// Create ledger reporting into existing metrics
    pub fn with_metrics(store: Arc<S>, calendar: BusinessCalendar, metrics: Metrics) -> Self {
        Self {
            store,
            calendar,
            metrics,
        }
    }

    /// Apply a status transition in its own unit of work
    pub fn apply_transition(&self, request: &TransitionRequest) -> Result<TransitionOutcome> {
        self.apply_transition_at(request, Utc::now())
    }

    /// Apply a status transition as of `now`
    pub fn apply_transition_at(
        &self,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let started = Instant::now();
        let outcome = self
            .store
            .atomically(|unit| self.apply_in(unit, request, now))?;
        self.metrics.record_unit_duration(started.elapsed().as_secs_f64());
        self.record(&outcome);
        Ok(outcome)
    }

    /// Apply a status transition inside a caller-owned unit of work.
    ///
    /// Metrics are not recorded here since the unit may still abort; call
    /// [`Ledger::record`] after it commits.
    pub fn apply_in(
        &self,
        unit: &mut UnitOfWork<'_>,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        if request.is_noop() {
            tracing::debug!(
                order_id = ?request.order_id,
                status = %request.new_status,
                amount = %request.amount,
                "Transition ignored"
            );
            return Ok(TransitionOutcome::Ignored);
        }

        let edge = Edge::classify(request.old_status, request.new_status);
        let effect = edge.effect();

        if effect.is_none() {
            if edge == Edge::Unaccounted {
                tracing::warn!(
                    order_id = ?request.order_id,
                    from = %request.old_status,
                    to = %request.new_status,
                    "Transition has no wallet rule"
                );
            }
            return Ok(TransitionOutcome::Neutral(edge));
        }

        let today = self.calendar.date_of(now);
        let mut wallet = match unit.wallet()? {
            Some(wallet) => wallet,
            None => {
                tracing::info!(%today, "Initialising merchant wallet");
                Wallet::new(today, now)
            }
        };

        let previous_date = wallet.today_date;
        if wallet.roll_over(today) {
            tracing::info!(%previous_date, %today, "Daily collection rolled over");
        }

        let entry = apply_effect(
            &mut wallet,
            effect,
            request.amount,
            request.order_id.as_deref(),
            now,
        )?;

        unit.put_wallet(wallet.clone());
        if let Some(entry) = &entry {
            unit.append_transaction(entry.clone());
        }

        tracing::info!(
            order_id = ?request.order_id,
            %edge,
            amount = %request.amount,
            total_balance = %wallet.total_balance,
            pending_amount = %wallet.pending_amount,
            "Transition applied"
        );

        Ok(TransitionOutcome::Applied {
            edge,
            wallet,
            entry,
        })
    }

    /// Record metrics for a committed outcome
    pub fn record(&self, outcome: &TransitionOutcome) {
        match outcome {
            TransitionOutcome::Ignored => {}
            TransitionOutcome::Neutral(edge) => self.metrics.record_transition(*edge),
            TransitionOutcome::Applied { edge, entry, .. } => {
                self.metrics.record_transition(*edge);
                if let Some(entry) = entry {
                    self.metrics.record_entry(entry.kind);
                }
            }
        }
    }

    /// Withdraw settled funds
    pub fn withdraw(&self, amount: Decimal) -> Result<WithdrawalReceipt> {
        self.withdraw_at(amount, Utc::now())
    }

    /// Withdraw settled funds, requested at `requested_at`
    pub fn withdraw_at(
        &self,
        amount: Decimal,
        requested_at: DateTime<Utc>,
    ) -> Result<WithdrawalReceipt> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let started = Instant::now();
        let result = self.store.atomically(|unit| {
            let mut wallet = unit
                .wallet()?
                .ok_or_else(|| Error::WalletNotFound("merchant".to_string()))?;

            if amount > wallet.total_balance {
                return Err(Error::InsufficientFunds {
                    requested: amount,
                    available: wallet.total_balance,
                });
            }

            let processed_at = Utc::now().max(requested_at);
            wallet.total_balance -= amount;
            wallet.last_updated = processed_at;
            wallet.check_invariants()?;

            let receipt = WithdrawalReceipt {
                id: Uuid::now_v7(),
                amount,
                status: WithdrawalStatus::Completed,
                requested_at,
                processed_at,
            };

            unit.put_wallet(wallet);
            unit.append_transaction(WalletTransaction::new(
                TransactionType::Withdrawal,
                amount,
                None,
                format!("Withdrawal {}", receipt.id),
                processed_at,
            ));
            unit.record_withdrawal(receipt.clone());

            Ok(receipt)
        });
        self.metrics.record_unit_duration(started.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => {
                self.metrics.record_withdrawal(true);
                self.metrics.record_entry(TransactionType::Withdrawal);
                tracing::info!(receipt_id = %receipt.id, amount = %amount, "Withdrawal processed");
            }
            Err(e) => {
                self.metrics.record_withdrawal(false);
                tracing::warn!(amount = %amount, error = %e, "Withdrawal rejected");
            }
        }

        result
    }

    /// Wallet read model as of now
    pub fn wallet(&self) -> Result<Option<WalletView>> {
        self.wallet_at(Utc::now())
    }

    /// Wallet read model as of `now`
    pub fn wallet_at(&self, now: DateTime<Utc>) -> Result<Option<WalletView>> {
        let today = self.calendar.date_of(now);
        Ok(self
            .store
            .load_wallet()?
            .map(|wallet| WalletView::as_of(&wallet, today)))
    }

    /// Wallet log, most recent first
    pub fn transactions(&self, limit: Option<usize>) -> Result<Vec<WalletTransaction>> {
        self.store.transactions(limit)
    }

    /// Withdrawal receipts, most recent first
    pub fn withdrawals(&self) -> Result<Vec<WithdrawalReceipt>> {
        self.store.withdrawals()
    }

    /// Write the wallet log as CSV, most recent first
    pub fn export_transactions_csv<W: std::io::Write>(
        &self,
        writer: W,
        limit: Option<usize>,
    ) -> Result<()> {
        let entries = self.store.transactions(limit)?;
        crate::export::write_transactions_csv(writer, &entries, &self.calendar)
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Business calendar
    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<S: Store> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}
