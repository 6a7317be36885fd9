//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//! Metrics live on a private registry so several ledgers can coexist in
//! one process.
//!
//! # Metrics
//!
//! - `ledger_transitions_total{edge}` - Applied status transitions by edge
//! - `ledger_entries_total{type}` - Wallet log entries by type
//! - `ledger_withdrawals_total` - Accepted withdrawals
//! - `ledger_withdrawals_rejected_total` - Rejected withdrawals
//! - `ledger_unit_of_work_duration_seconds` - Histogram of unit-of-work latency

use crate::transition::Edge;
use crate::types::TransactionType;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Applied transitions by edge
    pub transitions_total: IntCounterVec,

    /// Log entries by type
    pub entries_total: IntCounterVec,

    /// Accepted withdrawals
    pub withdrawals_total: IntCounter,

    /// Rejected withdrawals
    pub withdrawals_rejected: IntCounter,

    /// Unit-of-work duration histogram
    pub unit_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transitions_total = IntCounterVec::new(
            Opts::new("ledger_transitions_total", "Applied status transitions by edge"),
            &["edge"],
        )?;
        registry.register(Box::new(transitions_total.clone()))?;

        let entries_total = IntCounterVec::new(
            Opts::new("ledger_entries_total", "Wallet log entries by type"),
            &["type"],
        )?;
        registry.register(Box::new(entries_total.clone()))?;

        let withdrawals_total =
            IntCounter::new("ledger_withdrawals_total", "Accepted withdrawals")?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let withdrawals_rejected =
            IntCounter::new("ledger_withdrawals_rejected_total", "Rejected withdrawals")?;
        registry.register(Box::new(withdrawals_rejected.clone()))?;

        let unit_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_unit_of_work_duration_seconds",
                "Histogram of unit-of-work latencies",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250]),
        )?;
        registry.register(Box::new(unit_duration.clone()))?;

        Ok(Self {
            transitions_total,
            entries_total,
            withdrawals_total,
            withdrawals_rejected,
            unit_duration,
            registry,
        })
    }

    /// Record an applied transition
    pub fn record_transition(&self, edge: Edge) {
        self.transitions_total.with_label_values(&[edge.as_str()]).inc();
    }

    /// Record a log entry
    pub fn record_entry(&self, kind: TransactionType) {
        self.entries_total.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record withdrawal outcome
    pub fn record_withdrawal(&self, accepted: bool) {
        if accepted {
            self.withdrawals_total.inc();
        } else {
            self.withdrawals_rejected.inc();
        }
    }

    /// Record unit-of-work duration
    pub fn record_unit_duration(&self, duration_seconds: f64) {
        self.unit_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("withdrawals_total", &self.withdrawals_total.get())
            .field("withdrawals_rejected", &self.withdrawals_rejected.get())
            .finish_non_exhaustive()
    }
}
