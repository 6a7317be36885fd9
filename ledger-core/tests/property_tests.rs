//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Path independence: escrow stages never change what settles
//! - Balances never go negative, whatever the status sequence
//! - The log accounts for every unit of `total_balance`
//! - `pending_amount` is exactly the value of orders held in escrow
//! - Rejected withdrawals leave no trace

use canteen_model::{BusinessCalendar, Order, OrderStatus, UserId};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use ledger_core::{
    store::Snapshot, Config, Error, Ledger, MemoryStore, OrderService, RocksStore,
    TransactionType, TransitionOutcome, TransitionRequest, Wallet,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Strategy for generating valid amounts (positive, two decimal places)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Strategy for generating order statuses
fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::Confirmed),
        Just(OrderStatus::Preparing),
        Just(OrderStatus::Ready),
        Just(OrderStatus::Completed),
        Just(OrderStatus::Cancelled),
    ]
}

/// Strategy for the intermediate escrow stages an order may pass through
fn escrow_path_strategy() -> impl Strategy<Value = Vec<OrderStatus>> {
    prop::sample::subsequence(
        vec![
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ],
        0..=3,
    )
}

/// Noon in UTC+05:30 on 2024-01-01
fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap()
}

fn memory_ledger() -> Ledger<MemoryStore> {
    Ledger::new(Arc::new(MemoryStore::new()), BusinessCalendar::ist()).unwrap()
}

fn seeded_ledger(total: Decimal, pending: Decimal) -> Ledger<MemoryStore> {
    let mut wallet = Wallet::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), noon());
    wallet.total_balance = total;
    wallet.pending_amount = pending;
    Ledger::new(
        Arc::new(MemoryStore::new().with_wallet(wallet)),
        BusinessCalendar::ist(),
    )
    .unwrap()
}

/// Walk an order through `path` with one transition per hop
fn walk(ledger: &Ledger<MemoryStore>, path: &[OrderStatus], amount: Decimal) {
    for hop in path.windows(2) {
        let request = TransitionRequest::new("P-1", hop[0], hop[1], amount);
        ledger.apply_transition_at(&request, noon()).unwrap();
    }
}

/// Signed sum of the wallet log
fn log_sum(ledger: &Ledger<MemoryStore>) -> Decimal {
    ledger
        .transactions(None)
        .unwrap()
        .iter()
        .map(|entry| match entry.kind {
            TransactionType::Credit => entry.amount,
            TransactionType::RefundDeduction | TransactionType::Withdrawal => -entry.amount,
        })
        .sum()
}

/// Value of the given orders whose current status holds money in escrow
fn escrow_sum(service: &OrderService<MemoryStore>, ids: &[Uuid]) -> Decimal {
    ids.iter()
        .map(|id| service.order(*id).unwrap())
        .filter(|order| order.status.is_in_escrow())
        .map(|order| order.total)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Settling through any escrow stages equals settling directly
    #[test]
    fn prop_escrow_path_independence(
        amount in amount_strategy(),
        stages in escrow_path_strategy(),
    ) {
        let direct = memory_ledger();
        walk(&direct, &[OrderStatus::Pending, OrderStatus::Completed], amount);

        let staged = memory_ledger();
        let mut path = vec![OrderStatus::Pending];
        path.extend(stages);
        path.push(OrderStatus::Completed);
        walk(&staged, &path, amount);

        let a = direct.store().load_wallet().unwrap().unwrap();
        let b = staged.store().load_wallet().unwrap().unwrap();
        prop_assert_eq!(a.total_balance, amount);
        prop_assert_eq!(a.total_balance, b.total_balance);
        prop_assert_eq!(a.pending_amount, b.pending_amount);
        prop_assert_eq!(a.today_collection, b.today_collection);
        prop_assert_eq!(b.pending_amount, Decimal::ZERO);

        // Exactly one credit on either path
        prop_assert_eq!(direct.transactions(None).unwrap().len(), 1);
        prop_assert_eq!(staged.transactions(None).unwrap().len(), 1);
    }

    /// Property: Cancelling an unpaid order touches nothing
    #[test]
    fn prop_pending_cancel_is_neutral(
        amount in amount_strategy(),
        total in amount_strategy(),
        pending in amount_strategy(),
    ) {
        let ledger = seeded_ledger(total, pending);
        let before = ledger.store().load_wallet().unwrap();

        let request = TransitionRequest::new("P-1", OrderStatus::Pending, OrderStatus::Cancelled, amount);
        let outcome = ledger.apply_transition_at(&request, noon()).unwrap();

        prop_assert!(matches!(outcome, TransitionOutcome::Neutral(_)));
        prop_assert_eq!(ledger.store().load_wallet().unwrap(), before);
        prop_assert!(ledger.transactions(None).unwrap().is_empty());
    }

    /// Property: A withdrawal above the balance never mutates state
    #[test]
    fn prop_insufficient_funds_never_mutates(
        balance in amount_strategy(),
        excess in amount_strategy(),
    ) {
        let ledger = seeded_ledger(balance, Decimal::ZERO);
        let before = ledger.store().load_wallet().unwrap();

        let result = ledger.withdraw_at(balance + excess, noon());

        prop_assert!(
            matches!(result, Err(Error::InsufficientFunds { .. })),
            "expected InsufficientFunds, got {:?}",
            result
        );
        prop_assert_eq!(ledger.store().load_wallet().unwrap(), before);
        prop_assert!(ledger.transactions(None).unwrap().is_empty());
        prop_assert!(ledger.withdrawals().unwrap().is_empty());
    }

    /// Property: Withdrawing at most the balance always succeeds
    #[test]
    fn prop_withdraw_within_balance(balance in amount_strategy(), share in 1u32..=100u32) {
        let ledger = seeded_ledger(balance, Decimal::ZERO);
        let amount = (balance * Decimal::from(share) / Decimal::from(100)).round_dp(2);
        prop_assume!(amount > Decimal::ZERO);

        ledger.withdraw_at(amount, noon()).unwrap();
        let wallet = ledger.store().load_wallet().unwrap().unwrap();
        prop_assert_eq!(wallet.total_balance, balance - amount);
    }

    /// Property: Arbitrary status sequences keep balances non-negative, the
    /// log in agreement with `total_balance`, and `pending_amount` equal to
    /// the value of orders currently in escrow
    #[test]
    fn prop_random_lifecycles_preserve_invariants(
        orders in prop::collection::vec(
            (amount_strategy(), prop::collection::vec(status_strategy(), 0..8)),
            1..6,
        ),
        withdraw_share in 0u32..=100u32,
    ) {
        let service = OrderService::new(Arc::new(memory_ledger()));
        let mut placed = Vec::new();

        for (i, (total, statuses)) in orders.iter().enumerate() {
            let order = service
                .place_order(Order::new(format!("R-{}", i), UserId::new("prop"), *total))
                .unwrap();
            placed.push(order.id);
            for status in statuses {
                // Rejections (illegal move, double cancel, reversal below zero)
                // must roll back cleanly
                let _ = service.update_status_at(order.id, *status, noon());

                if let Some(wallet) = service.ledger().store().load_wallet().unwrap() {
                    prop_assert!(wallet.check_invariants().is_ok());
                    prop_assert_eq!(wallet.total_balance, log_sum(service.ledger()));
                    prop_assert_eq!(wallet.pending_amount, escrow_sum(&service, &placed));
                }
            }
        }

        if let Some(wallet) = service.ledger().store().load_wallet().unwrap() {
            let amount = (wallet.total_balance * Decimal::from(withdraw_share) / Decimal::from(100))
                .round_dp(2);
            if amount > Decimal::ZERO {
                service.ledger().withdraw_at(amount, noon()).unwrap();
            }
            let wallet = service.ledger().store().load_wallet().unwrap().unwrap();
            prop_assert!(wallet.check_invariants().is_ok());
            prop_assert_eq!(wallet.total_balance, log_sum(service.ledger()));
            prop_assert_eq!(wallet.pending_amount, escrow_sum(&service, &placed));
        }
    }

    /// Property: Daily collection only counts the current day's settlements
    #[test]
    fn prop_rollover_resets_collection(
        first in amount_strategy(),
        second in amount_strategy(),
        days_later in 1i64..30,
    ) {
        let ledger = memory_ledger();
        let settle = |order: &str, amount, at| {
            let request = TransitionRequest::new(order, OrderStatus::Pending, OrderStatus::Completed, amount);
            ledger.apply_transition_at(&request, at).unwrap();
        };

        settle("D-1", first, noon());
        settle("D-2", second, noon() + Duration::days(days_later));

        let wallet = ledger.store().load_wallet().unwrap().unwrap();
        prop_assert_eq!(wallet.today_collection, second);
        prop_assert_eq!(wallet.total_balance, first + second);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_rocksdb_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let order_id = {
            let store = Arc::new(RocksStore::open(&config).unwrap());
            let ledger = Ledger::new(store, BusinessCalendar::ist()).unwrap();
            let service = OrderService::new(Arc::new(ledger));

            let order = service
                .place_order(Order::new("K-9", UserId::new("asha"), Decimal::from(320)))
                .unwrap();
            service.update_status_at(order.id, OrderStatus::Confirmed, noon()).unwrap();
            service.update_status_at(order.id, OrderStatus::Completed, noon()).unwrap();
            service.ledger().withdraw_at(Decimal::from(20), noon()).unwrap();
            order.id
        };

        let store = Arc::new(RocksStore::open(&config).unwrap());
        let ledger = Ledger::new(store, BusinessCalendar::ist()).unwrap();
        let service = OrderService::new(Arc::new(ledger));

        let wallet = service.ledger().wallet_at(noon()).unwrap().unwrap();
        assert_eq!(wallet.total_balance, Decimal::from(300));
        assert_eq!(wallet.pending_amount, Decimal::ZERO);
        assert_eq!(wallet.today_collection, Decimal::from(320));

        let kinds: Vec<_> = service
            .ledger()
            .transactions(None)
            .unwrap()
            .into_iter()
            .map(|entry| entry.kind)
            .collect();
        assert_eq!(kinds, vec![TransactionType::Withdrawal, TransactionType::Credit]);
        assert_eq!(service.order(order_id).unwrap().status, OrderStatus::Completed);

        let mut csv = Vec::new();
        service.ledger().export_transactions_csv(&mut csv, None).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 3);
    }
}
