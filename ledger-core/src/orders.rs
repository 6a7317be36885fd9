//! Order status orchestration
//!
//! Binds an order's status change, the merchant wallet transition and the
//! customer refund into a single unit of work. The ledger engine itself does
//! no deduplication; this is the layer that reads the current status, guards
//! against double cancellation, rejects moves with no wallet effect, and
//! hands the engine exactly one edge per change.

use crate::{
    ledger::{Ledger, TransitionOutcome},
    store::{Snapshot, Store},
    transition::Edge,
    types::{
        CustomerTransaction, CustomerTransactionType, CustomerWallet, TransitionRequest,
    },
    Error, Result,
};
use canteen_model::{Order, OrderStatus, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a status update
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    /// Order after the update
    pub order: Order,
    /// Status before the update
    pub previous: OrderStatus,
    /// Wallet outcome
    pub outcome: TransitionOutcome,
    /// Customer refund written, if the order was cancelled
    pub refund: Option<CustomerTransaction>,
}

/// Order orchestration over the ledger
pub struct OrderService<S: Store> {
    ledger: Arc<Ledger<S>>,
}

impl<S: Store> Clone for OrderService<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<S: Store> OrderService<S> {
    /// Create service
    pub fn new(ledger: Arc<Ledger<S>>) -> Self {
        Self { ledger }
    }

    /// Record a new order whose payment is already authorised
    pub fn place_order(&self, order: Order) -> Result<Order> {
        if order.total <= Decimal::ZERO {
            return Err(Error::InvalidAmount(order.total));
        }
        if order.status != OrderStatus::Pending {
            return Err(Error::Other(format!(
                "New order {} must start pending, got {}",
                order.order_id, order.status
            )));
        }

        let placed = self.ledger.store().atomically(|unit| {
            if unit.order(order.id)?.is_some() {
                return Err(Error::DuplicateOrder(order.order_id.clone()));
            }
            unit.put_order(order.clone());
            Ok(order)
        })?;

        tracing::info!(
            order_id = %placed.order_id,
            user_id = %placed.user_id,
            total = %placed.total,
            "Order placed"
        );
        Ok(placed)
    }

    /// Move an order to a new status
    pub fn update_status(&self, id: Uuid, new_status: OrderStatus) -> Result<StatusChange> {
        self.update_status_at(id, new_status, Utc::now())
    }

    /// Move an order to a new status as of `now`
    pub fn update_status_at(
        &self,
        id: Uuid,
        new_status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        let change = self.ledger.store().atomically(|unit| {
            let mut order = unit
                .order(id)?
                .ok_or_else(|| Error::OrderNotFound(id.to_string()))?;
            let previous = order.status;

            if previous == OrderStatus::Cancelled {
                return Err(Error::AlreadyCancelled(order.order_id.clone()));
            }
            if previous == new_status {
                return Ok(StatusChange {
                    order,
                    previous,
                    outcome: TransitionOutcome::Ignored,
                    refund: None,
                });
            }

            if Edge::classify(previous, new_status) == Edge::Unaccounted {
                return Err(Error::IllegalTransition {
                    from: previous,
                    to: new_status,
                });
            }

            order.status = new_status;
            order.updated_at = now;
            unit.put_order(order.clone());

            let request = TransitionRequest {
                order_id: Some(order.order_id.clone()),
                old_status: previous,
                new_status,
                amount: order.total,
            };
            let outcome = self.ledger.apply_in(unit, &request, now)?;

            let refund = if new_status == OrderStatus::Cancelled {
                let mut customer = unit
                    .customer(&order.user_id)?
                    .unwrap_or_else(|| CustomerWallet::new(order.user_id.clone(), now));
                customer.balance += order.total;
                customer.updated_at = now;
                unit.put_customer(customer);

                let refund = CustomerTransaction {
                    id: Uuid::now_v7(),
                    user_id: order.user_id.clone(),
                    amount: order.total,
                    kind: CustomerTransactionType::Refund,
                    order_id: Some(order.order_id.clone()),
                    description: format!("Refund for cancelled order {}", order.order_id),
                    created_at: now,
                };
                unit.append_customer_transaction(refund.clone());
                Some(refund)
            } else {
                None
            };

            Ok(StatusChange {
                order,
                previous,
                outcome,
                refund,
            })
        })?;

        self.ledger.record(&change.outcome);
        tracing::info!(
            order_id = %change.order.order_id,
            from = %change.previous,
            to = %change.order.status,
            refunded = change.refund.is_some(),
            "Order status updated"
        );

        Ok(change)
    }

    /// Cancel an order and refund its customer
    pub fn cancel_order(&self, id: Uuid) -> Result<StatusChange> {
        self.update_status(id, OrderStatus::Cancelled)
    }

    /// Get order by internal ID
    pub fn order(&self, id: Uuid) -> Result<Order> {
        self.ledger
            .store()
            .load_order(id)?
            .ok_or_else(|| Error::OrderNotFound(id.to_string()))
    }

    /// Customer wallet, if the customer ever received a refund
    pub fn customer_wallet(&self, user_id: &UserId) -> Result<Option<CustomerWallet>> {
        self.ledger.store().load_customer(user_id)
    }

    /// Customer's own log, most recent first
    pub fn customer_transactions(&self, user_id: &UserId) -> Result<Vec<CustomerTransaction>> {
        self.ledger.store().customer_transactions(user_id)
    }

    /// Underlying ledger
    pub fn ledger(&self) -> &Arc<Ledger<S>> {
        &self.ledger
    }
}

impl<S: Store> std::fmt::Debug for OrderService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("ledger", &self.ledger)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::types::TransactionType;
    use canteen_model::BusinessCalendar;
    use OrderStatus::*;

    fn service() -> OrderService<MemoryStore> {
        let ledger = Ledger::new(Arc::new(MemoryStore::new()), BusinessCalendar::ist()).unwrap();
        OrderService::new(Arc::new(ledger))
    }

    fn place(service: &OrderService<MemoryStore>, total: i64) -> Order {
        service
            .place_order(Order::new("A-17", UserId::new("ravi"), Decimal::from(total)))
            .unwrap()
    }

    fn wallet(service: &OrderService<MemoryStore>) -> crate::types::Wallet {
        service.ledger().store().load_wallet().unwrap().unwrap()
    }

    #[test]
    fn test_full_lifecycle_settles_once() {
        let service = service();
        let order = place(&service, 250);

        for status in [Confirmed, Preparing, Ready] {
            service.update_status(order.id, status).unwrap();
        }
        assert_eq!(wallet(&service).pending_amount, Decimal::from(250));

        let change = service.update_status(order.id, Completed).unwrap();
        assert!(matches!(
            change.outcome,
            TransitionOutcome::Applied { edge: Edge::Settle, .. }
        ));

        let w = wallet(&service);
        assert_eq!(w.pending_amount, Decimal::ZERO);
        assert_eq!(w.total_balance, Decimal::from(250));
        assert_eq!(service.order(order.id).unwrap().status, Completed);
    }

    #[test]
    fn test_cancel_refunds_customer() {
        let service = service();
        let order = place(&service, 90);
        service.update_status(order.id, Confirmed).unwrap();

        let change = service.cancel_order(order.id).unwrap();
        let refund = change.refund.unwrap();
        assert_eq!(refund.amount, Decimal::from(90));
        assert_eq!(refund.order_id.as_deref(), Some("A-17"));

        let customer = service.customer_wallet(&UserId::new("ravi")).unwrap().unwrap();
        assert_eq!(customer.balance, Decimal::from(90));
        assert_eq!(service.customer_transactions(&UserId::new("ravi")).unwrap().len(), 1);
        assert_eq!(wallet(&service).pending_amount, Decimal::ZERO);
    }

    #[test]
    fn test_double_cancel_rejected() {
        let service = service();
        let order = place(&service, 90);
        service.cancel_order(order.id).unwrap();

        assert!(matches!(
            service.cancel_order(order.id),
            Err(Error::AlreadyCancelled(_))
        ));
        let customer = service.customer_wallet(&UserId::new("ravi")).unwrap().unwrap();
        assert_eq!(customer.balance, Decimal::from(90));
    }

    #[test]
    fn test_cancel_after_completion_reverses() {
        let service = service();
        let order = place(&service, 60);
        service.update_status(order.id, Completed).unwrap();
        service.cancel_order(order.id).unwrap();

        assert_eq!(wallet(&service).total_balance, Decimal::ZERO);
        let kinds: Vec<_> = service
            .ledger()
            .transactions(None)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![TransactionType::RefundDeduction, TransactionType::Credit]);
    }

    #[test]
    fn test_failed_transition_leaves_order_unchanged() {
        let service = service();
        let order = place(&service, 60);
        service.update_status(order.id, Completed).unwrap();
        service.ledger().withdraw(Decimal::from(60)).unwrap();

        // Reversal would drive the balance negative
        assert!(matches!(
            service.cancel_order(order.id),
            Err(Error::InvariantViolation(_))
        ));
        assert_eq!(service.order(order.id).unwrap().status, Completed);
        assert!(service.customer_wallet(&UserId::new("ravi")).unwrap().is_none());
    }

    #[test]
    fn test_place_order_validation() {
        let service = service();
        let order = place(&service, 10);

        assert!(matches!(
            service.place_order(order),
            Err(Error::DuplicateOrder(_))
        ));
        assert!(matches!(
            service.place_order(Order::new("A-18", UserId::new("ravi"), Decimal::ZERO)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            service.update_status(Uuid::new_v4(), Ready),
            Err(Error::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_backward_move_to_pending_rejected() {
        let service = service();
        let order = place(&service, 100);
        service.update_status(order.id, Confirmed).unwrap();

        assert!(matches!(
            service.update_status(order.id, Pending),
            Err(Error::IllegalTransition { from: Confirmed, to: Pending })
        ));
        assert_eq!(service.order(order.id).unwrap().status, Confirmed);
        assert_eq!(wallet(&service).pending_amount, Decimal::from(100));

        // Still confirmed, so cancelling releases the escrow
        service.cancel_order(order.id).unwrap();
        let w = wallet(&service);
        assert_eq!(w.pending_amount, Decimal::ZERO);
        assert_eq!(w.total_balance, Decimal::ZERO);
    }

    #[test]
    fn test_completed_order_cannot_settle_twice() {
        let service = service();
        let other = service
            .place_order(Order::new("B-1", UserId::new("asha"), Decimal::from(100)))
            .unwrap();
        service.update_status(other.id, Confirmed).unwrap();

        let order = place(&service, 100);
        service.update_status(order.id, Completed).unwrap();
        assert!(matches!(
            service.update_status(order.id, Ready),
            Err(Error::IllegalTransition { from: Completed, to: Ready })
        ));
        assert_eq!(service.order(order.id).unwrap().status, Completed);

        let w = wallet(&service);
        assert_eq!(w.total_balance, Decimal::from(100));
        assert_eq!(w.pending_amount, Decimal::from(100));
        let credits = service
            .ledger()
            .transactions(None)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TransactionType::Credit)
            .count();
        assert_eq!(credits, 1);

        // The other order's escrow settles normally
        service.update_status(other.id, Completed).unwrap();
        let w = wallet(&service);
        assert_eq!(w.total_balance, Decimal::from(200));
        assert_eq!(w.pending_amount, Decimal::ZERO);
    }
}
