//! Actor front for async callers
//!
//! Store calls block (RocksDB I/O), so async request handlers talk to the
//! ledger through a single Tokio task:
//! - One task owns the ledger and processes requests in arrival order
//! - Async message passing with backpressure (bounded mailbox)
//! - Atomicity still comes from the store's unit of work
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │          Order / payout / admin request handlers      │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │        OrderService ─► Ledger ─► Store::atomically    │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::ledger::TransitionOutcome;
use crate::orders::{OrderService, StatusChange};
use crate::store::Store;
use crate::types::{TransitionRequest, WalletTransaction, WalletView, WithdrawalReceipt};
use crate::{Error, Result};
use canteen_model::{Order, OrderStatus};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Apply a raw status transition
    ApplyTransition {
        /// Status pair and amount
        request: TransitionRequest,
        /// Reply channel
        response: oneshot::Sender<Result<TransitionOutcome>>,
    },

    /// Record a new order
    PlaceOrder {
        /// Order to record, in `pending`
        order: Order,
        /// Reply channel
        response: oneshot::Sender<Result<Order>>,
    },

    /// Move an order to a new status
    UpdateOrderStatus {
        /// Internal order ID
        id: Uuid,
        /// Target status
        status: OrderStatus,
        /// Reply channel
        response: oneshot::Sender<Result<StatusChange>>,
    },

    /// Withdraw settled funds
    Withdraw {
        /// Amount to pay out
        amount: Decimal,
        /// Reply channel
        response: oneshot::Sender<Result<WithdrawalReceipt>>,
    },

    /// Get wallet read model
    GetWallet {
        /// Reply channel
        response: oneshot::Sender<Result<Option<WalletView>>>,
    },

    /// Get wallet log, most recent first
    GetTransactions {
        /// Maximum entries; all when `None`
        limit: Option<usize>,
        /// Reply channel
        response: oneshot::Sender<Result<Vec<WalletTransaction>>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct LedgerActor<S: Store> {
    /// Order orchestration (owns the ledger)
    orders: OrderService<S>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl<S: Store> LedgerActor<S> {
    /// Create new actor
    pub fn new(orders: OrderService<S>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { orders, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if let LedgerMessage::Shutdown = msg {
                tracing::info!("Ledger actor shutting down");
                break;
            }
            self.handle_message(msg);
        }
    }

    /// Handle a single message
    fn handle_message(&self, msg: LedgerMessage) {
        let delivered = match msg {
            LedgerMessage::ApplyTransition { request, response } => {
                response.send(self.orders.ledger().apply_transition(&request)).is_ok()
            }

            LedgerMessage::PlaceOrder { order, response } => {
                response.send(self.orders.place_order(order)).is_ok()
            }

            LedgerMessage::UpdateOrderStatus {
                id,
                status,
                response,
            } => response.send(self.orders.update_status(id, status)).is_ok(),

            LedgerMessage::Withdraw { amount, response } => {
                response.send(self.orders.ledger().withdraw(amount)).is_ok()
            }

            LedgerMessage::GetWallet { response } => {
                response.send(self.orders.ledger().wallet()).is_ok()
            }

            LedgerMessage::GetTransactions { limit, response } => {
                response.send(self.orders.ledger().transactions(limit)).is_ok()
            }

            LedgerMessage::Shutdown => true,
        };

        if !delivered {
            tracing::error!("Ledger response dropped: caller went away");
        }
    }
}

impl<S: Store> std::fmt::Debug for LedgerActor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerActor")
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Apply a raw status transition
    pub async fn apply_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        self.request(|response| LedgerMessage::ApplyTransition { request, response })
            .await
    }

    /// Record a new order
    pub async fn place_order(&self, order: Order) -> Result<Order> {
        self.request(|response| LedgerMessage::PlaceOrder { order, response })
            .await
    }

    /// Move an order to a new status
    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<StatusChange> {
        self.request(|response| LedgerMessage::UpdateOrderStatus {
            id,
            status,
            response,
        })
        .await
    }

    /// Withdraw settled funds
    pub async fn withdraw(&self, amount: Decimal) -> Result<WithdrawalReceipt> {
        self.request(|response| LedgerMessage::Withdraw { amount, response })
            .await
    }

    /// Get wallet read model
    pub async fn wallet(&self) -> Result<Option<WalletView>> {
        self.request(|response| LedgerMessage::GetWallet { response })
            .await
    }

    /// Get wallet log, most recent first
    pub async fn transactions(&self, limit: Option<usize>) -> Result<Vec<WalletTransaction>> {
        self.request(|response| LedgerMessage::GetTransactions { limit, response })
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor<S: Store>(orders: OrderService<S>, capacity: usize) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(orders, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
