//! Orders and the status lifecycle the ledger reacts to

use crate::ModelError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Customer identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create new user ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed and paid, not yet accepted by the kitchen
    Pending,
    /// Accepted by the kitchen
    Confirmed,
    /// Being cooked
    Preparing,
    /// Ready for pickup
    Ready,
    /// Handed over (terminal)
    Completed,
    /// Cancelled (terminal)
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Accepted by the kitchen but not yet handed over; funds sit in escrow
    pub fn is_in_escrow(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed | OrderStatus::Preparing | OrderStatus::Ready
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// Customer order
///
/// Owned by the fulfilment side. The ledger only reads `total` and
/// reacts to changes of `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Internal ID
    pub id: Uuid,

    /// Display ID shown on receipts and in the wallet log
    pub order_id: String,

    /// Paying customer
    pub user_id: UserId,

    /// Current status
    pub status: OrderStatus,

    /// Amount owed
    pub total: Decimal,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order
    pub fn new(order_id: impl Into<String>, user_id: UserId, total: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            order_id: order_id.into(),
            user_id,
            status: OrderStatus::Pending,
            total,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!(" Ready ".parse::<OrderStatus>(), Ok(OrderStatus::Ready));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_escrow_statuses() {
        let escrow: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::is_in_escrow)
            .collect();
        assert_eq!(
            escrow,
            vec![OrderStatus::Confirmed, OrderStatus::Preparing, OrderStatus::Ready]
        );
    }
}
