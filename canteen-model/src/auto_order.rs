//! Recurring order templates
//!
//! Auto-orders come from customer-edited data, so the schedule fields are
//! kept close to their raw form: an unrecognised `frequency` or a garbled
//! weekday tag must survive deserialization and be judged by the consumer.

use crate::{ItemId, UserId};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How often an auto-order fires
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    /// Every day of the week
    Daily,
    /// Monday to Friday
    Weekdays,
    /// Exactly the days listed in `custom_days`
    Custom,
    /// Anything else, including a missing value
    #[default]
    Unrecognized,
}

impl Frequency {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekdays => "weekdays",
            Frequency::Custom => "custom",
            Frequency::Unrecognized => "",
        }
    }
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekdays" => Frequency::Weekdays,
            "custom" => Frequency::Custom,
            _ => Frequency::Unrecognized,
        }
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auto-order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoOrderStatus {
    /// Materialises into real orders
    #[default]
    Active,
    /// Paused by the customer
    Inactive,
}

/// Recurring order template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoOrder {
    /// Auto-order ID
    pub id: Uuid,

    /// Owner
    pub user_id: UserId,

    /// Ordered item
    pub item_id: ItemId,

    /// Units per firing
    pub quantity: u32,

    /// Schedule kind
    #[serde(default)]
    pub frequency: Frequency,

    /// Weekday tags ("mon", "Tuesday", ...), only read for `Frequency::Custom`
    #[serde(default)]
    pub custom_days: Vec<String>,

    /// Active or paused
    #[serde(default)]
    pub status: AutoOrderStatus,
}

impl AutoOrder {
    /// Create an active auto-order
    pub fn new(
        user_id: UserId,
        item_id: ItemId,
        quantity: u32,
        frequency: Frequency,
        custom_days: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            item_id,
            quantity,
            frequency,
            custom_days,
            status: AutoOrderStatus::Active,
        }
    }

    /// Check if the template is active
    pub fn is_active(&self) -> bool {
        self.status == AutoOrderStatus::Active
    }
}

/// Parse a weekday tag, accepting short and long English names in any case
pub fn parse_weekday_tag(tag: &str) -> Option<Weekday> {
    tag.trim().parse::<Weekday>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_from_string() {
        assert_eq!(Frequency::from("Daily".to_string()), Frequency::Daily);
        assert_eq!(Frequency::from("weekdays".to_string()), Frequency::Weekdays);
        assert_eq!(Frequency::from("fortnightly".to_string()), Frequency::Unrecognized);
    }

    #[test]
    fn test_missing_frequency_is_unrecognized() {
        let json = r#"{
            "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "user_id": "u1",
            "item_id": "idli",
            "quantity": 2
        }"#;
        let order: AutoOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.frequency, Frequency::Unrecognized);
        assert!(order.custom_days.is_empty());
        assert!(order.is_active());
    }

    #[test]
    fn test_parse_weekday_tag() {
        assert_eq!(parse_weekday_tag("mon"), Some(Weekday::Mon));
        assert_eq!(parse_weekday_tag("Friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday_tag("someday"), None);
    }
}
