//! Menu items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Menu item identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create new item ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Menu item with its on-hand stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item ID
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Decimal,

    /// Current on-hand quantity
    #[serde(default)]
    pub stock: i64,

    /// Listed for sale
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl MenuItem {
    /// Create an available menu item
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, stock: i64) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            price,
            stock,
            available: true,
        }
    }
}
