//! Report types for forecast engine
//!
//! Everything here is derived fresh per call and never persisted. Field
//! order is part of the serialized form; reports from identical inputs
//! serialize to identical bytes.

use canteen_model::ItemId;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Scheduled quantity for one item on one weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// Item ID
    pub item_id: ItemId,

    /// Display name (item ID when the item is not on the menu)
    pub item_name: String,

    /// Weekday
    pub weekday: Weekday,

    /// Weekday index, Monday = 0
    pub weekday_index: u8,

    /// Sum of quantities of all auto-orders firing that day
    pub quantity: i64,
}

/// Worst single-day load for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDemand {
    /// Item ID
    pub item_id: ItemId,

    /// Display name
    pub item_name: String,

    /// Maximum demand over the weekdays the item is scheduled on
    pub max_daily_demand: i64,
}

/// One item on one forecast day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDayItem {
    /// Item ID
    pub item_id: ItemId,

    /// Display name
    pub item_name: String,

    /// Demand scheduled on this day
    pub demand: i64,

    /// On-hand stock at the start of the horizon
    pub current_stock: i64,

    /// Running demand from day 0 through this day
    pub cumulative_demand: i64,

    /// `current_stock - cumulative_demand`
    pub remaining: i64,

    /// `remaining < 0`
    pub risk: bool,
}

/// One day of the horizon walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Days after the reference date
    pub offset: u32,

    /// Calendar date
    pub date: NaiveDate,

    /// Weekday of `date`
    pub weekday: Weekday,

    /// Items with demand this day, at-risk first, then by name
    pub items: Vec<ForecastDayItem>,
}

impl ForecastDay {
    /// Items flagged at risk on this day
    pub fn at_risk(&self) -> impl Iterator<Item = &ForecastDayItem> {
        self.items.iter().filter(|item| item.risk)
    }
}

/// Item that runs short somewhere in the horizon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    /// Item ID
    pub item_id: ItemId,

    /// Display name
    pub item_name: String,

    /// First day the item is flagged
    pub first_risk_date: NaiveDate,
}

/// Distinct items ever flagged at risk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Items, ordered by name
    pub items: Vec<RiskItem>,

    /// Headline "items at risk" count
    pub count: usize,
}

/// Kind of input data problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Frequency missing or not one of daily / weekdays / custom
    UnrecognizedFrequency,
    /// A custom day tag that names no weekday
    UnknownWeekdayTag,
    /// Auto-order for an item not on the menu
    UnknownItem,
    /// Auto-order with quantity zero
    ZeroQuantity,
}

impl AnomalyKind {
    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::UnrecognizedFrequency => "unrecognized_frequency",
            AnomalyKind::UnknownWeekdayTag => "unknown_weekday_tag",
            AnomalyKind::UnknownItem => "unknown_item",
            AnomalyKind::ZeroQuantity => "zero_quantity",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bad auto-order data that was skipped rather than failing the forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Offending auto-order
    pub auto_order_id: Uuid,

    /// What was wrong
    pub kind: AnomalyKind,

    /// Raw value involved
    pub detail: String,
}

/// Complete forecast output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Business date of day 0
    pub reference_date: NaiveDate,

    /// Scheduled demand per (item, weekday), by name then weekday
    pub per_item_per_day_demand: Vec<DemandRecord>,

    /// Worst single-day demand per item, by name
    pub daily_demand_summary: Vec<DailyDemand>,

    /// Horizon walk, one entry per day
    pub seven_day_forecast: Vec<ForecastDay>,

    /// Items ever at risk
    pub risk_summary: RiskSummary,

    /// Data problems encountered, in input order
    pub anomalies: Vec<Anomaly>,
}

impl ForecastReport {
    /// Headline count of items at risk
    pub fn items_at_risk(&self) -> usize {
        self.risk_summary.count
    }

    /// Horizon entry for an item on a given day offset
    pub fn item_on(&self, offset: u32, item_id: &ItemId) -> Option<&ForecastDayItem> {
        self.seven_day_forecast
            .iter()
            .find(|day| day.offset == offset)?
            .items
            .iter()
            .find(|item| &item.item_id == item_id)
    }
}
