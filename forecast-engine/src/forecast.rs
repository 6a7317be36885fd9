//! Demand forecast
//!
//! Pure computation over a point-in-time read of auto-orders and stock:
//! aggregate scheduled demand per (item, weekday), then walk the horizon
//! from the reference date carrying a running total per item. The running
//! totals live only for one call.

use crate::config::ForecastConfig;
use crate::schedule::{self, WEEK};
use crate::types::{
    Anomaly, AnomalyKind, DailyDemand, DemandRecord, ForecastDay, ForecastDayItem,
    ForecastReport, RiskItem, RiskSummary,
};
use crate::{Error, Result};
use canteen_model::{date_weekday_index, weekday_index, AutoOrder, BusinessCalendar, ItemId, MenuItem};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Demand per weekday index for one item
type WeekRow = [i64; 7];

/// Forecast engine
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    calendar: BusinessCalendar,
}

impl ForecastEngine {
    /// Create engine
    pub fn new(config: ForecastConfig) -> Result<Self> {
        let calendar = config.calendar()?;
        Ok(Self { config, calendar })
    }

    /// Configuration in use
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast starting at the business date of `reference`
    pub fn compute_forecast(
        &self,
        auto_orders: &[AutoOrder],
        menu_items: &[MenuItem],
        reference: DateTime<Utc>,
    ) -> Result<ForecastReport> {
        let start = self.calendar.date_of(reference);
        self.forecast_from(auto_orders, menu_items, start)
    }

    /// Forecast starting at a given business date
    pub fn forecast_from(
        &self,
        auto_orders: &[AutoOrder],
        menu_items: &[MenuItem],
        start: NaiveDate,
    ) -> Result<ForecastReport> {
        let menu = index_menu(menu_items);
        let (demand, anomalies) = aggregate(auto_orders, &menu);

        let per_item_per_day_demand = demand_records(&demand, &menu);
        let daily_demand_summary = daily_summary(&demand, &menu);
        let seven_day_forecast = self.walk(&demand, &menu, start)?;
        let risk_summary = risk_summary(&seven_day_forecast);

        tracing::debug!(
            reference_date = %start,
            items = demand.len(),
            at_risk = risk_summary.count,
            anomalies = anomalies.len(),
            "Forecast computed"
        );

        Ok(ForecastReport {
            reference_date: start,
            per_item_per_day_demand,
            daily_demand_summary,
            seven_day_forecast,
            risk_summary,
            anomalies,
        })
    }

    /// Walk the horizon applying cumulative demand against stock
    fn walk(
        &self,
        demand: &BTreeMap<&ItemId, WeekRow>,
        menu: &BTreeMap<&ItemId, &MenuItem>,
        start: NaiveDate,
    ) -> Result<Vec<ForecastDay>> {
        let mut cumulative: BTreeMap<&ItemId, i64> = BTreeMap::new();
        let mut days = Vec::with_capacity(self.config.horizon_days as usize);

        for offset in 0..self.config.horizon_days {
            let date = start
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| {
                    Error::InvalidReference(format!("{} + {} days is out of range", start, offset))
                })?;
            let index = usize::from(date_weekday_index(date));

            let mut items = Vec::new();
            for (&item_id, row) in demand {
                let today = row[index];
                if today == 0 {
                    continue;
                }
                // Demand for items off the menu has no stock to draw from
                let Some(item) = menu.get(item_id) else {
                    continue;
                };

                let running = cumulative.entry(item_id).or_insert(0);
                *running += today;
                let remaining = item.stock - *running;

                items.push(ForecastDayItem {
                    item_id: item_id.clone(),
                    item_name: item.name.clone(),
                    demand: today,
                    current_stock: item.stock,
                    cumulative_demand: *running,
                    remaining,
                    risk: remaining < 0,
                });
            }

            items.sort_by(|a, b| {
                b.risk
                    .cmp(&a.risk)
                    .then_with(|| a.item_name.cmp(&b.item_name))
                    .then_with(|| a.item_id.cmp(&b.item_id))
            });

            days.push(ForecastDay {
                offset,
                date,
                weekday: date.weekday(),
                items,
            });
        }

        Ok(days)
    }
}

/// Menu by item ID; the first listing of a duplicated ID wins
fn index_menu(menu_items: &[MenuItem]) -> BTreeMap<&ItemId, &MenuItem> {
    let mut menu = BTreeMap::new();
    for item in menu_items {
        if menu.contains_key(&item.id) {
            tracing::warn!(item_id = %item.id, "Duplicate menu item ignored");
            continue;
        }
        menu.insert(&item.id, item);
    }
    menu
}

/// Sum quantities per (item, weekday) over all active auto-orders
fn aggregate<'a>(
    auto_orders: &'a [AutoOrder],
    menu: &BTreeMap<&ItemId, &MenuItem>,
) -> (BTreeMap<&'a ItemId, WeekRow>, Vec<Anomaly>) {
    let mut demand: BTreeMap<&ItemId, WeekRow> = BTreeMap::new();
    let mut anomalies = Vec::new();

    for order in auto_orders {
        if !order.is_active() {
            tracing::debug!(auto_order_id = %order.id, "Skipping inactive auto-order");
            continue;
        }
        if order.quantity == 0 {
            tracing::warn!(auto_order_id = %order.id, "Skipping zero-quantity auto-order");
            anomalies.push(Anomaly {
                auto_order_id: order.id,
                kind: AnomalyKind::ZeroQuantity,
                detail: order.item_id.to_string(),
            });
            continue;
        }

        let resolved = schedule::resolve(order);
        anomalies.extend(resolved.anomalies);

        if !menu.contains_key(&order.item_id) {
            tracing::warn!(
                auto_order_id = %order.id,
                item_id = %order.item_id,
                "Auto-order references an item not on the menu"
            );
            anomalies.push(Anomaly {
                auto_order_id: order.id,
                kind: AnomalyKind::UnknownItem,
                detail: order.item_id.to_string(),
            });
        }

        if resolved.days.is_empty() {
            continue;
        }
        let row = demand.entry(&order.item_id).or_insert([0; 7]);
        for day in resolved.days.iter() {
            row[usize::from(weekday_index(day))] += i64::from(order.quantity);
        }
    }

    (demand, anomalies)
}

fn display_name(menu: &BTreeMap<&ItemId, &MenuItem>, item_id: &ItemId) -> String {
    menu.get(item_id)
        .map(|item| item.name.clone())
        .unwrap_or_else(|| item_id.to_string())
}

/// One record per (item, weekday) encountered, by name then weekday
fn demand_records(
    demand: &BTreeMap<&ItemId, WeekRow>,
    menu: &BTreeMap<&ItemId, &MenuItem>,
) -> Vec<DemandRecord> {
    let mut records = Vec::new();
    for (&item_id, row) in demand {
        let item_name = display_name(menu, item_id);
        for (index, &quantity) in row.iter().enumerate() {
            if quantity == 0 {
                continue;
            }
            records.push(DemandRecord {
                item_id: item_id.clone(),
                item_name: item_name.clone(),
                weekday: WEEK[index],
                weekday_index: index as u8,
                quantity,
            });
        }
    }

    records.sort_by(|a, b| {
        a.item_name
            .cmp(&b.item_name)
            .then_with(|| a.weekday_index.cmp(&b.weekday_index))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    records
}

/// Worst single-day demand per item, by name
fn daily_summary(
    demand: &BTreeMap<&ItemId, WeekRow>,
    menu: &BTreeMap<&ItemId, &MenuItem>,
) -> Vec<DailyDemand> {
    let mut summary: Vec<DailyDemand> = demand
        .iter()
        .map(|(&item_id, row)| DailyDemand {
            item_id: item_id.clone(),
            item_name: display_name(menu, item_id),
            max_daily_demand: row.iter().copied().max().unwrap_or(0),
        })
        .collect();

    summary.sort_by(|a, b| {
        a.item_name
            .cmp(&b.item_name)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    summary
}

/// Distinct items ever at risk, with the first day they run short
fn risk_summary(days: &[ForecastDay]) -> RiskSummary {
    let mut first_seen: BTreeMap<&ItemId, RiskItem> = BTreeMap::new();
    for day in days {
        for item in day.at_risk() {
            first_seen.entry(&item.item_id).or_insert_with(|| RiskItem {
                item_id: item.item_id.clone(),
                item_name: item.item_name.clone(),
                first_risk_date: day.date,
            });
        }
    }

    let mut items: Vec<RiskItem> = first_seen.into_values().collect();
    items.sort_by(|a, b| {
        a.item_name
            .cmp(&b.item_name)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    RiskSummary {
        count: items.len(),
        items,
    }
}
