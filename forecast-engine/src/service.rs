//! Forecast service
//!
//! Fetches auto-orders and stock through a [`ForecastSource`] and runs the
//! engine over them. Any fetch failure aborts the request with a single
//! [`Error::DataSource`]; no partial report is ever returned.

use crate::forecast::ForecastEngine;
use crate::types::ForecastReport;
use crate::{Error, Result};
use canteen_model::{AutoOrder, MenuItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Read access to forecast inputs
pub trait ForecastSource {
    /// Source error
    type Error: std::error::Error + Send + Sync + 'static;

    /// Auto-orders currently active
    fn active_auto_orders(&self) -> std::result::Result<Vec<AutoOrder>, Self::Error>;

    /// Menu with current stock
    fn menu_items(&self) -> std::result::Result<Vec<MenuItem>, Self::Error>;
}

/// Forecast request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Reference instant; defaults to now
    #[serde(default)]
    pub reference: Option<DateTime<Utc>>,
}

impl ForecastRequest {
    /// Request anchored at a fixed instant
    pub fn at(reference: DateTime<Utc>) -> Self {
        Self {
            reference: Some(reference),
        }
    }
}

/// Source over already-materialized data
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    /// Auto-orders; inactive ones are filtered on read
    pub auto_orders: Vec<AutoOrder>,
    /// Menu items
    pub menu_items: Vec<MenuItem>,
}

impl ForecastSource for StaticSource {
    type Error = Infallible;

    fn active_auto_orders(&self) -> std::result::Result<Vec<AutoOrder>, Self::Error> {
        Ok(self
            .auto_orders
            .iter()
            .filter(|order| order.is_active())
            .cloned()
            .collect())
    }

    fn menu_items(&self) -> std::result::Result<Vec<MenuItem>, Self::Error> {
        Ok(self.menu_items.clone())
    }
}

/// Forecast service
#[derive(Debug)]
pub struct ForecastService<S> {
    source: S,
    engine: ForecastEngine,
}

impl<S: ForecastSource> ForecastService<S> {
    /// Create service
    pub fn new(source: S, engine: ForecastEngine) -> Self {
        Self { source, engine }
    }

    /// Produce a forecast report
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastReport> {
        let reference = request.reference.unwrap_or_else(Utc::now);

        let auto_orders = self
            .source
            .active_auto_orders()
            .map_err(|e| Error::DataSource(Box::new(e)))?;
        let menu_items = self
            .source
            .menu_items()
            .map_err(|e| Error::DataSource(Box::new(e)))?;

        let report = self
            .engine
            .compute_forecast(&auto_orders, &menu_items, reference)?;

        tracing::info!(
            reference_date = %report.reference_date,
            auto_orders = auto_orders.len(),
            menu_items = menu_items.len(),
            at_risk = report.items_at_risk(),
            anomalies = report.anomalies.len(),
            "Forecast generated"
        );

        Ok(report)
    }

    /// Engine in use
    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Underlying source
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForecastConfig;
    use canteen_model::{AutoOrderStatus, Frequency, ItemId, UserId};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::fmt;

    #[derive(Debug)]
    struct Offline;

    impl fmt::Display for Offline {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("auto-order store offline")
        }
    }

    impl std::error::Error for Offline {}

    struct FailingMenu(StaticSource);

    impl ForecastSource for FailingMenu {
        type Error = Offline;

        fn active_auto_orders(&self) -> std::result::Result<Vec<AutoOrder>, Offline> {
            Ok(self.0.auto_orders.clone())
        }

        fn menu_items(&self) -> std::result::Result<Vec<MenuItem>, Offline> {
            Err(Offline)
        }
    }

    fn source() -> StaticSource {
        let mut paused = AutoOrder::new(
            UserId::new("u2"),
            ItemId::new("poha"),
            50,
            Frequency::Daily,
            Vec::new(),
        );
        paused.status = AutoOrderStatus::Inactive;

        StaticSource {
            auto_orders: vec![
                AutoOrder::new(
                    UserId::new("u1"),
                    ItemId::new("poha"),
                    3,
                    Frequency::Daily,
                    Vec::new(),
                ),
                paused,
            ],
            menu_items: vec![MenuItem::new("poha", "Poha", Decimal::from(30), 10)],
        }
    }

    fn engine() -> ForecastEngine {
        ForecastEngine::new(ForecastConfig::default()).unwrap()
    }

    #[test]
    fn test_forecast_filters_inactive() {
        let service = ForecastService::new(source(), engine());
        let reference = Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 0).unwrap();
        let report = service.forecast(&ForecastRequest::at(reference)).unwrap();

        assert_eq!(report.daily_demand_summary[0].max_daily_demand, 3);
        // 10 - 3 * 4 < 0 on day 3
        assert_eq!(
            report.risk_summary.items[0].first_risk_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_source_failure_is_aggregate_error() {
        let service = ForecastService::new(FailingMenu(source()), engine());
        let err = service.forecast(&ForecastRequest::default()).unwrap_err();

        assert!(matches!(err, Error::DataSource(_)));
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_request_defaults_to_now() {
        let service = ForecastService::new(StaticSource::default(), engine());
        let request: ForecastRequest = serde_json::from_str("{}").unwrap();
        assert!(request.reference.is_none());

        let report = service.forecast(&request).unwrap();
        assert_eq!(report.seven_day_forecast.len(), 7);
        assert!(report.anomalies.is_empty());
    }
}
