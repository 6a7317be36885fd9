//! Demand Forecast Engine
//!
//! Projects per-item stock shortages from recurring auto-orders over a
//! short horizon. Reads only; holds no locks and may run alongside the
//! ledger without coordination.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod forecast;
pub mod schedule;
pub mod service;
pub mod types;

pub use config::ForecastConfig;
pub use error::{Error, Result};
pub use forecast::ForecastEngine;
pub use schedule::{resolve, Resolved, WeekdaySet};
pub use service::{ForecastRequest, ForecastService, ForecastSource, StaticSource};
pub use types::*;
