//! Canteen Model
//!
//! Value objects shared by the wallet ledger and the demand forecast:
//! orders and their status lifecycle, menu items, recurring auto-orders
//! and the business calendar that decides what "today" means.
//!
//! # Order lifecycle
//!
//! ```text
//! pending ─► confirmed ─► preparing ─► ready ─► completed
//!    │           │            │          │          │
//!    └───────────┴────────────┴──────────┴──────────┴──► cancelled
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod auto_order;
pub mod calendar;
pub mod error;
pub mod menu;
pub mod order;

// Re-exports
pub use auto_order::{parse_weekday_tag, AutoOrder, AutoOrderStatus, Frequency};
pub use calendar::{date_weekday_index, weekday_index, BusinessCalendar, IST_OFFSET_MINUTES};
pub use error::ModelError;
pub use menu::{ItemId, MenuItem};
pub use order::{Order, OrderStatus, UserId};
