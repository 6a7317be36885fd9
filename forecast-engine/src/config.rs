//! Forecast configuration

use crate::{Error, Result};
use canteen_model::{BusinessCalendar, IST_OFFSET_MINUTES};
use serde::{Deserialize, Serialize};

/// Forecast configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Days walked from the reference date, inclusive of day 0
    pub horizon_days: u32,

    /// Business day boundary, minutes east of UTC
    pub utc_offset_minutes: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            utc_offset_minutes: IST_OFFSET_MINUTES,
        }
    }
}

impl ForecastConfig {
    /// Validate and build the calendar for this configuration
    pub fn calendar(&self) -> Result<BusinessCalendar> {
        if self.horizon_days == 0 || self.horizon_days > 366 {
            return Err(Error::InvalidConfig(format!(
                "horizon_days must be within 1..=366, got {}",
                self.horizon_days
            )));
        }
        Ok(BusinessCalendar::new(self.utc_offset_minutes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon_days, 7);
        assert_eq!(config.calendar().unwrap(), BusinessCalendar::ist());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ForecastConfig = serde_json::from_str(r#"{"horizon_days": 3}"#).unwrap();
        assert_eq!(config.horizon_days, 3);
        assert_eq!(config.utc_offset_minutes, 330);
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let config = ForecastConfig {
            horizon_days: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(config.calendar(), Err(Error::InvalidConfig(_))));
    }
}
