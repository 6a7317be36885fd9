//! Configuration for the ledger

use canteen_model::{BusinessCalendar, IST_OFFSET_MINUTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Key of the merchant wallet
    pub merchant_id: String,

    /// Business day boundary, minutes east of UTC
    pub utc_offset_minutes: i32,

    /// Actor mailbox capacity
    pub mailbox_capacity: usize,

    /// RocksDB configuration
    pub rocksdb: RocksDBConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ledger"),
            service_name: "ledger-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            merchant_id: "canteen".to_string(),
            utc_offset_minutes: IST_OFFSET_MINUTES,
            mailbox_capacity: 1000,
            rocksdb: RocksDBConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDBConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,

    /// Enable statistics
    pub enable_statistics: bool,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 16,
            max_write_buffer_number: 2,
            max_background_jobs: 2,
            enable_statistics: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(merchant_id) = std::env::var("LEDGER_MERCHANT_ID") {
            config.merchant_id = merchant_id;
        }

        if let Ok(offset) = std::env::var("LEDGER_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = offset.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_UTC_OFFSET_MINUTES: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Calendar for the configured offset
    pub fn calendar(&self) -> crate::Result<BusinessCalendar> {
        Ok(BusinessCalendar::new(self.utc_offset_minutes)?)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.merchant_id.is_empty() {
            return Err(crate::Error::Config("merchant_id must not be empty".to_string()));
        }
        if self.mailbox_capacity == 0 {
            return Err(crate::Error::Config("mailbox_capacity must be positive".to_string()));
        }
        self.calendar().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "ledger-core");
        assert_eq!(config.merchant_id, "canteen");
        assert_eq!(config.calendar().unwrap().offset_minutes(), 330);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        let mut config = Config::default();
        config.merchant_id = "north-block".to_string();
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.merchant_id, "north-block");
    }

    #[test]
    fn test_rejects_bad_offset() {
        let mut config = Config::default();
        config.utc_offset_minutes = 100_000;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }
}
