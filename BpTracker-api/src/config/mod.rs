//! Server configuration read from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bp_tracker_domain::export::{CsvExporter, CsvRowOrder};
use tracing::info;

/// Name of the SQLite file inside the data directory
pub const DATABASE_FILE: &str = "bp_tracker.db";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to listen on (`PORT`)
    pub port: u16,
    /// Directory holding the database file (`DATA_DIR`)
    pub data_dir: PathBuf,
    /// Whose readings these are; used in export file names (`BP_OWNER_NAME`)
    pub owner_name: String,
    /// Row order of CSV exports (`BP_CSV_ORDER`)
    pub csv_order: CsvRowOrder,
    /// Deployment environment reported by the health check (`APP_ENV`)
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            owner_name: "my".to_string(),
            csv_order: CsvRowOrder::default(),
            environment: "development".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("Loaded configuration: port={}, data_dir={}, environment={}",
            config.port, config.data_dir.display(), config.environment);
        Ok(config)
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(port) => port.parse::<u16>().with_context(|| format!("PORT must be a number, got '{}'", port))?,
            None => defaults.port,
        };

        let csv_order = match get("BP_CSV_ORDER") {
            Some(order) => order.parse::<CsvRowOrder>().context("Invalid BP_CSV_ORDER")?,
            None => defaults.csv_order,
        };

        Ok(Self {
            port,
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            owner_name: get("BP_OWNER_NAME").unwrap_or(defaults.owner_name),
            csv_order,
            environment: get("APP_ENV").unwrap_or(defaults.environment),
        })
    }

    /// Location of the SQLite database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Exporter configured for this server
    pub fn exporter(&self) -> CsvExporter {
        CsvExporter::default().with_order(self.csv_order)
    }
}
