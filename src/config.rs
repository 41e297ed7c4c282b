//! Layered configuration for tablebook
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults (the reference restaurant)
//! 2. Optional TOML file (`--config` or `TABLEBOOK_CONFIG`)
//! 3. Environment variables `TABLEBOOK__<SECTION>__<KEY>`

use crate::catalog::Catalog;
use crate::error::{Result, TablebookError};
use crate::types::{Table, TimeSlot};
use crate::workflow::{BookingPolicy, DEFAULT_MAX_PARTY_SIZE};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
const ENV_PREFIX: &str = "TABLEBOOK";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub booking: BookingSettings,
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

/// Tables and schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// First slot (HH:MM)
    pub opening: String,
    /// Last slot (HH:MM, inclusive)
    pub closing: String,
    pub slot_interval_minutes: u32,
    /// Explicit slot list; overrides opening/closing/interval when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<Vec<String>>,
    pub tables: Vec<Table>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            opening: "11:00".to_string(),
            closing: "21:00".to_string(),
            slot_interval_minutes: 60,
            time_slots: None,
            tables: Catalog::reference().tables().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    pub max_party_size: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            max_party_size: DEFAULT_MAX_PARTY_SIZE,
        }
    }
}

/// HTTP API server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub addr: String,
    /// Event channel capacity
    pub event_capacity: usize,
    pub heartbeat_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            event_capacity: 1000,
            heartbeat_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.booking.max_party_size == 0 {
            return Err(TablebookError::Config(config::ConfigError::Message(
                "booking.max_party_size must be at least 1".to_string(),
            )));
        }
        if self.api.event_capacity == 0 {
            return Err(TablebookError::Config(config::ConfigError::Message(
                "api.event_capacity must be at least 1".to_string(),
            )));
        }
        self.api_addr()?;
        self.catalog()?;
        Ok(())
    }

    /// Build the validated catalog
    pub fn catalog(&self) -> Result<Catalog> {
        let slots = match &self.catalog.time_slots {
            Some(explicit) => explicit.iter().map(|s| TimeSlot::new(s.trim())).collect(),
            None => Catalog::generate_slots(
                &self.catalog.opening,
                &self.catalog.closing,
                self.catalog.slot_interval_minutes,
            )?,
        };

        Catalog::new(self.catalog.tables.clone(), slots)
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            max_party_size: self.booking.max_party_size,
        }
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        self.api.addr.parse().map_err(|e| {
            TablebookError::Config(config::ConfigError::Message(format!(
                "invalid api.addr '{}': {}",
                self.api.addr, e
            )))
        })
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TablebookError::Other(e.to_string()))
    }
}
