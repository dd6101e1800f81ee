use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::FlightError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Seconds.
    pub timeout: u64,
    #[serde(default)]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Seconds the confirmation stays up before moving on to trips.
    pub confirmation_delay: u64,
}

impl BookingConfig {
    pub fn redirect_after(&self) -> Duration {
        Duration::from_secs(self.confirmation_delay)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: 30,
                proxy: None,
            },
            storage: StorageConfig {
                dir: PathBuf::from(".flyhigh"),
            },
            booking: BookingConfig {
                confirmation_delay: 3,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `flyhigh.toml` (or `path`, which must exist), then
    /// `FLYHIGH_*` environment variables with `__` between nested keys.
    pub fn load(path: Option<&Path>) -> Result<Self, FlightError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.timeout", defaults.api.timeout as i64)?
            .set_default("storage.dir", defaults.storage.dir.to_string_lossy().into_owned())?
            .set_default("booking.confirmation_delay", defaults.booking.confirmation_delay as i64)?;

        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("flyhigh").required(false)),
        };

        let cfg = builder
            .add_source(
                config::Environment::with_prefix("FLYHIGH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}
