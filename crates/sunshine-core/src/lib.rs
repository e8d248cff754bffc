pub mod app;
pub mod component;
pub mod config;
pub mod error;

pub use app::App;
pub use component::{Component, ComponentContext};
pub use config::{Config, LoggingConfig, SyncConfig, WeatherConfig};
pub use error::{ConfigError, SyncError};

use anyhow::Result;

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used as the filter.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Sunshine core initialized");
    Ok(())
}
