use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tickerscope::CompilerConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) compiler: CompilerConfig,

    #[serde(default)]
    pub(crate) watchlist: WatchlistConfig,
}

/// Watchlist storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct WatchlistConfig {
    #[serde(default = "default_db_path")]
    pub(crate) db_path: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_db_path() -> PathBuf {
    PathBuf::from("data/watchlist.db")
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub(crate) fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("TICKERSCOPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize().context("invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_api_key() {
        let config = AppConfig {
            compiler: CompilerConfig::with_api_key("secret-key"),
            watchlist: WatchlistConfig::default(),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("watchlist.db"));
    }
}
