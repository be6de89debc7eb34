#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tickerscope/tickerscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Per-ticker market data aggregation.
//!
//! This crate re-exports the core types and the Alpha Vantage client, and
//! provides a [`DatasetCompiler`] that assembles everything known about a
//! symbol into one [`TickerDataset`].
//!
//! # Features
//!
//! - `sqlite` - SQLite-backed watchlist (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use tickerscope::{CompilerConfig, DatasetCompiler, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> tickerscope::Result<()> {
//!     let compiler = DatasetCompiler::from_config(CompilerConfig::with_api_key("demo"))?;
//!     let compiled = compiler.compile(&Symbol::new("IBM")).await;
//!
//!     for warning in &compiled.warnings {
//!         println!("{}: {}", warning.resource, warning.message);
//!     }
//!     println!("{:?}", compiled.summary());
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use ticker_core::*;

// Analytics
pub use ticker_analytics::{
    CalculatedMetrics, InsiderSummary, NormalizedOverview, StatementHighlights, SupplementaryData,
    add_technical_indicators, calculate_metrics, format_with_suffix, normalize_overview,
};

// Alpha Vantage
pub use ticker_alphavantage::{
    AlphaVantageClient, ClientOptions, ExternalIndicator, FixtureTransport, HttpTransport,
    SlidingWindowLimiter,
};

// Watchlists
#[cfg(feature = "sqlite")]
pub use ticker_watchlist::SqliteWatchlist;
pub use ticker_watchlist::InMemoryWatchlist;

mod compiler;
mod config;
mod dataset;

pub use compiler::{DatasetCompiler, NO_ANALYZABLE_DATA};
pub use config::CompilerConfig;
pub use dataset::{CompiledDataset, DatasetSummary, FetchWarning, Resource, TickerDataset};
