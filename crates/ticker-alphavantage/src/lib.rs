#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ticker_alphavantage::AlphaVantageClient;
//! use ticker_core::Symbol;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AlphaVantageClient::new("your_api_key")?;
//!     let symbol = Symbol::new("IBM");
//!
//!     let series = client.fetch_time_series(&symbol).await?;
//!     let overview = client.fetch_overview(&symbol).await?;
//!
//!     Ok(())
//! }
//! ```

/// Client and fetch options.
pub mod client;
/// Canned-response transport.
pub mod fixture;
/// Overview, statements and earnings.
pub mod fundamentals;
/// HTTP transport and response classification.
pub mod http;
/// Server-side indicator series.
pub mod indicators;
/// Insider transactions.
pub mod insider;
/// Market movers and the earnings calendar.
pub mod market;
/// Global quote and supplementary figures.
pub mod quote;
/// Request limiter.
pub mod rate_limit;
/// Time series.
pub mod series;

pub use client::{AlphaVantageClient, ClientOptions};
pub use fixture::FixtureTransport;
pub use http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpTransport, classify_response};
pub use indicators::ExternalIndicator;
pub use rate_limit::SlidingWindowLimiter;
