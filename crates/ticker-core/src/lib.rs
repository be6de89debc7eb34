#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the tickerscope pipeline.
//!
//! This crate provides the foundational abstractions shared by the fetchers,
//! the analytics and the compiler:
//!
//! - [`Transport`](provider::Transport) - One upstream request, classified
//! - [`DataProvider`](provider::DataProvider) - Provider metadata
//! - [`PriceSeries`](series::PriceSeries) - Date-indexed OHLCV table with derived columns
//! - [`WatchlistStore`](watchlist::WatchlistStore) - Saved symbols

/// Error types for data operations.
pub mod error;
/// Time series frequency and output size definitions.
pub mod frequency;
/// Provider and transport traits.
pub mod provider;
/// Time-indexed price table.
pub mod series;
/// Core data types (Symbol, OhlcvBar, statements, quotes, etc.).
pub mod types;
/// Watchlist trait and entry type.
pub mod watchlist;

// Re-export commonly used items at crate root
pub use error::{AdvisoryKind, DataError, ErrorKind, Result};
pub use frequency::{DataFrequency, OutputSize};
pub use provider::{ApiFunction, ApiQuery, DataProvider, Transport};
pub use series::{IndicatorSeries, PriceSeries, columns};
pub use types::{
    AnnualEarnings, AnnualReport, CompanyOverview, DisplayValue, EarningsCalendarEntry,
    EarningsHistory, FinancialStatement, GlobalQuote, InsiderTransaction, MarketMover,
    MarketMovers, NOT_AVAILABLE, OhlcvBar, QuarterlyEarnings, Symbol, TransactionKind,
    parse_number,
};
pub use watchlist::{WatchlistEntry, WatchlistStore};
