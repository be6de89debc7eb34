#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Number, percent and ratio formatting.
pub mod format;
/// Insider activity summary.
pub mod insider;
/// Ratios from annual statements.
pub mod metrics;
/// Company overview normalization.
pub mod overview;
/// Balance sheet highlights.
pub mod statements;
/// Supplementary quote and volume figures.
pub mod supplementary;
/// Technical indicators.
pub mod technical;

pub use format::{format_with_suffix, parse_suffixed};
pub use insider::{DEFAULT_RECENT_LIMIT, InsiderSummary};
pub use metrics::{CalculatedMetrics, calculate_metrics};
pub use overview::{NormalizedOverview, normalize_overview};
pub use statements::StatementHighlights;
pub use supplementary::SupplementaryData;
pub use technical::add_technical_indicators;
