//! Core types for the legislative radar: canonical bill records, the static
//! term sets, and the relevance filter applied to every raw candidate.

pub mod filter;
pub mod record;
pub mod terms;

pub use filter::RelevanceFilter;
pub use record::{BillRecord, Chamber, ConfigError, RelevantBill, SourceName, YearRange, UNKNOWN};
pub use terms::TermSet;
