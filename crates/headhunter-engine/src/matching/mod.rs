//! Reconciling parsed documents with expected heading lists.

pub mod fuzzy;
pub mod markers;
pub mod matcher;
pub mod split;
pub mod stats;

pub use matcher::{HeadingMatcher, MatchOutcome, match_headings};
pub use stats::{ExtractionMethod, MatchStatistics, MatchedHeading};
