use std::fmt;

use serde::Serialize;

/// Broad category of a fatal error raised while processing one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Unexpected failure inside the tokenizer.
    Tokenize,
    /// Failure in a later pipeline stage (matching, hierarchy building).
    Pipeline,
    /// A component produced a token or metadata that breaks its contract.
    Contract,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::Tokenize => "tokenize",
            ParseErrorKind::Pipeline => "pipeline",
            ParseErrorKind::Contract => "contract",
        };
        f.write_str(name)
    }
}

/// A fatal error that aborts processing of a single document.
///
/// Carries the originating line number when known and the underlying cause,
/// so batch callers can log it and move on to the next document.
#[derive(Debug, thiserror::Error)]
#[error("{message}{}", line_suffix(.line_number))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line_number: Option<usize>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

fn line_suffix(line_number: &Option<usize>) -> String {
    line_number.map(|line| format!(" (line {line})")).unwrap_or_default()
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line_number: None,
            source: None,
        }
    }

    #[must_use]
    pub fn at_line(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Violations of the heading metadata and token invariants.
///
/// These only surface when the tokenizer or matcher has a bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("{marker} marker count must be within {min}..={max}, got {count}")]
    MarkerCountOutOfRange {
        marker: &'static str,
        count: u8,
        min: u8,
        max: u8,
    },
    #[error("inline headings need an asterisk or column marker, got {0}")]
    InlineWithoutMarker(&'static str),
    #[error("heading tokens require metadata")]
    HeadingWithoutMetadata,
    #[error("content tokens cannot carry heading metadata")]
    ContentWithMetadata,
}

impl From<MetadataError> for ParseError {
    fn from(err: MetadataError) -> Self {
        ParseError::new(ParseErrorKind::Contract, err.to_string()).with_source(err)
    }
}

/// Errors raised while assembling a [`crate::ParserConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid regex for {key}: {source}")]
    InvalidPattern {
        key: String,
        source: regex::Error,
    },
    #[error("Pattern for {key} is missing the named group `{group}`")]
    MissingGroup { key: String, group: &'static str },
}
