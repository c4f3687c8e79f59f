//! Regex wrappers for the heading conventions.
//!
//! Patterns identify their parts through named capture groups:
//!
//! - `marker` (required): the opening `#` or `*` run
//! - `label` (required): the heading text
//! - `close` (optional): the closing `*` run, possibly with the colon of an
//!   inline heading on either side of it
//! - `content` (optional): text trailing an inline heading
//!
//! The `regex` crate has no back-references, so "same run on both sides" is
//! enforced here: the shorter of the two runs becomes the marker count and
//! any surplus asterisks are folded back into the label.

use std::borrow::Cow;
use std::ops::Range;

use regex::Regex;

use crate::error::ConfigError;

const REQUIRED_GROUPS: [&str; 2] = ["marker", "label"];

/// A compiled heading pattern with validated capture groups.
#[derive(Debug, Clone)]
pub struct HeadingPattern {
    regex: Regex,
}

/// One heading-pattern hit within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCapture<'t> {
    /// Balanced marker run length. Zero for relaxed patterns whose marker run is optional.
    pub marker_count: usize,
    /// Heading text, untrimmed.
    pub label: Cow<'t, str>,
    /// Byte offset of the label within the line.
    pub label_start: usize,
    /// Byte range of the whole match within the line.
    pub span: Range<usize>,
    /// Trailing text for inline headings.
    pub content: Option<&'t str>,
}

impl HeadingPattern {
    /// Compiles `source`, checking that it defines the required named groups.
    ///
    /// `key` names the config entry in error messages.
    pub fn new(key: &str, source: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(source).map_err(|source| ConfigError::InvalidPattern {
            key: key.to_string(),
            source,
        })?;
        for group in REQUIRED_GROUPS {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(ConfigError::MissingGroup {
                    key: key.to_string(),
                    group,
                });
            }
        }
        Ok(Self { regex })
    }

    /// Builds a pattern from a source string known to be valid.
    pub(crate) fn builtin(key: &str, source: &str) -> Self {
        Self::new(key, source).expect("Invalid builtin heading pattern")
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Cheap existence check, no label extraction.
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Finds the first match in `line` and balances its marker runs.
    pub fn captures<'t>(&self, line: &'t str) -> Option<HeadingCapture<'t>> {
        let caps = self.regex.captures(line)?;
        let whole = caps.get(0)?;
        let marker = caps.name("marker")?;
        let label = caps.name("label")?;

        let open = marker.as_str().chars().filter(|&c| c == '*' || c == '#').count();
        let close_match = caps.name("close");
        let close_text = close_match.map_or("", |m| m.as_str());
        let close = close_text.chars().filter(|&c| c == '*').count();
        let close_has_colon = close_text.contains(':');

        let marker_count = match close_match {
            Some(_) if close > 0 => open.min(close),
            _ => open,
        };

        let open_surplus = open - marker_count;
        let close_surplus = if close_match.is_some() && close > 0 && !close_has_colon {
            close - marker_count
        } else {
            0
        };

        let (label_text, label_start) = if open_surplus == 0 && close_surplus == 0 {
            (Cow::Borrowed(label.as_str()), label.start())
        } else {
            let folded = format!(
                "{}{}{}",
                "*".repeat(open_surplus),
                label.as_str(),
                "*".repeat(close_surplus)
            );
            let start = if open_surplus > 0 {
                marker.start() + marker_count
            } else {
                label.start()
            };
            (Cow::Owned(folded), start)
        };

        Some(HeadingCapture {
            marker_count,
            label: label_text,
            label_start,
            span: whole.range(),
            content: caps.name("content").map(|m| m.as_str()),
        })
    }
}
