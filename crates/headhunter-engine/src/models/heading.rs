use std::fmt;

use serde::Serialize;

use crate::error::MetadataError;

/// Letter-case category of a piece of heading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    AllCaps,
    AllLowercase,
    TitleCase,
    SentenceCase,
    Unknown,
}

impl TextCase {
    pub fn as_str(self) -> &'static str {
        match self {
            TextCase::AllCaps => "all_caps",
            TextCase::AllLowercase => "all_lowercase",
            TextCase::TitleCase => "title_case",
            TextCase::SentenceCase => "sentence_case",
            TextCase::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The formatting marker that introduced a heading.
///
/// The count carried by `Hash` and `Asterisk` is the length of the marker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `#` run, 1 to 6 long.
    Hash(u8),
    /// `*` run, 1 to 3 long.
    Asterisk(u8),
    /// A bare `Label:` found by the matcher with no surrounding markers.
    Column,
    /// No marker at all.
    None,
}

impl Marker {
    pub fn count(self) -> u8 {
        match self {
            Marker::Hash(n) | Marker::Asterisk(n) => n,
            Marker::Column => 1,
            Marker::None => 0,
        }
    }

    /// The marker character as written in markdown, if any.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Marker::Hash(_) => Some("#"),
            Marker::Asterisk(_) => Some("*"),
            Marker::Column => Some(":"),
            Marker::None => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Marker::Hash(_) => "hash",
            Marker::Asterisk(_) => "asterisk",
            Marker::Column => "column",
            Marker::None => "none",
        }
    }

    fn validate(self) -> Result<(), MetadataError> {
        let (min, max) = match self {
            Marker::Hash(_) => (1, 6),
            Marker::Asterisk(_) => (1, 3),
            Marker::Column | Marker::None => return Ok(()),
        };
        let count = self.count();
        if (min..=max).contains(&count) {
            Ok(())
        } else {
            Err(MetadataError::MarkerCountOutOfRange {
                marker: self.name(),
                count,
                min,
                max,
            })
        }
    }
}

/// Where a matcher-extracted heading sat on its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPosition {
    /// Other text shared the line with the heading.
    Inline,
    /// The heading was alone on its line.
    Standalone,
}

impl ExtractionPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionPosition::Inline => "inline",
            ExtractionPosition::Standalone => "standalone",
        }
    }
}

/// Formatting and provenance of a heading token.
///
/// Constructed through [`HeadingMetadata::new`] or
/// [`HeadingMetadata::extracted`], which reject marker counts outside the
/// range of their marker and inline flags on markers that cannot be inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadingMetadata {
    marker: Marker,
    case: TextCase,
    is_inline: bool,
    extraction: Option<ExtractionPosition>,
}

impl HeadingMetadata {
    /// Metadata for a heading recognized by the tokenizer.
    pub fn new(marker: Marker, case: TextCase, is_inline: bool) -> Result<Self, MetadataError> {
        Self::build(marker, case, is_inline, None)
    }

    /// Metadata for a heading carved out of content by the matcher.
    pub fn extracted(
        marker: Marker,
        case: TextCase,
        is_inline: bool,
        position: ExtractionPosition,
    ) -> Result<Self, MetadataError> {
        Self::build(marker, case, is_inline, Some(position))
    }

    fn build(
        marker: Marker,
        case: TextCase,
        is_inline: bool,
        extraction: Option<ExtractionPosition>,
    ) -> Result<Self, MetadataError> {
        marker.validate()?;
        if is_inline && !matches!(marker, Marker::Asterisk(_) | Marker::Column) {
            return Err(MetadataError::InlineWithoutMarker(marker.name()));
        }
        Ok(Self {
            marker,
            case,
            is_inline,
            extraction,
        })
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn marker_count(&self) -> u8 {
        self.marker.count()
    }

    pub fn case(&self) -> TextCase {
        self.case
    }

    pub fn is_inline(&self) -> bool {
        self.is_inline
    }

    pub fn is_extracted(&self) -> bool {
        self.extraction.is_some()
    }

    pub fn extraction_position(&self) -> Option<ExtractionPosition> {
        self.extraction
    }

    pub fn is_hash(&self) -> bool {
        matches!(self.marker, Marker::Hash(_))
    }

    pub fn is_asterisk(&self) -> bool {
        matches!(self.marker, Marker::Asterisk(_))
    }

    pub fn is_all_caps(&self) -> bool {
        self.case == TextCase::AllCaps
    }

    /// Compact fingerprint of the heading's formatting, e.g. `#2`, `*2-CAPS`,
    /// `*1-inline` or `extracted-inline-column`.
    pub fn signature(&self) -> String {
        let mut sig = match self.marker {
            Marker::Hash(n) => format!("#{n}"),
            Marker::Asterisk(n) => format!("*{n}"),
            Marker::Column => "column".to_string(),
            Marker::None => "markerless".to_string(),
        };
        if self.is_all_caps() {
            sig.push_str("-CAPS");
        }
        if self.is_inline && self.marker != Marker::Column {
            sig.push_str("-inline");
        }
        match self.extraction {
            Some(position) => format!("extracted-{}-{sig}", position.as_str()),
            None => sig,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Marker::Hash(0))]
    #[case(Marker::Hash(7))]
    #[case(Marker::Asterisk(0))]
    #[case(Marker::Asterisk(5))]
    fn rejects_out_of_range_counts(#[case] marker: Marker) {
        let err = HeadingMetadata::new(marker, TextCase::Unknown, false).unwrap_err();
        assert!(matches!(err, MetadataError::MarkerCountOutOfRange { .. }));
    }

    #[rstest]
    #[case(Marker::Hash(2))]
    #[case(Marker::None)]
    fn rejects_inline_on_non_inline_markers(#[case] marker: Marker) {
        let err = HeadingMetadata::new(marker, TextCase::Unknown, true).unwrap_err();
        assert!(matches!(err, MetadataError::InlineWithoutMarker(_)));
    }

    #[rstest]
    #[case(Marker::Hash(1), TextCase::TitleCase, false, None, "#1")]
    #[case(Marker::Hash(3), TextCase::AllCaps, false, None, "#3-CAPS")]
    #[case(Marker::Asterisk(2), TextCase::SentenceCase, true, None, "*2-inline")]
    #[case(Marker::Asterisk(2), TextCase::AllCaps, true, None, "*2-CAPS-inline")]
    #[case(Marker::None, TextCase::Unknown, false, Some(ExtractionPosition::Standalone), "extracted-standalone-markerless")]
    #[case(Marker::Column, TextCase::AllCaps, true, Some(ExtractionPosition::Inline), "extracted-inline-column-CAPS")]
    fn signature_encodes_formatting(
        #[case] marker: Marker,
        #[case] case: TextCase,
        #[case] inline: bool,
        #[case] extraction: Option<ExtractionPosition>,
        #[case] expected: &str,
    ) {
        let meta = match extraction {
            Some(position) => HeadingMetadata::extracted(marker, case, inline, position),
            None => HeadingMetadata::new(marker, case, inline),
        }
        .unwrap();
        assert_eq!(meta.signature(), expected);
    }

    #[test]
    fn column_marker_counts_one() {
        assert_eq!(Marker::Column.count(), 1);
        assert_eq!(Marker::None.count(), 0);
    }
}
