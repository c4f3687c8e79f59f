use std::ops::Range;

use crate::config::ParserConfig;
use crate::models::Marker;

/// A relaxed heading pattern found around a fuzzy match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub marker: Marker,
    /// The hit came from the inline-colon pattern.
    pub is_inline: bool,
    /// Byte range on the line that the heading and its markers occupy.
    pub span: Range<usize>,
}

/// Looks for a relaxed heading pattern whose label contains `matched.start`.
///
/// Patterns are tried inline-colon first, then hash, then asterisk; the
/// first whose label starts at or before the match, and whose overall span
/// extends past the match start, wins.
pub fn detect_markers(line: &str, matched: Range<usize>, config: &ParserConfig) -> Option<MarkerHit> {
    let covers = |label_start: usize, span: &Range<usize>| {
        label_start <= matched.start && matched.start < span.end
    };

    if let Some(cap) = config.match_inline_colon_pattern().captures(line)
        && covers(cap.label_start, &cap.span)
    {
        let marker = match cap.marker_count {
            0 => Marker::Column,
            n => Marker::Asterisk(u8::try_from(n).unwrap_or(u8::MAX)),
        };
        return Some(MarkerHit {
            marker,
            is_inline: true,
            span: trim_span(line, cap.span, &matched),
        });
    }

    if let Some(cap) = config.match_hash_pattern().captures(line)
        && covers(cap.label_start, &cap.span)
    {
        // The relaxed hash label is a single word; the match may run past it.
        return Some(MarkerHit {
            marker: Marker::Hash(u8::try_from(cap.marker_count).unwrap_or(u8::MAX)),
            is_inline: false,
            span: trim_span(line, cap.span.start..matched.end, &matched),
        });
    }

    if let Some(cap) = config.match_asterisk_pattern().captures(line)
        && covers(cap.label_start, &cap.span)
    {
        return Some(MarkerHit {
            marker: Marker::Asterisk(u8::try_from(cap.marker_count).unwrap_or(u8::MAX)),
            is_inline: false,
            span: trim_span(line, cap.span, &matched),
        });
    }

    None
}

/// Narrows a pattern span to the matched text plus any adjacent marker
/// characters, so surrounding prose stays out of the heading.
fn trim_span(line: &str, span: Range<usize>, matched: &Range<usize>) -> Range<usize> {
    let is_decoration = |c: char| matches!(c, '*' | '#' | ':') || c.is_whitespace();

    let lead = &line[span.start..matched.start];
    let start = if lead.chars().all(is_decoration) {
        matched.start - lead.trim_start().len()
    } else {
        matched.start
    };

    let tail = if span.end > matched.end {
        &line[matched.end..span.end]
    } else {
        ""
    };
    let end = if tail.chars().all(is_decoration) {
        matched.end + tail.trim_end().len()
    } else {
        matched.end
    };
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn hit(line: &str, needle: &str) -> Option<MarkerHit> {
        let start = line.find(needle).unwrap();
        detect_markers(line, start..start + needle.len(), &ParserConfig::default())
    }

    #[test]
    fn bare_label_with_colon_is_column_inline() {
        let line = "Patient SUMMARY: stable condition";
        let hit = hit(line, "SUMMARY").unwrap();
        assert_eq!(hit.marker, Marker::Column);
        assert!(hit.is_inline);
        assert_eq!(&line[hit.span], "SUMMARY:");
    }

    #[rstest]
    #[case("**Plan:** rest today", Marker::Asterisk(2), "**Plan:**")]
    #[case("*Plan*: rest today", Marker::Asterisk(1), "*Plan*:")]
    fn inline_asterisk_labels(#[case] line: &str, #[case] marker: Marker, #[case] span: &str) {
        let hit = hit(line, "Plan").unwrap();
        assert_eq!(hit.marker, marker);
        assert!(hit.is_inline);
        assert_eq!(&line[hit.span], span);
    }

    #[test]
    fn hash_marker_keeps_full_match() {
        let line = "see ## Care Plan below";
        let hit = hit(line, "Care Plan").unwrap();
        assert_eq!(hit.marker, Marker::Hash(2));
        assert!(!hit.is_inline);
        assert_eq!(&line[hit.span], "## Care Plan");
    }

    #[test]
    fn standalone_asterisk_marker() {
        let line = "then ***Follow up*** next week";
        let hit = hit(line, "Follow up").unwrap();
        assert_eq!(hit.marker, Marker::Asterisk(3));
        assert!(!hit.is_inline);
        assert_eq!(&line[hit.span], "***Follow up***");
    }

    #[test]
    fn plain_text_has_no_markers() {
        assert_eq!(hit("the follow up is booked", "follow up"), None);
    }

    #[test]
    fn match_outside_label_is_ignored() {
        // The colon pattern ends where "plan" starts.
        assert_eq!(hit("Notes: plan agreed", "plan"), None);
    }
}
