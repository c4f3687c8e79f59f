use std::ops::Range;

use super::markers::MarkerHit;
use crate::error::MetadataError;
use crate::models::{ExtractionPosition, HeadingMetadata, Marker, Token};
use crate::parsing::case::detect_text_case;
use crate::parsing::tokenizer::count_leading_blank_lines;

/// Where a heading was found inside a content token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Zero-based line within the content token.
    pub line_offset: usize,
    /// Byte range of the heading text on that line.
    pub matched: Range<usize>,
    pub marker: Option<MarkerHit>,
}

impl Extraction {
    /// Byte range removed from the line: the heading plus its markers.
    fn cut(&self) -> Range<usize> {
        match &self.marker {
            Some(hit) => hit.span.start.min(self.matched.start)..hit.span.end.max(self.matched.end),
            None => self.matched.clone(),
        }
    }
}

/// Tokens replacing a split content token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub tokens: Vec<Token>,
    /// Position of the new heading within `tokens`.
    pub heading_index: usize,
}

/// Splits `token` around an extracted heading.
///
/// Text before the heading becomes a leading content token. For inline
/// headings the rest of the heading line becomes their content and any
/// following lines a separate sibling block; otherwise everything after the
/// heading becomes one content block.
pub fn split_content_token(token: &Token, extraction: &Extraction) -> Result<Split, MetadataError> {
    let lines: Vec<&str> = token.text().split('\n').collect();
    let offset = extraction.line_offset;
    let line = lines[offset];
    let heading_line = token.line_number() + offset;

    let cut = extraction.cut();
    let before = line[..cut.start].trim();
    let after = line[cut.end..].trim();
    let position = if before.is_empty() && after.is_empty() {
        ExtractionPosition::Standalone
    } else {
        ExtractionPosition::Inline
    };

    let mut tokens = Vec::new();

    let mut pre_lines = lines[..offset].to_vec();
    if !before.is_empty() {
        pre_lines.push(before);
    }
    let pre = pre_lines.join("\n");
    if !pre.trim().is_empty() {
        tokens.push(Token::content(pre.trim(), token.line_number()));
    }

    let text = &line[extraction.matched.clone()];
    let metadata = extracted_metadata(text, extraction.marker.as_ref(), position)?;
    let heading_index = tokens.len();
    tokens.push(Token::heading(text, heading_line, metadata));

    let rest = &lines[offset + 1..];
    if metadata.is_inline() {
        if !after.is_empty() {
            tokens.push(Token::content(after, heading_line));
        }
        let following = rest.join("\n");
        if !following.trim().is_empty() {
            let line_number = heading_line + 1 + count_leading_blank_lines(rest);
            tokens.push(Token::content(following.trim(), line_number));
        }
    } else {
        let mut post_lines = Vec::with_capacity(rest.len() + 1);
        if !after.is_empty() {
            post_lines.push(after);
        }
        post_lines.extend_from_slice(rest);
        let post = post_lines.join("\n");
        if !post.trim().is_empty() {
            let base = if after.is_empty() { heading_line + 1 } else { heading_line };
            tokens.push(Token::content(post.trim(), base + count_leading_blank_lines(&post_lines)));
        }
    }

    Ok(Split {
        tokens,
        heading_index,
    })
}

/// A heading with no recognizable markers counts as inline when it ends in a colon.
fn extracted_metadata(
    text: &str,
    hit: Option<&MarkerHit>,
    position: ExtractionPosition,
) -> Result<HeadingMetadata, MetadataError> {
    let case = detect_text_case(text);
    match hit {
        Some(hit) => HeadingMetadata::extracted(hit.marker, case, hit.is_inline, position),
        None if text.trim_end().ends_with(':') => {
            HeadingMetadata::extracted(Marker::Column, case, true, position)
        }
        None => HeadingMetadata::extracted(Marker::None, case, false, position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenKind;
    use pretty_assertions::assert_eq;

    fn extraction(token: &Token, line_offset: usize, needle: &str, marker: Option<MarkerHit>) -> Extraction {
        let line = token.text().split('\n').nth(line_offset).unwrap();
        let start = line.find(needle).unwrap();
        Extraction {
            line_offset,
            matched: start..start + needle.len(),
            marker,
        }
    }

    fn summary(split: &Split) -> Vec<(TokenKind, &str, usize)> {
        split
            .tokens
            .iter()
            .map(|t| (t.kind(), t.text(), t.line_number()))
            .collect()
    }

    fn squash(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn markerless_standalone_heading_owns_following_lines() {
        let token = Token::content("intro line\n\nFollow up\n\nnext visit\nin May", 10);
        let split = split_content_token(&token, &extraction(&token, 2, "Follow up", None)).unwrap();
        assert_eq!(
            summary(&split),
            vec![
                (TokenKind::Content, "intro line", 10),
                (TokenKind::Heading, "Follow up", 12),
                (TokenKind::Content, "next visit\nin May", 14),
            ]
        );
        assert_eq!(split.heading_index, 1);
        let meta = split.tokens[1].metadata().unwrap();
        assert_eq!(meta.extraction_position(), Some(ExtractionPosition::Standalone));
        assert_eq!(meta.signature(), "extracted-standalone-markerless");
    }

    #[test]
    fn inline_heading_separates_same_line_content_from_following_lines() {
        let line = "Patient SUMMARY: stable condition";
        let token = Token::content(format!("{line}\n\nreview in 2 weeks"), 3);
        let hit = MarkerHit {
            marker: Marker::Column,
            is_inline: true,
            span: 8..16,
        };
        let split = split_content_token(&token, &extraction(&token, 0, "SUMMARY", Some(hit))).unwrap();
        assert_eq!(
            summary(&split),
            vec![
                (TokenKind::Content, "Patient", 3),
                (TokenKind::Heading, "SUMMARY", 3),
                (TokenKind::Content, "stable condition", 3),
                (TokenKind::Content, "review in 2 weeks", 5),
            ]
        );
        let meta = split.tokens[1].metadata().unwrap();
        assert!(meta.is_inline());
        assert_eq!(meta.signature(), "extracted-inline-column-CAPS");
    }

    #[test]
    fn standalone_heading_with_trailing_text_keeps_line_number() {
        let token = Token::content("first\nsee Plan today\nthen more", 1);
        let split = split_content_token(&token, &extraction(&token, 1, "Plan", None)).unwrap();
        assert_eq!(
            summary(&split),
            vec![
                (TokenKind::Content, "first\nsee", 1),
                (TokenKind::Heading, "Plan", 2),
                (TokenKind::Content, "today\nthen more", 2),
            ]
        );
        assert!(!split.tokens[1].metadata().unwrap().is_inline());
    }

    #[test]
    fn markerless_text_ending_in_colon_is_inline_column() {
        let token = Token::content("Allergies: none known", 4);
        let extraction = Extraction {
            line_offset: 0,
            matched: 0..10,
            marker: None,
        };
        let split = split_content_token(&token, &extraction).unwrap();
        let meta = split.tokens[0].metadata().unwrap();
        assert_eq!(meta.marker(), Marker::Column);
        assert!(meta.is_inline());
        assert_eq!(split.tokens[1].text(), "none known");
    }

    #[test]
    fn markers_are_cut_from_surrounding_content() {
        let token = Token::content("**Plan:** rest and fluids", 7);
        let hit = MarkerHit {
            marker: Marker::Asterisk(2),
            is_inline: true,
            span: 0..9,
        };
        let split = split_content_token(&token, &extraction(&token, 0, "Plan", Some(hit))).unwrap();
        assert_eq!(
            summary(&split),
            vec![
                (TokenKind::Heading, "Plan", 7),
                (TokenKind::Content, "rest and fluids", 7),
            ]
        );
        assert_eq!(split.heading_index, 0);
    }

    #[test]
    fn unmarked_split_conserves_text() {
        let original = "alpha beta\nsome Follow up here\n\nmore words";
        let token = Token::content(original, 1);
        let split = split_content_token(&token, &extraction(&token, 1, "Follow up", None)).unwrap();
        let rebuilt = split
            .tokens
            .iter()
            .map(Token::text)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(squash(&rebuilt), squash(original));
    }
}
