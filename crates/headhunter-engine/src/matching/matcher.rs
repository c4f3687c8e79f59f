use log::{debug, warn};

use super::fuzzy::{char_to_byte, fold_case, partial_ratio, partial_ratio_alignment, ratio};
use super::markers::detect_markers;
use super::split::{Extraction, split_content_token};
use super::stats::{ExtractionMethod, MatchStatistics, MatchedHeading, round2};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::models::{HeadingMetadata, TextCase, Token};
use crate::parsing::case::detect_text_case;

pub const EMPTY_EXPECTED_WARNING: &str = "Empty expected_headings list provided to matcher";

/// Revised tokens plus what the matcher found.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub tokens: Vec<Token>,
    pub statistics: MatchStatistics,
    pub warnings: Vec<String>,
}

/// Reconciles a token sequence with an ordered list of expected headings.
///
/// Each expected heading is looked for from just past the previous match:
/// first as an existing heading with the same text (ignoring case and
/// surrounding whitespace), then fuzzily inside content blocks, where a
/// hit splits the block around a new extracted heading. The fuzzy search
/// stops at the first heading that belongs to a later expected heading.
pub struct HeadingMatcher<'c> {
    config: &'c ParserConfig,
    threshold: u8,
}

/// A fuzzy hit inside one content token.
struct Candidate {
    extraction: Extraction,
    score: f64,
}

impl<'c> HeadingMatcher<'c> {
    pub fn new(config: &'c ParserConfig, threshold: u8) -> Self {
        Self {
            config,
            threshold: threshold.min(100),
        }
    }

    pub fn run<S: AsRef<str>>(&self, tokens: &[Token], expected: &[S]) -> Result<MatchOutcome, ParseError> {
        let mut warnings = Vec::new();
        if expected.is_empty() {
            warn!("{EMPTY_EXPECTED_WARNING}");
            warnings.push(EMPTY_EXPECTED_WARNING.to_string());
            return Ok(MatchOutcome {
                tokens: tokens.to_vec(),
                statistics: MatchStatistics::default(),
                warnings,
            });
        }

        let mut tokens = tokens.to_vec();
        let mut matched = Vec::new();
        let mut missing = Vec::new();
        let mut floor = 0;

        for (position, heading) in expected.iter().enumerate() {
            let heading = heading.as_ref();

            if let Some(idx) = find_exact(&tokens, heading, floor)
                && let Some(metadata) = tokens[idx].metadata()
            {
                matched.push(MatchedHeading {
                    expected: heading.to_string(),
                    matched_text: tokens[idx].text().to_string(),
                    extraction_method: ExtractionMethod::ExistingHeading,
                    confidence: 100.0,
                    line_number: tokens[idx].line_number(),
                    heading_signature: metadata.signature(),
                    was_extracted: metadata.is_extracted(),
                });
                floor = idx + 1;
                continue;
            }

            let window_end = find_later_heading(&tokens, &expected[position + 1..], floor)
                .unwrap_or(tokens.len());

            let Some((idx, candidate)) = self.search_window(&tokens, floor..window_end, heading, &mut warnings)
            else {
                debug!("Expected heading '{heading}' not found");
                missing.push(heading.to_string());
                continue;
            };

            let split = split_content_token(&tokens[idx], &candidate.extraction)?;
            let heading_idx = idx + split.heading_index;
            tokens.splice(idx..=idx, split.tokens);

            let extracted = &tokens[heading_idx];
            let signature = extracted.metadata().map(HeadingMetadata::signature).unwrap_or_default();
            matched.push(MatchedHeading {
                expected: heading.to_string(),
                matched_text: extracted.text().to_string(),
                extraction_method: ExtractionMethod::ExtractedFromContent,
                confidence: round2(candidate.score),
                line_number: extracted.line_number(),
                heading_signature: signature,
                was_extracted: true,
            });
            floor = heading_idx + 1;
        }

        debug!(
            "Matched {} of {} expected headings",
            matched.len(),
            expected.len()
        );
        Ok(MatchOutcome {
            tokens,
            statistics: MatchStatistics::new(expected.len(), matched, missing),
            warnings,
        })
    }

    /// First content token in `window` with an acceptable fuzzy hit.
    fn search_window(
        &self,
        tokens: &[Token],
        window: std::ops::Range<usize>,
        heading: &str,
        warnings: &mut Vec<String>,
    ) -> Option<(usize, Candidate)> {
        window
            .filter(|&idx| tokens[idx].is_content())
            .find_map(|idx| {
                self.fuzzy_match_in_content(&tokens[idx], heading, warnings)
                    .map(|candidate| (idx, candidate))
            })
    }

    /// Screens each non-blank line, then pins down the matched span on the
    /// first line that passes.
    fn fuzzy_match_in_content(&self, token: &Token, heading: &str, warnings: &mut Vec<String>) -> Option<Candidate> {
        let expected_lower = fold_case(heading);
        let threshold = f64::from(self.threshold);

        for (line_offset, line) in token.text().split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let score = partial_ratio(&expected_lower, &fold_case(line));
            if score < threshold {
                continue;
            }

            let Some(matched) = best_substring(line, &expected_lower, threshold) else {
                let msg = format!(
                    "Line passed partial_ratio screening (score={score}) but substring extraction failed for expected heading '{heading}'"
                );
                warn!("{msg}");
                warnings.push(msg);
                continue;
            };

            let marker = detect_markers(line, matched.clone(), self.config);
            return Some(Candidate {
                extraction: Extraction {
                    line_offset,
                    matched,
                    marker,
                },
                score,
            });
        }
        None
    }
}

/// Convenience wrapper around [`HeadingMatcher::run`].
pub fn match_headings<S: AsRef<str>>(
    tokens: &[Token],
    expected: &[S],
    threshold: u8,
    config: &ParserConfig,
) -> Result<MatchOutcome, ParseError> {
    HeadingMatcher::new(config, threshold).run(tokens, expected)
}

fn normalize(text: &str) -> String {
    fold_case(text.trim())
}

fn find_exact(tokens: &[Token], heading: &str, floor: usize) -> Option<usize> {
    let wanted = normalize(heading);
    (floor..tokens.len()).find(|&idx| tokens[idx].is_heading() && normalize(tokens[idx].text()) == wanted)
}

/// Index of the first heading from `floor` whose text matches any of `later`.
fn find_later_heading<S: AsRef<str>>(tokens: &[Token], later: &[S], floor: usize) -> Option<usize> {
    if later.is_empty() {
        return None;
    }
    let later: Vec<String> = later.iter().map(|h| normalize(h.as_ref())).collect();
    (floor..tokens.len())
        .find(|&idx| tokens[idx].is_heading() && later.contains(&normalize(tokens[idx].text())))
}

/// Byte range of the part of `line` that best matches `expected_lower`.
///
/// An all-caps line is taken whole when it scores well enough as a whole,
/// so a short caps heading is not mistaken for a fragment of itself.
fn best_substring(line: &str, expected_lower: &str, threshold: f64) -> Option<std::ops::Range<usize>> {
    let stripped = line.trim();
    let lead = line.len() - line.trim_start().len();

    if detect_text_case(stripped) == TextCase::AllCaps && ratio(expected_lower, &fold_case(stripped)) >= threshold {
        return Some(lead..lead + stripped.len());
    }

    let alignment = partial_ratio_alignment(expected_lower, &fold_case(line))?;
    if alignment.score < threshold {
        return None;
    }
    let start = char_to_byte(line, alignment.dest_start);
    let end = char_to_byte(line, alignment.dest_end);
    let raw = &line[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = start + (raw.len() - raw.trim_start().len());
    Some(start..start + trimmed.len())
}
