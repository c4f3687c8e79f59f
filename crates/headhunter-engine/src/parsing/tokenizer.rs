use log::{debug, error};

use super::case::detect_text_case;
use super::patterns::HeadingCapture;
use crate::config::ParserConfig;
use crate::error::{MetadataError, ParseError, ParseErrorKind};
use crate::models::{HeadingMetadata, Marker, Token};

pub const EMPTY_TEXT_WARNING: &str = "Empty or whitespace-only text provided";

/// Splits raw text into heading and content tokens.
///
/// Each line is tried against the heading conventions in fixed priority
/// order: inline colon (`**Label:** text`), hash (`## Label`), then
/// standalone asterisk (`**Label**`). A candidate whose label has more than
/// `heading_max_words` words is demoted to content. Runs of non-heading
/// lines become a single content token.
pub struct Tokenizer<'c> {
    config: &'c ParserConfig,
}

impl<'c> Tokenizer<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        Self { config }
    }

    /// Tokenizes `text`, returning the tokens plus any soft warnings.
    pub fn tokenize(&self, text: &str) -> Result<(Vec<Token>, Vec<String>), ParseError> {
        let mut tokens = Vec::new();
        let mut warnings = Vec::new();

        if text.trim().is_empty() {
            debug!("{EMPTY_TEXT_WARNING}");
            warnings.push(EMPTY_TEXT_WARNING.to_string());
            return Ok((tokens, warnings));
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let mut pos = 0;

        while pos < lines.len() {
            let line = lines[pos];
            let line_number = pos + 1;

            let recognized = self
                .recognize_heading(line, line_number)
                .map_err(|err| fatal(err, line_number))?;
            if let Some(heading_tokens) = recognized {
                tokens.extend(heading_tokens);
                pos += 1;
                continue;
            }

            let start = pos;
            pos += 1;
            while pos < lines.len() && !self.is_heading_line(lines[pos]) {
                pos += 1;
            }
            if let Some(token) = content_token(&lines[start..pos], line_number) {
                tokens.push(token);
            }
        }

        debug!("Tokenized {} lines into {} tokens", lines.len(), tokens.len());
        Ok((tokens, warnings))
    }

    /// Lookahead check: does `line` qualify as a heading under any convention?
    ///
    /// Applies the same word-count gate as full recognition but builds no tokens.
    pub fn is_heading_line(&self, line: &str) -> bool {
        [
            self.config.inline_colon_pattern(),
            self.config.heading_hash_pattern(),
            self.config.heading_asterisk_pattern(),
        ]
        .into_iter()
        .filter_map(|pattern| pattern.captures(line))
        .any(|cap| self.within_word_limit(&cap.label))
    }

    fn within_word_limit(&self, label: &str) -> bool {
        label.split_whitespace().count() <= self.config.heading_max_words()
    }

    fn recognize_heading(
        &self,
        line: &str,
        line_number: usize,
    ) -> Result<Option<Vec<Token>>, MetadataError> {
        if let Some(pair) = self.try_inline_heading(line, line_number)? {
            return Ok(Some(pair.to_vec()));
        }
        if let Some(token) = self.try_hash_heading(line, line_number)? {
            return Ok(Some(vec![token]));
        }
        if let Some(token) = self.try_asterisk_heading(line, line_number)? {
            return Ok(Some(vec![token]));
        }
        Ok(None)
    }

    /// `**Label:** content` or `**Label**: content`, yielding a heading and
    /// its content on the same line.
    fn try_inline_heading(
        &self,
        line: &str,
        line_number: usize,
    ) -> Result<Option<[Token; 2]>, MetadataError> {
        let Some(cap) = self.config.inline_colon_pattern().captures(line) else {
            return Ok(None);
        };
        let Some(label) = self.gated_label(&cap) else {
            return Ok(None);
        };
        let content = cap.content.unwrap_or_default().trim();

        let marker = Marker::Asterisk(run_length(cap.marker_count));
        let metadata = HeadingMetadata::new(marker, detect_text_case(label), true)?;
        Ok(Some([
            Token::heading(label, line_number, metadata),
            Token::content(content, line_number),
        ]))
    }

    fn try_hash_heading(&self, line: &str, line_number: usize) -> Result<Option<Token>, MetadataError> {
        self.try_standalone(self.config.heading_hash_pattern().captures(line), line_number, Marker::Hash)
    }

    fn try_asterisk_heading(
        &self,
        line: &str,
        line_number: usize,
    ) -> Result<Option<Token>, MetadataError> {
        self.try_standalone(
            self.config.heading_asterisk_pattern().captures(line),
            line_number,
            Marker::Asterisk,
        )
    }

    fn try_standalone(
        &self,
        cap: Option<HeadingCapture<'_>>,
        line_number: usize,
        marker: fn(u8) -> Marker,
    ) -> Result<Option<Token>, MetadataError> {
        let Some(cap) = cap else {
            return Ok(None);
        };
        let Some(label) = self.gated_label(&cap) else {
            return Ok(None);
        };
        let marker = marker(run_length(cap.marker_count));
        let metadata = HeadingMetadata::new(marker, detect_text_case(label), false)?;
        Ok(Some(Token::heading(label, line_number, metadata)))
    }

    fn gated_label<'a>(&self, cap: &'a HeadingCapture<'_>) -> Option<&'a str> {
        let label = cap.label.trim();
        self.within_word_limit(label).then_some(label)
    }
}

/// Convenience wrapper around [`Tokenizer::tokenize`].
pub fn tokenize(text: &str, config: &ParserConfig) -> Result<(Vec<Token>, Vec<String>), ParseError> {
    Tokenizer::new(config).tokenize(text)
}

/// Joins a run of non-heading lines into one trimmed content token.
///
/// The token's line number skips leading blank lines; an all-blank run
/// produces nothing.
fn content_token(lines: &[&str], first_line_number: usize) -> Option<Token> {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let leading_blank = count_leading_blank_lines(lines);
    Some(Token::content(text, first_line_number + leading_blank))
}

pub(crate) fn count_leading_blank_lines<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .take_while(|line| line.as_ref().trim().is_empty())
        .count()
}

/// Marker runs longer than `u8::MAX` saturate so validation can reject them.
fn run_length(count: usize) -> u8 {
    u8::try_from(count).unwrap_or(u8::MAX)
}

fn fatal(err: MetadataError, line_number: usize) -> ParseError {
    error!("Fatal error during tokenization at line {line_number}: {err}");
    ParseError::new(
        ParseErrorKind::Tokenize,
        format!("Fatal error during tokenization: {err}"),
    )
    .at_line(line_number)
    .with_source(err)
}
