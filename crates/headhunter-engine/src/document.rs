//! Whole-document pipeline: tokenize, optionally match expected headings,
//! build the hierarchy.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::hierarchy::{HierarchyContext, build_hierarchy};
use crate::matching::{MatchStatistics, match_headings};
use crate::models::Token;
use crate::output::{ContentRow, DocumentTree, to_markdown, to_rows, to_sections, to_tree_string};
use crate::parsing::tokenize;

/// Caller-supplied facts about a document, carried through to every output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.fields.is_empty()
    }

    /// `(key, display value)` pairs, id first. Strings display unquoted.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> {
        let id = self.id.as_deref().map(|id| ("id", id.to_string()));
        id.into_iter().chain(
            self.fields
                .iter()
                .map(|(key, value)| (key.as_str(), display_value(value))),
        )
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Expected headings to reconcile each document against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub expected_headings: Vec<String>,
    /// Minimum fuzzy score, 0 to 100.
    pub threshold: u8,
}

impl MatchOptions {
    pub const DEFAULT_THRESHOLD: u8 = 80;

    pub fn new<I, S>(expected_headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_headings: expected_headings.into_iter().map(Into::into).collect(),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }
}

/// The result of parsing one document. Never mutated once built.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    text: String,
    metadata: DocumentMetadata,
    tokens: Vec<Token>,
    hierarchy: Vec<HierarchyContext>,
    warnings: Vec<String>,
    match_statistics: Option<MatchStatistics>,
}

impl ParsedDocument {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The caller's id, or the SHA-256 of the text when none was given.
    pub fn id(&self) -> &str {
        self.metadata.id().unwrap_or_default()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn hierarchy(&self) -> &[HierarchyContext] {
        &self.hierarchy
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn match_statistics(&self) -> Option<&MatchStatistics> {
        self.match_statistics.as_ref()
    }

    /// Matches expected headings against this document's tokens and returns
    /// a new document with the revised tokens and a rebuilt hierarchy.
    pub fn match_headings<S: AsRef<str>>(
        &self,
        expected: &[S],
        threshold: u8,
        config: &ParserConfig,
    ) -> Result<ParsedDocument, ParseError> {
        check_threshold(threshold)?;
        let outcome = match_headings(&self.tokens, expected, threshold, config)?;
        let (hierarchy, hierarchy_warnings) = build_hierarchy(&outcome.tokens);

        let mut warnings = self.warnings.clone();
        warnings.extend(outcome.warnings);
        warnings.extend(hierarchy_warnings);

        Ok(ParsedDocument {
            text: self.text.clone(),
            metadata: self.metadata.clone(),
            tokens: outcome.tokens,
            hierarchy,
            warnings,
            match_statistics: Some(outcome.statistics),
        })
    }

    pub fn to_sections(&self) -> DocumentTree {
        to_sections(&self.hierarchy, self.metadata.clone(), self.match_statistics.clone())
    }

    pub fn to_tree(&self, show_line_numbers: bool, show_type: bool) -> String {
        to_tree_string(&self.hierarchy, show_line_numbers, show_type, Some(&self.metadata))
    }

    pub fn to_markdown(&self) -> String {
        to_markdown(&self.hierarchy, Some(&self.metadata))
    }

    pub fn to_rows(&self) -> Vec<ContentRow> {
        to_rows(&self.hierarchy, self.id(), Some(&self.metadata))
    }
}

/// Parses one document end to end.
///
/// With `options`, expected headings are matched between tokenizing and
/// building the hierarchy. Warnings from each stage are kept in order.
pub fn process_text(
    text: &str,
    config: &ParserConfig,
    mut metadata: DocumentMetadata,
    options: Option<&MatchOptions>,
) -> Result<ParsedDocument, ParseError> {
    if metadata.id.is_none() {
        warn!("No document ID found. Generating one from content hash.");
        metadata.id = Some(content_hash(text));
    }

    let (tokens, mut warnings) = tokenize(text, config)?;

    let (tokens, match_statistics) = match options.filter(|o| !o.expected_headings.is_empty()) {
        Some(options) => {
            check_threshold(options.threshold)?;
            let outcome = match_headings(&tokens, &options.expected_headings, options.threshold, config)?;
            warnings.extend(outcome.warnings);
            (outcome.tokens, Some(outcome.statistics))
        }
        None => (tokens, None),
    };

    let (hierarchy, hierarchy_warnings) = build_hierarchy(&tokens);
    warnings.extend(hierarchy_warnings);

    debug!(
        "Parsed document {} into {} tokens",
        metadata.id().unwrap_or_default(),
        tokens.len()
    );
    Ok(ParsedDocument {
        text: text.to_string(),
        metadata,
        tokens,
        hierarchy,
        warnings,
        match_statistics,
    })
}

fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

fn check_threshold(threshold: u8) -> Result<(), ParseError> {
    if threshold > 100 {
        return Err(ParseError::new(
            ParseErrorKind::Pipeline,
            format!("Match threshold must be between 0 and 100, got {threshold}"),
        ));
    }
    Ok(())
}

/// One document awaiting batch processing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInput {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl DocumentInput {
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A document the batch could not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub doc_id: Option<String>,
    /// Position of the document in the batch input.
    pub index: usize,
    pub kind: ParseErrorKind,
    pub message: String,
    pub line_number: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub documents: Vec<ParsedDocument>,
    pub errors: Vec<BatchError>,
    /// Warnings of every parsed document, each prefixed with `[doc id]`.
    pub warnings: Vec<String>,
}

impl ParsedBatch {
    pub fn total(&self) -> usize {
        self.documents.len() + self.errors.len()
    }

    /// Fraction of documents parsed successfully; `None` for an empty batch.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.documents.len() as f64 / total as f64)
    }
}

/// Parses every input independently. A failing document is recorded in
/// [`ParsedBatch::errors`] and the rest carry on.
pub fn process_batch<I>(inputs: I, config: &ParserConfig, options: Option<&MatchOptions>) -> ParsedBatch
where
    I: IntoIterator<Item = DocumentInput>,
{
    let mut batch = ParsedBatch::default();

    for (index, input) in inputs.into_iter().enumerate() {
        let mut metadata = input.metadata;
        metadata.fields.entry("row_index".to_string()).or_insert_with(|| Value::from(index));
        let doc_id = metadata.id.clone();

        match process_text(&input.text, config, metadata, options) {
            Ok(document) => {
                let id = document.id().to_string();
                batch
                    .warnings
                    .extend(document.warnings().iter().map(|w| format!("[{id}] {w}")));
                batch.documents.push(document);
            }
            Err(err) => {
                warn!(
                    "Parsing error for doc_id {} at index {index}: {err}",
                    doc_id.as_deref().unwrap_or("<none>")
                );
                batch.errors.push(BatchError {
                    doc_id,
                    index,
                    kind: err.kind,
                    message: err.to_string(),
                    line_number: err.line_number,
                });
            }
        }
    }

    info!(
        "Batch processing complete: {} successful, {} errors",
        batch.documents.len(),
        batch.errors.len()
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn generates_id_from_content_hash() {
        let doc = process_text("hello", &ParserConfig::default(), DocumentMetadata::default(), None).unwrap();
        assert_eq!(
            doc.id(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn keeps_caller_id() {
        let doc = process_text("# T", &ParserConfig::default(), DocumentMetadata::with_id("n1"), None).unwrap();
        assert_eq!(doc.id(), "n1");
        assert!(doc.match_statistics().is_none());
    }

    #[test]
    fn matching_runs_before_hierarchy() {
        let options = MatchOptions::new(["Summary"]);
        let doc = process_text(
            "# Visit\nPatient SUMMARY: stable condition",
            &ParserConfig::default(),
            DocumentMetadata::with_id("v"),
            Some(&options),
        )
        .unwrap();
        let levels: Vec<(&str, usize)> = doc
            .hierarchy()
            .iter()
            .map(|c| (c.token().text(), c.level()))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("Visit", 1),
                ("Patient", 2),
                ("SUMMARY", 2),
                ("stable condition", 3),
            ]
        );
        assert_eq!(doc.match_statistics().unwrap().match_percentage, 100.0);
    }

    #[test]
    fn rematching_returns_new_document() {
        let config = ParserConfig::default();
        let doc = process_text("intro\nPLAN\nrest", &config, DocumentMetadata::with_id("p"), None).unwrap();
        let matched = doc.match_headings(&["Plan"], 80, &config).unwrap();
        assert_eq!(doc.tokens().len(), 1);
        assert_eq!(matched.tokens().len(), 3);
        assert!(matched.tokens()[1].is_heading());
    }

    #[test]
    fn threshold_above_hundred_is_rejected() {
        let doc = process_text("x", &ParserConfig::default(), DocumentMetadata::with_id("t"), None).unwrap();
        let err = doc.match_headings(&["x"], 150, &ParserConfig::default()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Pipeline);
    }

    #[test]
    fn batch_collects_errors_and_continues() {
        let (config, _) = ParserConfig::from_entries([(
            "heading_hash_pattern",
            ConfigValue::from(r"^(?P<marker>#{1,9})\s*(?P<label>.*)"),
        )])
        .unwrap();
        let inputs = vec![
            DocumentInput::new("# Fine", DocumentMetadata::with_id("a")),
            DocumentInput::new("ok\n######## Too deep", DocumentMetadata::with_id("b")),
            DocumentInput::new("", DocumentMetadata::with_id("c")),
        ];
        let batch = process_batch(inputs, &config, None);

        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.errors.len(), 1);
        let error = &batch.errors[0];
        assert_eq!(error.doc_id.as_deref(), Some("b"));
        assert_eq!(error.index, 1);
        assert_eq!(error.kind, ParseErrorKind::Tokenize);
        assert_eq!(error.line_number, Some(2));
        assert_eq!(
            batch.warnings,
            vec![
                "[c] Empty or whitespace-only text provided".to_string(),
                "[c] No tokens provided for hierarchy building".to_string(),
            ]
        );
        assert_eq!(batch.documents[0].metadata().fields["row_index"], Value::from(0));
    }
}
