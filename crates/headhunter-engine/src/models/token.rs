use serde::Serialize;

use super::heading::HeadingMetadata;
use crate::error::MetadataError;

/// Whether a token is a heading or a block of body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Heading,
    Content,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Heading => "heading",
            TokenKind::Content => "content",
        }
    }
}

/// An immutable span of parsed text.
///
/// Heading tokens always carry [`HeadingMetadata`]; content tokens never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    content: String,
    line_number: usize,
    metadata: Option<HeadingMetadata>,
}

impl Token {
    /// Builds a token, checking that metadata is present exactly for headings.
    pub fn new(
        kind: TokenKind,
        content: impl Into<String>,
        line_number: usize,
        metadata: Option<HeadingMetadata>,
    ) -> Result<Self, MetadataError> {
        match (kind, metadata.is_some()) {
            (TokenKind::Heading, false) => Err(MetadataError::HeadingWithoutMetadata),
            (TokenKind::Content, true) => Err(MetadataError::ContentWithMetadata),
            _ => Ok(Self {
                kind,
                content: content.into(),
                line_number,
                metadata,
            }),
        }
    }

    pub fn heading(content: impl Into<String>, line_number: usize, metadata: HeadingMetadata) -> Self {
        Self {
            kind: TokenKind::Heading,
            content: content.into(),
            line_number,
            metadata: Some(metadata),
        }
    }

    pub fn content(content: impl Into<String>, line_number: usize) -> Self {
        Self {
            kind: TokenKind::Content,
            content: content.into(),
            line_number,
            metadata: None,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is_heading(&self) -> bool {
        self.kind == TokenKind::Heading
    }

    pub fn is_content(&self) -> bool {
        self.kind == TokenKind::Content
    }

    /// The heading label, or the body text of a content block.
    pub fn text(&self) -> &str {
        &self.content
    }

    /// 1-based line of the first line of this span in the source text.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn metadata(&self) -> Option<&HeadingMetadata> {
        self.metadata.as_ref()
    }
}
