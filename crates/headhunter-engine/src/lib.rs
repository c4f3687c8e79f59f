pub mod config;
pub mod document;
pub mod error;
pub mod hierarchy;
pub mod matching;
pub mod models;
pub mod output;
pub mod parsing;

// Re-export key types for easier usage
pub use config::{ConfigValue, ParserConfig};
pub use document::{
    BatchError, DocumentInput, DocumentMetadata, MatchOptions, ParsedBatch, ParsedDocument, process_batch,
    process_text,
};
pub use error::{ConfigError, MetadataError, ParseError, ParseErrorKind};
pub use hierarchy::{HierarchyBuilder, HierarchyContext, build_hierarchy};
pub use matching::{ExtractionMethod, HeadingMatcher, MatchOutcome, MatchStatistics, MatchedHeading, match_headings};
pub use models::{ExtractionPosition, HeadingMetadata, Marker, TextCase, Token, TokenKind};
pub use output::{ContentRow, DocumentTree, SectionNode, to_markdown, to_rows, to_sections, to_tree_string};
pub use parsing::{Tokenizer, tokenize};
