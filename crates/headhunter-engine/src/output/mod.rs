//! Renderers for parsed hierarchies.

pub mod markdown;
pub mod rows;
pub mod sections;
pub mod tree;

pub use markdown::to_markdown;
pub use rows::{ContentRow, to_rows};
pub use sections::{DocumentTree, MetadataView, SectionNode, to_sections};
pub use tree::to_tree_string;
