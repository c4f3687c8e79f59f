use log::{debug, warn};
use serde::Serialize;

use crate::document::DocumentMetadata;
use crate::hierarchy::HierarchyContext;
use crate::matching::MatchStatistics;
use crate::models::{ExtractionPosition, HeadingMetadata, TextCase};

/// Serializable view of [`HeadingMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataView {
    pub marker: Option<&'static str>,
    pub marker_count: u8,
    pub case: TextCase,
    pub is_inline: bool,
    pub is_extracted: bool,
    pub extraction_position: Option<ExtractionPosition>,
    pub signature: String,
}

impl From<&HeadingMetadata> for MetadataView {
    fn from(meta: &HeadingMetadata) -> Self {
        Self {
            marker: meta.marker().symbol(),
            marker_count: meta.marker_count(),
            case: meta.case(),
            is_inline: meta.is_inline(),
            is_extracted: meta.is_extracted(),
            extraction_position: meta.extraction_position(),
            signature: meta.signature(),
        }
    }
}

/// A node in the nested document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionNode {
    Heading {
        text: String,
        level: usize,
        line_number: usize,
        metadata: Option<MetadataView>,
        sections: Vec<SectionNode>,
    },
    Content {
        text: String,
        level: usize,
        line_number: usize,
    },
}

impl SectionNode {
    fn children_mut(&mut self) -> Option<&mut Vec<SectionNode>> {
        match self {
            SectionNode::Heading { sections, .. } => Some(sections),
            SectionNode::Content { .. } => None,
        }
    }
}

/// Root of a nested document: metadata plus top-level sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTree {
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_statistics: Option<MatchStatistics>,
    pub sections: Vec<SectionNode>,
}

/// Nests a flat hierarchy: each heading collects the tokens that follow it
/// at a deeper level.
pub fn to_sections(
    hierarchy: &[HierarchyContext],
    metadata: DocumentMetadata,
    match_statistics: Option<MatchStatistics>,
) -> DocumentTree {
    if hierarchy.is_empty() {
        warn!("Hierarchy is empty; returning only metadata");
    } else {
        debug!("Converting hierarchy with {} tokens to sections", hierarchy.len());
    }

    let mut root = Vec::new();
    let mut open: Vec<(usize, SectionNode)> = Vec::new();

    for ctx in hierarchy {
        let level = ctx.level();
        while open.last().is_some_and(|(open_level, _)| *open_level >= level) {
            close_section(&mut open, &mut root);
        }

        let token = ctx.token();
        match token.metadata() {
            Some(meta) => open.push((
                level,
                SectionNode::Heading {
                    text: token.text().to_string(),
                    level,
                    line_number: token.line_number(),
                    metadata: Some(MetadataView::from(meta)),
                    sections: Vec::new(),
                },
            )),
            None => {
                let item = SectionNode::Content {
                    text: token.text().to_string(),
                    level,
                    line_number: token.line_number(),
                };
                attach(&mut open, &mut root, item);
            }
        }
    }
    while !open.is_empty() {
        close_section(&mut open, &mut root);
    }

    DocumentTree {
        metadata,
        match_statistics,
        sections: root,
    }
}

fn close_section(open: &mut Vec<(usize, SectionNode)>, root: &mut Vec<SectionNode>) {
    if let Some((_, node)) = open.pop() {
        attach(open, root, node);
    }
}

fn attach(open: &mut [(usize, SectionNode)], root: &mut Vec<SectionNode>, node: SectionNode) {
    match open.last_mut().and_then(|(_, parent)| parent.children_mut()) {
        Some(children) => children.push(node),
        None => root.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::hierarchy::build_hierarchy;
    use crate::parsing::tokenize;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(text: &str) -> DocumentTree {
        let (tokens, _) = tokenize(text, &ParserConfig::default()).unwrap();
        let (hierarchy, _) = build_hierarchy(&tokens);
        to_sections(&hierarchy, DocumentMetadata::with_id("doc-1"), None)
    }

    #[test]
    fn nests_sections_by_level() {
        let doc = tree("intro\n# Title\n## Sub\nbody\n# Next");
        let shape: Vec<_> = doc
            .sections
            .iter()
            .map(|node| match node {
                SectionNode::Heading { text, sections, .. } => (text.as_str(), sections.len()),
                SectionNode::Content { text, .. } => (text.as_str(), 0),
            })
            .collect();
        assert_eq!(shape, vec![("intro", 0), ("Title", 1), ("Next", 0)]);
    }

    #[test]
    fn serializes_with_type_tags_and_metadata() {
        let doc = tree("# Title\nbody");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "doc-1",
                "sections": [{
                    "type": "heading",
                    "text": "Title",
                    "level": 1,
                    "line_number": 1,
                    "metadata": {
                        "marker": "#",
                        "marker_count": 1,
                        "case": "title_case",
                        "is_inline": false,
                        "is_extracted": false,
                        "extraction_position": null,
                        "signature": "#1"
                    },
                    "sections": [{
                        "type": "content",
                        "text": "body",
                        "level": 2,
                        "line_number": 2
                    }]
                }]
            })
        );
    }

    #[test]
    fn empty_hierarchy_keeps_metadata() {
        let doc = to_sections(&[], DocumentMetadata::with_id("x"), None);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.metadata.id(), Some("x"));
    }
}
