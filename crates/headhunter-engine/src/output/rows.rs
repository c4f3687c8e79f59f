use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::document::DocumentMetadata;
use crate::hierarchy::HierarchyContext;

/// One content block with its place in the hierarchy, for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRow {
    pub id: String,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
    pub start_line: usize,
    pub level: usize,
    /// Length of the content in characters.
    pub length: usize,
    pub parents: Vec<String>,
    pub parent_types: Vec<String>,
    pub content: String,
}

/// Flattens a hierarchy into one row per content token; headings survive
/// only as `parents` of the rows beneath them.
pub fn to_rows(hierarchy: &[HierarchyContext], doc_id: &str, metadata: Option<&DocumentMetadata>) -> Vec<ContentRow> {
    let fields = metadata.map(|m| m.fields.clone()).unwrap_or_default();
    hierarchy
        .iter()
        .filter(|ctx| ctx.token().is_content())
        .map(|ctx| ContentRow {
            id: doc_id.to_string(),
            metadata: fields.clone(),
            start_line: ctx.token().line_number(),
            level: ctx.level(),
            length: ctx.token().text().chars().count(),
            parents: ctx.parents().to_vec(),
            parent_types: ctx.parent_types().to_vec(),
            content: ctx.token().text().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::hierarchy::build_hierarchy;
    use crate::parsing::tokenize;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn one_row_per_content_block() {
        let (tokens, _) = tokenize("# Visit\n## Plan\nrest é\n**Dose:** 5mg", &ParserConfig::default()).unwrap();
        let (hierarchy, _) = build_hierarchy(&tokens);
        let mut metadata = DocumentMetadata::with_id("d1");
        metadata.insert("clinic", "north");

        let rows = to_rows(&hierarchy, "d1", Some(&metadata));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parents, vec!["Visit".to_string(), "Plan".to_string()]);
        assert_eq!(rows[0].length, 6);
        assert_eq!(rows[1].parent_types, vec!["#1", "#2", "*2-inline"]);

        let value = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(value["clinic"], json!("north"));
        assert_eq!(value["content"], json!("5mg"));
        assert_eq!(value["level"], json!(4));
    }
}
