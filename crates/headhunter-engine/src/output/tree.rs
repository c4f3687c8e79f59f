use std::collections::HashMap;

use log::{debug, warn};

use crate::document::DocumentMetadata;
use crate::hierarchy::HierarchyContext;

const RULE_WIDTH: usize = 80;

/// Renders the headings of a hierarchy as an ASCII tree.
///
/// ```text
/// Document Structure
/// ====
/// Title [#1] (line 1)
///     ├── Sub [#2] (line 2)
///     └── Other [#2] (line 5)
/// ```
pub fn to_tree_string(
    hierarchy: &[HierarchyContext],
    show_line_numbers: bool,
    show_type: bool,
    metadata: Option<&DocumentMetadata>,
) -> String {
    let headings: Vec<&HierarchyContext> = hierarchy.iter().filter(|c| c.token().is_heading()).collect();
    let mut lines: Vec<String> = Vec::new();

    if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
        lines.push("Metadata".to_string());
        lines.push("-".repeat(RULE_WIDTH));
        lines.extend(metadata.entries().map(|(key, value)| format!("{key}: {value}")));
        lines.push(String::new());
    }

    if headings.is_empty() {
        warn!("No headings found in hierarchy for tree output");
        lines.push("No headings found".to_string());
        return lines.join("\n");
    }
    debug!("Rendering {} headings as a tree", headings.len());

    lines.push("Document Structure".to_string());
    lines.push("=".repeat(RULE_WIDTH));

    let mut level_has_more: HashMap<usize, bool> = HashMap::new();
    for (i, ctx) in headings.iter().enumerate() {
        let level = ctx.level();
        let has_more_siblings = headings[i + 1..]
            .iter()
            .map(|next| next.level())
            .take_while(|&next| next >= level)
            .any(|next| next == level);
        level_has_more.insert(level, has_more_siblings);

        let mut prefix = String::new();
        for ancestor in 1..level {
            if level_has_more.get(&ancestor).copied().unwrap_or(false) {
                prefix.push_str("│   ");
            } else {
                prefix.push_str("    ");
            }
        }
        if level > 1 {
            prefix.push_str(if has_more_siblings { "├── " } else { "└── " });
        }

        let token = ctx.token();
        let mut label = token.text().to_string();
        if show_type && let Some(meta) = token.metadata() {
            label.push_str(&format!(" [{}]", meta.signature()));
        }
        if show_line_numbers {
            label.push_str(&format!(" (line {})", token.line_number()));
        }
        lines.push(format!("{prefix}{label}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::hierarchy::build_hierarchy;
    use crate::parsing::tokenize;
    use pretty_assertions::assert_eq;

    fn hierarchy(text: &str) -> Vec<HierarchyContext> {
        let (tokens, _) = tokenize(text, &ParserConfig::default()).unwrap();
        build_hierarchy(&tokens).0
    }

    #[test]
    fn draws_guides_for_open_siblings() {
        let ctx = hierarchy("# Root\n## First\n### Leaf\n## Second\n# Other");
        let expected = [
            "Document Structure",
            "=".repeat(80).as_str(),
            "Root [#1] (line 1)",
            "│   ├── First [#2] (line 2)",
            "│   │   └── Leaf [#3] (line 3)",
            "│   └── Second [#2] (line 4)",
            "Other [#1] (line 5)",
        ]
        .join("\n");
        assert_eq!(to_tree_string(&ctx, true, true, None), expected);
    }

    #[test]
    fn annotations_can_be_hidden() {
        let ctx = hierarchy("# Root\n## Child");
        let tree = to_tree_string(&ctx, false, false, None);
        assert!(tree.ends_with("Root\n    └── Child"), "{tree}");
    }

    #[test]
    fn metadata_block_and_empty_document() {
        let mut metadata = DocumentMetadata::with_id("note-7");
        metadata.insert("author", "dr who");
        let tree = to_tree_string(&hierarchy("just text"), true, true, Some(&metadata));
        let expected = ["Metadata", "-".repeat(80).as_str(), "id: note-7", "author: dr who", "", "No headings found"].join("\n");
        assert_eq!(tree, expected);
    }
}
