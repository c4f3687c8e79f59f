use crate::document::DocumentMetadata;
use crate::hierarchy::HierarchyContext;

/// Regenerates clean Markdown from a hierarchy.
///
/// Regular headings become `#` headings sized by level (capped at six).
/// Inline headings become `**Label:**` and absorb their immediate content
/// on the same line. Metadata, when given, is written as YAML front matter.
pub fn to_markdown(hierarchy: &[HierarchyContext], metadata: Option<&DocumentMetadata>) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(metadata) = metadata.filter(|m| !m.is_empty()) {
        lines.push("---".to_string());
        lines.extend(metadata.entries().map(|(key, value)| format!("{key}: {value}")));
        lines.push("---".to_string());
        lines.push(String::new());
    }

    let mut i = 0;
    while i < hierarchy.len() {
        let ctx = &hierarchy[i];
        let token = ctx.token();
        i += 1;

        match token.metadata() {
            Some(meta) if meta.is_inline() => {
                let child = hierarchy
                    .get(i)
                    .filter(|next| next.token().is_content() && next.level() == ctx.level() + 1);
                match child {
                    Some(child) => {
                        lines.push(format!("**{}:** {}", token.text(), child.token().text()));
                        i += 1;
                    }
                    None => lines.push(format!("**{}:**", token.text())),
                }
            }
            Some(_) => {
                let hashes = "#".repeat(ctx.level().min(6));
                lines.push(format!("{hashes} {}", token.text()));
            }
            None => lines.push(token.text().to_string()),
        }
        lines.push(String::new());
    }

    let mut markdown = lines.join("\n").trim_end().to_string();
    markdown.push('\n');
    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::hierarchy::build_hierarchy;
    use crate::parsing::tokenize;
    use pretty_assertions::assert_eq;

    fn regenerate(text: &str, metadata: Option<&DocumentMetadata>) -> String {
        let (tokens, _) = tokenize(text, &ParserConfig::default()).unwrap();
        let (hierarchy, _) = build_hierarchy(&tokens);
        to_markdown(&hierarchy, metadata)
    }

    #[test]
    fn normalizes_heading_styles() {
        let text = "**Visit**\n*Vitals*\nBP fine\n**Name:** Jo\n## DIAGNOSIS\nflu";
        assert_eq!(
            regenerate(text, None),
            "# Visit\n\n## Vitals\n\nBP fine\n\n**Name:** Jo\n\n### DIAGNOSIS\n\nflu\n"
        );
    }

    #[test]
    fn writes_front_matter() {
        let metadata = DocumentMetadata::with_id("abc");
        assert_eq!(regenerate("# T", Some(&metadata)), "---\nid: abc\n---\n\n# T\n");
    }

    #[test]
    fn deep_levels_cap_at_six_hashes() {
        let text = "# 1a\n## 2b\n### 3c\n#### 4d\n##### 5e\n###### 6f\n*seven*";
        let markdown = regenerate(text, None);
        assert!(markdown.ends_with("###### 6f\n\n###### seven\n"), "{markdown}");
    }
}
