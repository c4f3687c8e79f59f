use crate::models::HeadingMetadata;

/// Mutable bookkeeping threaded through one [`HierarchyBuilder::build`] call.
///
/// [`HierarchyBuilder::build`]: super::HierarchyBuilder::build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HierarchyState {
    /// Fixed by the first all-caps heading, reused by every later one.
    pub all_caps_level: Option<usize>,
    pub last_hash_level: Option<usize>,
    pub last_hash_marker_count: Option<u8>,
    pub last_asterisk_level: Option<usize>,
    pub last_asterisk_marker_count: Option<u8>,
    /// Level of the most recent non-inline heading; 0 before any heading.
    pub last_heading_level: usize,
    pub previous_heading_was_hash: bool,
}

/// An open heading on the ancestor stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenHeading {
    pub level: usize,
    pub text: String,
    pub metadata: HeadingMetadata,
}

/// Currently open headings, shallowest first.
#[derive(Debug, Default, Clone)]
pub struct HeadingStack(pub Vec<OpenHeading>);

impl HeadingStack {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn top_level(&self) -> Option<usize> {
        self.0.last().map(|h| h.level)
    }

    /// Closes every heading at `level` or deeper.
    pub fn close_from(&mut self, level: usize) {
        while self.0.last().is_some_and(|h| h.level >= level) {
            self.0.pop();
        }
    }

    pub fn push(&mut self, level: usize, text: &str, metadata: HeadingMetadata) {
        self.0.push(OpenHeading {
            level,
            text: text.to_string(),
            metadata,
        });
    }

    pub fn pop(&mut self) -> Option<OpenHeading> {
        self.0.pop()
    }

    pub fn parents(&self) -> Vec<String> {
        self.0.iter().map(|h| h.text.clone()).collect()
    }

    pub fn parent_types(&self) -> Vec<String> {
        self.0.iter().map(|h| h.metadata.signature()).collect()
    }
}
