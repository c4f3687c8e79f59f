use crate::models::Token;

/// A token placed in the document hierarchy.
///
/// `parents` lists ancestor heading texts from the root down to the
/// immediate parent; `parent_types` holds their signatures in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyContext {
    token: Token,
    level: usize,
    parents: Vec<String>,
    parent_types: Vec<String>,
}

impl HierarchyContext {
    pub(crate) fn new(token: Token, level: usize, parents: Vec<String>, parent_types: Vec<String>) -> Self {
        Self {
            token,
            level,
            parents,
            parent_types,
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// 1-based nesting depth.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn parent_types(&self) -> &[String] {
        &self.parent_types
    }
}
