use log::debug;

use super::context::HierarchyContext;
use super::state::{HeadingStack, HierarchyState};
use crate::models::{HeadingMetadata, Token};

pub const NO_TOKENS_WARNING: &str = "No tokens provided for hierarchy building";

/// Relative depth of an asterisk run: bold, then bold-italic, then italic.
fn asterisk_order(marker_count: u8) -> Option<u8> {
    match marker_count {
        2 => Some(1),
        3 => Some(2),
        1 => Some(3),
        _ => None,
    }
}

/// Assigns levels and ancestor chains to a token sequence.
///
/// Levels come from a single forward pass. All-caps headings share one level
/// fixed by the first of them. Hash headings move by the difference in `#`
/// count from the previous hash heading. Standalone asterisk headings step
/// one level at a time following [`asterisk_order`]. Inline headings sit one
/// below the open heading and never nest anything beyond their own content.
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyBuilder;

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, tokens: &[Token]) -> (Vec<HierarchyContext>, Vec<String>) {
        let mut warnings = Vec::new();
        if tokens.is_empty() {
            debug!("{NO_TOKENS_WARNING}");
            warnings.push(NO_TOKENS_WARNING.to_string());
            return (Vec::new(), warnings);
        }

        let mut state = HierarchyState::default();
        let mut stack = HeadingStack::default();
        let mut contexts: Vec<HierarchyContext> = Vec::with_capacity(tokens.len());

        for token in tokens {
            match token.metadata() {
                Some(metadata) => {
                    let level = heading_level(metadata, &mut state, &stack);
                    stack.close_from(level);
                    contexts.push(HierarchyContext::new(
                        token.clone(),
                        level,
                        stack.parents(),
                        stack.parent_types(),
                    ));
                    stack.push(level, token.text(), *metadata);
                    if !metadata.is_inline() {
                        state.last_heading_level = level;
                    }
                }
                None => {
                    let level = stack.top_level().map_or(1, |top| top + 1);
                    let follows_inline = contexts
                        .last()
                        .and_then(|prev| prev.token().metadata())
                        .is_some_and(HeadingMetadata::is_inline);
                    contexts.push(HierarchyContext::new(
                        token.clone(),
                        level,
                        stack.parents(),
                        stack.parent_types(),
                    ));
                    if follows_inline {
                        stack.pop();
                    }
                }
            }
        }

        debug!("Built hierarchy for {} tokens", contexts.len());
        (contexts, warnings)
    }
}

/// Convenience wrapper around [`HierarchyBuilder::build`].
pub fn build_hierarchy(tokens: &[Token]) -> (Vec<HierarchyContext>, Vec<String>) {
    HierarchyBuilder::new().build(tokens)
}

fn heading_level(metadata: &HeadingMetadata, state: &mut HierarchyState, stack: &HeadingStack) -> usize {
    if metadata.is_all_caps() {
        all_caps_level(metadata, state, stack)
    } else if metadata.is_hash() {
        hash_level(metadata.marker_count(), state, stack)
    } else if metadata.is_inline() {
        stack.top_level().map_or(1, |top| top + 1)
    } else {
        asterisk_level(metadata.marker_count(), state, stack)
    }
}

fn all_caps_level(metadata: &HeadingMetadata, state: &mut HierarchyState, stack: &HeadingStack) -> usize {
    let level = *state.all_caps_level.get_or_insert(if stack.is_empty() {
        1
    } else {
        state.last_heading_level + 1
    });

    // Asterisk runs restart after an all-caps asterisk heading.
    if metadata.is_asterisk() {
        state.last_asterisk_level = None;
        state.last_asterisk_marker_count = None;
    }
    level
}

fn hash_level(marker_count: u8, state: &mut HierarchyState, stack: &HeadingStack) -> usize {
    let level = match (stack.is_empty(), state.last_hash_level, state.last_hash_marker_count) {
        (true, _, _) => 1,
        (false, Some(prev_level), Some(prev_count)) => {
            offset_level(prev_level, i64::from(marker_count) - i64::from(prev_count))
        }
        _ => state.last_heading_level + 1,
    };

    state.last_hash_level = Some(level);
    state.last_hash_marker_count = Some(marker_count);
    state.previous_heading_was_hash = true;
    level
}

fn asterisk_level(marker_count: u8, state: &mut HierarchyState, stack: &HeadingStack) -> usize {
    let level = if stack.is_empty() {
        1
    } else if state.previous_heading_was_hash {
        state.last_heading_level + 1
    } else if let (Some(prev_level), Some(prev_count)) =
        (state.last_asterisk_level, state.last_asterisk_marker_count)
    {
        match (asterisk_order(marker_count), asterisk_order(prev_count)) {
            (Some(current), Some(previous)) => {
                offset_level(prev_level, i64::from(current.cmp(&previous) as i8))
            }
            // Markerless headings have no place in the ordering.
            _ => prev_level,
        }
    } else {
        state.last_heading_level + 1
    };

    state.last_asterisk_level = Some(level);
    state.last_asterisk_marker_count = Some(marker_count);
    state.previous_heading_was_hash = false;
    level
}

/// Shifts `level` by `delta`, never going above the root.
fn offset_level(level: usize, delta: i64) -> usize {
    let shifted = i64::try_from(level).unwrap_or(i64::MAX).saturating_add(delta);
    usize::try_from(shifted.max(1)).unwrap_or(1)
}
