pub mod builder;
pub mod context;
pub mod state;

pub use builder::{HierarchyBuilder, build_hierarchy};
pub use context::HierarchyContext;
pub use state::HierarchyState;
