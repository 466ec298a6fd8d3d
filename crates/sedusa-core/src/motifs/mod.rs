mod library;
pub mod pattern;

pub use library::MotifLibrary;
pub use pattern::{Motion, PatternDefinition, PatternKind, SubSegment};

/// Name-to-pattern lookup. A miss is a normal condition, not an error.
pub trait PatternLookup: Send + Sync {
    fn get_pattern(&self, name: &str) -> Option<&PatternDefinition>;

    /// Every selectable name, in a stable order.
    fn pattern_names(&self) -> Vec<String>;
}
