//! Configuration options for shape validation

// ============================================================================
// Extra Field Handling
// ============================================================================

/// How to handle input keys that the shape does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraFields {
    /// Keep extra keys in the output untouched (default)
    #[default]
    Allow,
    /// Drop extra keys from the output
    Ignore,
    /// Report every extra key as an error
    Forbid,
}

impl ExtraFields {
    /// Whether extra keys survive into the output
    pub fn keeps_extra(self) -> bool {
        matches!(self, Self::Allow)
    }
}
