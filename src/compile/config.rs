//! Configuration for the constraint compiler

/// Configuration options for compiling an abstract layout into solver
/// primitives.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Padding inside ordinary groups
    pub group_padding: f64,

    /// Padding inside placeholder groups that collect disconnected nodes
    pub disconnected_group_padding: f64,

    /// Name prefix marking a group as a disconnected-node placeholder
    pub disconnected_name_marker: String,

    /// Separator joining the names of deduplicated groups
    pub merged_name_separator: String,

    /// When set, alignment constraints get a tiny deterministic gap (seeded
    /// by the ordered node-id pair) instead of exactly zero. Workaround for
    /// solvers that degenerate on exact-equality constraints.
    pub alignment_nudge: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            group_padding: 10.0,
            disconnected_group_padding: 30.0,
            disconnected_name_marker: "_disconnected".to_string(),
            merged_name_separator: " + ".to_string(),
            alignment_nudge: false,
        }
    }
}

impl CompileConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordinary group padding
    pub fn with_group_padding(mut self, padding: f64) -> Self {
        self.group_padding = padding;
        self
    }

    /// Set the disconnected-placeholder group padding
    pub fn with_disconnected_padding(mut self, padding: f64) -> Self {
        self.disconnected_group_padding = padding;
        self
    }

    /// Set the name prefix that marks disconnected-node placeholder groups
    pub fn with_disconnected_marker(mut self, marker: impl Into<String>) -> Self {
        self.disconnected_name_marker = marker.into();
        self
    }

    /// Enable or disable the deterministic alignment-gap nudge
    pub fn with_alignment_nudge(mut self, enabled: bool) -> Self {
        self.alignment_nudge = enabled;
        self
    }
}
