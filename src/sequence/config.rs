//! Configuration for the temporal continuity subsystem

use super::state::ViewportBounds;

/// Tunables shared by the sequence policies.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// How many whole steps a node may be absent and still be recalled at
    /// its last known position by the stability policy
    pub max_reappearance_gap_steps: u64,

    /// Upper bound on stability recall-cache entries
    pub recall_cache_capacity: usize,

    /// Jitter radius for a changed node at minimal change intensity
    pub jitter_base_radius: f64,

    /// Jitter radius once change intensity reaches `jitter_full_intensity`
    pub jitter_max_radius: f64,

    /// Intensity (in diff units) at which the jitter radius saturates
    pub jitter_full_intensity: f64,

    /// Distance of the center-ward nudge applied when viewport clamping
    /// would cancel a changed node's movement entirely
    pub clamp_nudge: f64,

    /// Minimum padding around the prior-state bounding box when deriving
    /// viewport bounds
    pub viewport_padding_min: f64,

    /// Padding as a fraction of the larger prior-state dimension
    pub viewport_padding_ratio: f64,

    /// Viewport used when neither explicit bounds nor prior positions exist
    pub default_viewport: ViewportBounds,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_reappearance_gap_steps: 2,
            recall_cache_capacity: 5000,
            jitter_base_radius: 36.0,
            jitter_max_radius: 66.0,
            jitter_full_intensity: 4.0,
            clamp_nudge: 24.0,
            viewport_padding_min: 60.0,
            viewport_padding_ratio: 0.15,
            default_viewport: ViewportBounds::new(0.0, 0.0, 800.0, 600.0),
        }
    }
}

impl SequenceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reappearance gap for stability recall
    pub fn with_reappearance_gap(mut self, steps: u64) -> Self {
        self.max_reappearance_gap_steps = steps;
        self
    }

    /// Set the recall-cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.recall_cache_capacity = capacity;
        self
    }

    /// Set the jitter radius range
    pub fn with_jitter_radii(mut self, base: f64, max: f64) -> Self {
        self.jitter_base_radius = base;
        self.jitter_max_radius = max;
        self
    }

    /// Set the fallback viewport box
    pub fn with_default_viewport(mut self, viewport: ViewportBounds) -> Self {
        self.default_viewport = viewport;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequenceConfig::default();
        assert_eq!(config.max_reappearance_gap_steps, 2);
        assert_eq!(config.recall_cache_capacity, 5000);
        assert_eq!(config.jitter_base_radius, 36.0);
        assert_eq!(config.jitter_max_radius, 66.0);
        assert_eq!(config.clamp_nudge, 24.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SequenceConfig::new()
            .with_reappearance_gap(4)
            .with_cache_capacity(100);
        assert_eq!(config.max_reappearance_gap_steps, 4);
        assert_eq!(config.recall_cache_capacity, 100);
    }
}
