//! Temporal continuity subsystem
//!
//! Keeps repeated layout solves visually coherent: a sequence policy turns
//! the previous rendered layout plus the data diff into seeding hints and an
//! iteration-budget hint for the next solve. Policies with memory (the
//! stability recall cache) own it per instance, so independent rendering
//! sequences never share state.

pub mod config;
pub mod diff;
pub mod policies;
pub mod state;

pub use config::SequenceConfig;
pub use diff::{analyze, Atom, ChangeAnalysis, DataInstance, Instance, NodeChange, Relation, Tuple};
pub use policies::{
    ChangeEmphasisPolicy, IgnoreHistoryPolicy, RandomPositioningPolicy, StabilityPolicy,
    CHANGE_EMPHASIS, IGNORE_HISTORY, RANDOM_POSITIONING, STABILITY,
};
pub use state::{resolve_viewport, LayoutState, Point, Transform, ViewportBounds};

use indexmap::IndexMap;
use tracing::warn;

use crate::compile::AbstractLayout;

/// Everything a policy may look at for one step.
pub struct PolicyContext<'a> {
    /// Node positions from the previous solve, if any
    pub prior_state: Option<&'a LayoutState>,
    /// The previous data snapshot, if any
    pub prev_instance: Option<&'a dyn DataInstance>,
    /// The current data snapshot
    pub curr_instance: &'a dyn DataInstance,
    /// The abstract layout resolved for the current snapshot, when the
    /// caller has already evaluated it
    pub layout: Option<&'a AbstractLayout>,
    /// Explicit viewport bounds, when the caller knows them
    pub viewport: Option<ViewportBounds>,
}

impl<'a> PolicyContext<'a> {
    /// Ids of the currently-present nodes: the resolved layout's nodes when
    /// available, otherwise the current snapshot's atoms.
    pub fn current_ids(&self) -> Vec<&'a str> {
        match self.layout {
            Some(layout) => layout.nodes.iter().map(|n| n.id.as_str()).collect(),
            None => self
                .curr_instance
                .atoms()
                .iter()
                .map(|a| a.id.as_str())
                .collect(),
        }
    }
}

/// What a policy hands the caller for the next solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDecision {
    /// Seeding hints: the effective prior state to feed the solver. `None`
    /// means a fresh solve with no seeds.
    pub seeds: Option<LayoutState>,
    /// Whether the solver can get away with a reduced iteration budget
    pub reduced_iterations: bool,
}

impl PolicyDecision {
    /// A fresh solve: no seeds, full iteration budget.
    pub fn fresh() -> Self {
        Self::default()
    }
}

/// A strategy converting prior rendered positions plus a data diff into
/// solver-seeding hints for the next layout solve.
pub trait SequencePolicy {
    fn name(&self) -> &'static str;

    fn apply(&mut self, ctx: &PolicyContext<'_>) -> PolicyDecision;
}

type PolicyFactory = Box<dyn Fn(&SequenceConfig) -> Box<dyn SequencePolicy>>;

/// Name → policy factory. Each [`create`](PolicyRegistry::create) call
/// builds a distinct policy instance, so every rendering sequence owns its
/// own memory.
pub struct PolicyRegistry {
    config: SequenceConfig,
    factories: IndexMap<String, PolicyFactory>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::with_config(SequenceConfig::default())
    }

    pub fn with_config(config: SequenceConfig) -> Self {
        let mut registry = Self {
            config,
            factories: IndexMap::new(),
        };
        registry.register(IGNORE_HISTORY, |_| Box::new(IgnoreHistoryPolicy));
        registry.register(STABILITY, |c| Box::new(StabilityPolicy::new(c.clone())));
        registry.register(CHANGE_EMPHASIS, |c| {
            Box::new(ChangeEmphasisPolicy::new(c.clone()))
        });
        registry.register(RANDOM_POSITIONING, |c| {
            Box::new(RandomPositioningPolicy::new(c.clone()))
        });
        registry
    }

    /// Register a custom policy under a name. Re-registering a name
    /// replaces the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&SequenceConfig) -> Box<dyn SequencePolicy> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered policy names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }

    /// Resolve legacy and shorthand names to canonical policy names. The
    /// table is finite and exact; unknown names pass through unchanged.
    pub fn normalize(name: &str) -> &str {
        match name {
            "ignore" | "none" | "fresh" => IGNORE_HISTORY,
            "stable" | "continuity" => STABILITY,
            "emphasis" | "highlight-changes" => CHANGE_EMPHASIS,
            "random" | "scramble" => RANDOM_POSITIONING,
            other => other,
        }
    }

    /// Build a fresh policy instance for a rendering sequence. An unknown
    /// name is non-fatal: it logs and falls back to `ignore-history`.
    pub fn create(&self, name: &str) -> Box<dyn SequencePolicy> {
        let canonical = Self::normalize(name);
        match self.factories.get(canonical) {
            Some(factory) => factory(&self.config),
            None => {
                warn!(requested = name, "unknown sequence policy, falling back to ignore-history");
                Box::new(IgnoreHistoryPolicy)
            }
        }
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
