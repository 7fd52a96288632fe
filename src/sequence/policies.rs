//! The sequence policy catalogue
//!
//! Policies convert the previous rendered layout plus the instance diff into
//! solver seeding hints. Everything here is deterministic under identical
//! inputs except `random-positioning`, which is a stress baseline by design.

use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use super::config::SequenceConfig;
use super::diff::analyze;
use super::diff::NodeChange;
use super::state::{resolve_viewport, LayoutState, Point, ViewportBounds};
use super::{PolicyContext, PolicyDecision, SequencePolicy};

pub const IGNORE_HISTORY: &str = "ignore-history";
pub const STABILITY: &str = "stability";
pub const CHANGE_EMPHASIS: &str = "change-emphasis";
pub const RANDOM_POSITIONING: &str = "random-positioning";

/// Map a seeded hash of the given parts onto [0, 1).
fn seeded_unit(parts: &[&str]) -> f64 {
    let mut hasher = FxHasher::default();
    for part in parts {
        part.hash(&mut hasher);
    }
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64
}

/// Baseline policy: no seeds, full iteration budget, no memory.
#[derive(Debug, Default)]
pub struct IgnoreHistoryPolicy;

impl SequencePolicy for IgnoreHistoryPolicy {
    fn name(&self) -> &'static str {
        IGNORE_HISTORY
    }

    fn apply(&mut self, _ctx: &PolicyContext<'_>) -> PolicyDecision {
        PolicyDecision::fresh()
    }
}

struct RecallEntry {
    position: Point,
    step: u64,
}

/// Continuity policy: every currently-present node keeps its prior
/// position, and a bounded recall cache lets a node absent for up to
/// `max_reappearance_gap_steps` whole steps reappear where it was last
/// seen. A recall refreshes the entry, so a node that flickers in and out
/// every step stays recallable indefinitely — accepted sharp edge.
///
/// An empty prior state is a deliberate fresh start: it resets the cache
/// and the step counter, it is not a leak.
///
/// The cache lives on the policy instance. Two independent rendering
/// sequences must each own their own `StabilityPolicy`.
pub struct StabilityPolicy {
    config: SequenceConfig,
    cache: FxHashMap<String, RecallEntry>,
    step: u64,
}

impl StabilityPolicy {
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            config,
            cache: FxHashMap::default(),
            step: 0,
        }
    }

    /// Number of cached recall entries, for capacity tests and diagnostics.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn evict(&mut self) {
        let cap = self.config.recall_cache_capacity;
        if self.cache.len() <= cap {
            return;
        }

        // Entries too old to ever be recalled go first.
        let gap = self.config.max_reappearance_gap_steps;
        let step = self.step;
        self.cache.retain(|_, entry| step - entry.step <= gap);

        if self.cache.len() > cap {
            let mut entries: Vec<(String, u64)> = self
                .cache
                .iter()
                .map(|(id, entry)| (id.clone(), entry.step))
                .collect();
            entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            for (id, _) in entries.into_iter().take(self.cache.len() - cap) {
                self.cache.remove(&id);
            }
        }
    }
}

impl SequencePolicy for StabilityPolicy {
    fn name(&self) -> &'static str {
        STABILITY
    }

    fn apply(&mut self, ctx: &PolicyContext<'_>) -> PolicyDecision {
        let prior = match ctx.prior_state {
            Some(state) if !state.is_empty() => state,
            _ => {
                self.cache.clear();
                self.step = 0;
                return PolicyDecision::fresh();
            }
        };

        self.step += 1;
        for (id, point) in &prior.positions {
            self.cache.insert(
                id.clone(),
                RecallEntry {
                    position: *point,
                    step: self.step,
                },
            );
        }

        let mut seeds = LayoutState {
            positions: Default::default(),
            transform: prior.transform,
        };
        for id in ctx.current_ids() {
            if let Some(point) = prior.get(id) {
                seeds.positions.insert(id.to_string(), point);
            } else if let Some(entry) = self.cache.get_mut(id) {
                // Reappearance within the allowed gap recovers the last
                // known position and refreshes the entry.
                if self.step - entry.step <= self.config.max_reappearance_gap_steps + 1 {
                    entry.step = self.step;
                    seeds.positions.insert(id.to_string(), entry.position);
                }
            }
        }

        self.evict();

        if seeds.is_empty() {
            PolicyDecision::fresh()
        } else {
            PolicyDecision {
                seeds: Some(seeds),
                reduced_iterations: true,
            }
        }
    }
}

/// Emphasis policy: stable nodes keep their prior position, changed nodes
/// get a reproducible jitter whose radius grows with change intensity, new
/// nodes are placed freely by the solver. No cross-step recall: a node
/// absent one step and back the next counts as new.
pub struct ChangeEmphasisPolicy {
    config: SequenceConfig,
}

impl ChangeEmphasisPolicy {
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    fn jitter(
        &self,
        id: &str,
        signature: &str,
        intensity: u32,
        origin: Point,
        viewport: ViewportBounds,
    ) -> Point {
        let angle = TAU * seeded_unit(&[id, signature, "angle"]);
        let scale = 0.85 + 0.30 * seeded_unit(&[id, signature, "radius"]);
        let saturation =
            (f64::from(intensity) / self.config.jitter_full_intensity).min(1.0);
        let radius = (self.config.jitter_base_radius
            + (self.config.jitter_max_radius - self.config.jitter_base_radius) * saturation)
            * scale;

        let target = Point::new(
            origin.x + radius * angle.cos(),
            origin.y + radius * angle.sin(),
        );
        let clamped = viewport.clamp(target);
        if clamped.distance_to(origin) > 1e-9 {
            return clamped;
        }

        // Clamping cancelled the whole offset (origin sits on the viewport
        // edge and the jitter pointed outward). Nudge toward the center so
        // the change stays visible.
        let center = viewport.center();
        let distance = origin.distance_to(center);
        let (dx, dy) = if distance > 1e-9 {
            (
                (center.x - origin.x) / distance,
                (center.y - origin.y) / distance,
            )
        } else {
            let fallback = TAU * seeded_unit(&[id, signature, "nudge"]);
            (fallback.cos(), fallback.sin())
        };
        viewport.clamp(Point::new(
            origin.x + dx * self.config.clamp_nudge,
            origin.y + dy * self.config.clamp_nudge,
        ))
    }
}

impl SequencePolicy for ChangeEmphasisPolicy {
    fn name(&self) -> &'static str {
        CHANGE_EMPHASIS
    }

    fn apply(&mut self, ctx: &PolicyContext<'_>) -> PolicyDecision {
        let prior = match ctx.prior_state {
            Some(state) if !state.is_empty() => state,
            _ => return PolicyDecision::fresh(),
        };
        let prev = match ctx.prev_instance {
            Some(instance) => instance,
            None => return PolicyDecision::fresh(),
        };

        let analysis = analyze(prev, ctx.curr_instance);
        let viewport = resolve_viewport(ctx.viewport, Some(prior), &self.config);

        let mut seeds = LayoutState {
            positions: Default::default(),
            transform: prior.transform,
        };
        for id in ctx.current_ids() {
            match analysis.classification(id) {
                Some(NodeChange::Stable) => {
                    if let Some(point) = prior.get(id) {
                        seeds.positions.insert(id.to_string(), point);
                    }
                }
                Some(NodeChange::Changed { intensity }) => {
                    // A changed node with no prior position is effectively
                    // new and placed freely.
                    if let Some(origin) = prior.get(id) {
                        let point = self.jitter(
                            id,
                            &analysis.signature,
                            intensity,
                            origin,
                            viewport,
                        );
                        seeds.positions.insert(id.to_string(), point);
                    }
                }
                Some(NodeChange::New) | Some(NodeChange::Removed) | None => {}
            }
        }

        if seeds.is_empty() {
            PolicyDecision::fresh()
        } else {
            PolicyDecision {
                seeds: Some(seeds),
                reduced_iterations: true,
            }
        }
    }
}

/// Stress baseline: every current node gets a uniformly random position
/// inside the resolved viewport. Non-deterministic by design.
pub struct RandomPositioningPolicy {
    config: SequenceConfig,
}

impl RandomPositioningPolicy {
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }
}

impl SequencePolicy for RandomPositioningPolicy {
    fn name(&self) -> &'static str {
        RANDOM_POSITIONING
    }

    fn apply(&mut self, ctx: &PolicyContext<'_>) -> PolicyDecision {
        let viewport = resolve_viewport(ctx.viewport, ctx.prior_state, &self.config);

        let mut seeds = LayoutState {
            positions: Default::default(),
            transform: ctx.prior_state.and_then(|s| s.transform),
        };
        for id in ctx.current_ids() {
            seeds.positions.insert(
                id.to_string(),
                Point::new(
                    viewport.min_x + rand::random::<f64>() * viewport.width(),
                    viewport.min_y + rand::random::<f64>() * viewport.height(),
                ),
            );
        }

        PolicyDecision {
            seeds: Some(seeds),
            reduced_iterations: false,
        }
    }
}
