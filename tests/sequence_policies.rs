//! Integration tests for the temporal continuity subsystem: policies are
//! driven through several steps the way a renderer would, and their hints
//! are checked for continuity and reproducibility.

use kinegraph::sequence::{
    DataInstance, Instance, LayoutState, PolicyContext, PolicyRegistry, Point, SequenceConfig,
    SequencePolicy, StabilityPolicy, ViewportBounds, STABILITY,
};

fn ctx<'a>(
    prior: Option<&'a LayoutState>,
    prev: Option<&'a Instance>,
    curr: &'a Instance,
) -> PolicyContext<'a> {
    PolicyContext {
        prior_state: prior,
        prev_instance: prev.map(|i| i as &dyn DataInstance),
        curr_instance: curr,
        layout: None,
        viewport: None,
    }
}

#[test]
fn test_ignore_history_is_pure() {
    let registry = PolicyRegistry::new();
    let curr = Instance::new().with_atoms(&["a", "b"]);
    let prior = LayoutState::new().with_position("a", 1.0, 2.0);

    let mut policy = registry.create("ignore-history");
    let first = policy.apply(&ctx(Some(&prior), None, &curr));
    let second = policy.apply(&ctx(Some(&prior), None, &curr));
    assert_eq!(first, second);
    assert!(first.seeds.is_none());
    assert!(!first.reduced_iterations);
}

#[test]
fn test_stability_sequence_across_steps() {
    let registry = PolicyRegistry::new();
    let mut policy = registry.create(STABILITY);

    // Step 1: both nodes rendered.
    let prior = LayoutState::new()
        .with_position("a", 100.0, 50.0)
        .with_position("b", 200.0, 80.0);
    let curr = Instance::new().with_atoms(&["a", "b"]);
    let seeds = policy
        .apply(&ctx(Some(&prior), None, &curr))
        .seeds
        .unwrap();
    assert_eq!(seeds.get("a"), Some(Point::new(100.0, 50.0)));

    // Step 2: a disappears from the data.
    let prior = LayoutState::new().with_position("b", 200.0, 80.0);
    let curr = Instance::new().with_atoms(&["b"]);
    let seeds = policy
        .apply(&ctx(Some(&prior), None, &curr))
        .seeds
        .unwrap();
    assert_eq!(seeds.get("a"), None);

    // Step 3: a reappears after one absent step and recovers its spot.
    let curr = Instance::new().with_atoms(&["a", "b"]);
    let seeds = policy
        .apply(&ctx(Some(&prior), None, &curr))
        .seeds
        .unwrap();
    assert_eq!(seeds.get("a"), Some(Point::new(100.0, 50.0)));
    assert_eq!(seeds.get("b"), Some(Point::new(200.0, 80.0)));
}

#[test]
fn test_stability_cache_shrinks_back_to_capacity() {
    let config = SequenceConfig::default();
    let cap = config.recall_cache_capacity;
    let mut policy = StabilityPolicy::new(config);

    // One step with cap + 1 distinct rendered nodes overflows the cache.
    let mut prior = LayoutState::new();
    let mut ids = Vec::new();
    for i in 0..=cap {
        let id = format!("n{i}");
        prior = prior.with_position(&id, i as f64, 0.0);
        ids.push(id);
    }
    let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    let curr = Instance::new().with_atoms(&id_refs);

    let decision = policy.apply(&ctx(Some(&prior), None, &curr));
    assert_eq!(decision.seeds.unwrap().positions.len(), cap + 1);
    // Eviction brought the cache back to the cap; every entry was still
    // inside the recall window, so capacity alone forced the removals.
    assert_eq!(policy.cache_len(), cap);
}

#[test]
fn test_change_emphasis_is_deterministic_across_instances() {
    let registry = PolicyRegistry::new();
    let prior = LayoutState::new()
        .with_position("a", 400.0, 300.0)
        .with_position("b", 420.0, 320.0);
    let prev = Instance::new()
        .with_atoms(&["a", "b"])
        .with_relation("likes", &[&["a", "b"]]);
    let curr = Instance::new()
        .with_atoms(&["a", "b"])
        .with_relation("likes", &[&["b", "a"]]);

    let mut first = registry.create("change-emphasis");
    let mut second = registry.create("change-emphasis");
    let one = first.apply(&ctx(Some(&prior), Some(&prev), &curr));
    let two = second.apply(&ctx(Some(&prior), Some(&prev), &curr));
    assert_eq!(one, two);

    let seeds = one.seeds.unwrap();
    // Both nodes' fingerprints changed; both moved away from their priors.
    assert!(seeds.get("a").unwrap().distance_to(Point::new(400.0, 300.0)) >= 30.0);
    assert!(seeds.get("b").unwrap().distance_to(Point::new(420.0, 320.0)) >= 30.0);
}

#[test]
fn test_change_emphasis_hints_respect_viewport() {
    let registry = PolicyRegistry::new();
    let viewport = ViewportBounds::new(0.0, 0.0, 300.0, 200.0);
    let prior = LayoutState::new()
        .with_position("a", 299.0, 199.0)
        .with_position("b", 1.0, 1.0);
    let prev = Instance::new()
        .with_atoms(&["a", "b"])
        .with_relation("r", &[&["a", "b"]]);
    let curr = Instance::new().with_atoms(&["a", "b"]);

    let mut policy = registry.create("change-emphasis");
    let mut context = ctx(Some(&prior), Some(&prev), &curr);
    context.viewport = Some(viewport);
    let seeds = policy.apply(&context).seeds.unwrap();
    for point in seeds.positions.values() {
        assert!(viewport.contains(*point), "hint {point:?} escaped viewport");
    }
}

#[test]
fn test_reappearing_node_is_new_to_change_emphasis() {
    let registry = PolicyRegistry::new();
    // b was absent from the previous snapshot, so change-emphasis treats
    // it as new even though the stability policy could have recalled it.
    let prior = LayoutState::new().with_position("a", 10.0, 10.0);
    let prev = Instance::new().with_atoms(&["a"]);
    let curr = Instance::new().with_atoms(&["a", "b"]);

    let mut policy = registry.create("change-emphasis");
    let seeds = policy
        .apply(&ctx(Some(&prior), Some(&prev), &curr))
        .seeds
        .unwrap();
    assert!(seeds.get("a").is_some());
    assert!(seeds.get("b").is_none());
}

#[test]
fn test_random_positioning_fills_default_viewport() {
    let registry = PolicyRegistry::new();
    let config = SequenceConfig::default();
    let curr = Instance::new().with_atoms(&["a", "b", "c", "d"]);

    let mut policy = registry.create("random");
    let seeds = policy.apply(&ctx(None, None, &curr)).seeds.unwrap();
    assert_eq!(seeds.positions.len(), 4);
    for point in seeds.positions.values() {
        assert!(config.default_viewport.contains(*point));
    }
}

#[test]
fn test_unknown_policy_name_falls_back() {
    let registry = PolicyRegistry::new();
    let policy = registry.create("time-travel");
    assert_eq!(policy.name(), "ignore-history");
}

#[test]
fn test_legacy_alias_resolves() {
    let registry = PolicyRegistry::new();
    assert_eq!(registry.create("stable").name(), "stability");
    assert_eq!(registry.create("highlight-changes").name(), "change-emphasis");
}
