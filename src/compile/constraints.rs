//! Translation of abstract spatial constraints into separation constraints
//!
//! Gaps are measured center-to-center, so each translation folds in half the
//! extent of both nodes on the constrained axis. Any node a constraint
//! touches loses its upstream pin flag: once a constraint governs a node,
//! the solver must be free to move it.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use super::config::CompileConfig;
use super::error::CompileError;
use super::types::{Axis, Constraint, Node, SeparationConstraint};

/// Compile one abstract constraint into a solver separation constraint.
///
/// Fails with [`CompileError::DanglingNodeReference`] before any geometry is
/// computed when the constraint names a node absent from the layout.
pub fn compile_constraint(
    constraint: &Constraint,
    node_index: &IndexMap<String, usize>,
    nodes: &mut [Node],
    config: &CompileConfig,
) -> Result<SeparationConstraint, CompileError> {
    let [first, second] = constraint.referenced_ids();
    let a = lookup(node_index, first, constraint)?;
    let b = lookup(node_index, second, constraint)?;

    nodes[a].pinned = false;
    nodes[b].pinned = false;

    let separation = match constraint {
        Constraint::LeftOf { min_distance, .. } => SeparationConstraint {
            axis: Axis::X,
            left: a,
            right: b,
            gap: min_distance + nodes[a].width / 2.0 + nodes[b].width / 2.0,
            equality: false,
        },
        Constraint::Above { min_distance, .. } => SeparationConstraint {
            axis: Axis::Y,
            left: a,
            right: b,
            gap: min_distance + nodes[a].height / 2.0 + nodes[b].height / 2.0,
            equality: false,
        },
        Constraint::Aligned { axis, .. } => SeparationConstraint {
            axis: *axis,
            left: a,
            right: b,
            gap: if config.alignment_nudge {
                alignment_nudge(first, second)
            } else {
                0.0
            },
            equality: true,
        },
    };

    Ok(separation)
}

fn lookup(
    node_index: &IndexMap<String, usize>,
    id: &str,
    constraint: &Constraint,
) -> Result<usize, CompileError> {
    node_index
        .get(id)
        .copied()
        .ok_or_else(|| CompileError::dangling(id, describe(constraint)))
}

fn describe(constraint: &Constraint) -> String {
    match constraint {
        Constraint::LeftOf { left, right, .. } => format!("constraint leftOf({left}, {right})"),
        Constraint::Above { top, bottom, .. } => format!("constraint above({top}, {bottom})"),
        Constraint::Aligned { axis, a, b } => format!("constraint aligned({axis:?}, {a}, {b})"),
    }
}

/// Tiny sub-pixel gap seeded by the ordered node-id pair. Breaks exact
/// equality for solvers that degenerate on it, without sacrificing
/// reproducibility.
fn alignment_nudge(a: &str, b: &str) -> f64 {
    let mut hasher = FxHasher::default();
    a.hash(&mut hasher);
    b.hash(&mut hasher);
    // Map the hash onto [0, 1e-3).
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64 * 1e-3
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> (IndexMap<String, usize>, Vec<Node>) {
        let nodes = vec![
            Node::new("a", 80.0, 40.0).pinned(),
            Node::new("b", 200.0, 60.0).pinned(),
        ];
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        (index, nodes)
    }

    #[test]
    fn test_left_of_gap_includes_half_widths() {
        let (index, mut nodes) = fixture();
        let c = Constraint::LeftOf {
            left: "a".into(),
            right: "b".into(),
            min_distance: 20.0,
        };
        let sep =
            compile_constraint(&c, &index, &mut nodes, &CompileConfig::default()).unwrap();
        assert_eq!(sep.axis, Axis::X);
        assert_eq!(sep.gap, 160.0); // 20 + 80/2 + 200/2
        assert!(!sep.equality);
    }

    #[test]
    fn test_above_gap_includes_half_heights() {
        let (index, mut nodes) = fixture();
        let c = Constraint::Above {
            top: "a".into(),
            bottom: "b".into(),
            min_distance: 15.0,
        };
        let sep =
            compile_constraint(&c, &index, &mut nodes, &CompileConfig::default()).unwrap();
        assert_eq!(sep.axis, Axis::Y);
        assert_eq!(sep.gap, 65.0); // 15 + 40/2 + 60/2
    }

    #[test]
    fn test_aligned_is_zero_gap_equality() {
        let (index, mut nodes) = fixture();
        let c = Constraint::Aligned {
            axis: Axis::Y,
            a: "a".into(),
            b: "b".into(),
        };
        let sep =
            compile_constraint(&c, &index, &mut nodes, &CompileConfig::default()).unwrap();
        assert_eq!(sep.gap, 0.0);
        assert!(sep.equality);
    }

    #[test]
    fn test_alignment_nudge_is_deterministic_and_tiny() {
        let (index, mut nodes) = fixture();
        let config = CompileConfig::default().with_alignment_nudge(true);
        let c = Constraint::Aligned {
            axis: Axis::X,
            a: "a".into(),
            b: "b".into(),
        };
        let first = compile_constraint(&c, &index, &mut nodes, &config).unwrap();
        let second = compile_constraint(&c, &index, &mut nodes, &config).unwrap();
        assert_eq!(first.gap, second.gap);
        assert!(first.gap >= 0.0 && first.gap < 1e-3);
    }

    #[test]
    fn test_constrained_nodes_lose_pin_flag() {
        let (index, mut nodes) = fixture();
        assert!(nodes[0].pinned && nodes[1].pinned);
        let c = Constraint::LeftOf {
            left: "a".into(),
            right: "b".into(),
            min_distance: 0.0,
        };
        compile_constraint(&c, &index, &mut nodes, &CompileConfig::default()).unwrap();
        assert!(!nodes[0].pinned);
        assert!(!nodes[1].pinned);
    }

    #[test]
    fn test_dangling_reference_fails_before_geometry() {
        let (index, mut nodes) = fixture();
        let c = Constraint::LeftOf {
            left: "a".into(),
            right: "ghost".into(),
            min_distance: 20.0,
        };
        let err =
            compile_constraint(&c, &index, &mut nodes, &CompileConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::DanglingNodeReference { .. }));
        // The touched node keeps its pin flag: nothing was applied.
        assert!(nodes[0].pinned);
    }
}
