//! Symmetric-edge collapsing
//!
//! An exact reverse pair with identical labels renders as one bidirectional
//! edge instead of two overlapping arrows. Anything ambiguous — different
//! labels, multi-edges, self-loops, an edge with no reverse counterpart —
//! is left untouched.

use indexmap::IndexMap;
use tracing::debug;

use super::types::Edge;

/// Collapse opposite-direction, identically-labeled edge pairs into single
/// bidirectional edges. Surviving edges keep their input order; a collapsed
/// pair keeps the earlier edge's id and position.
pub fn collapse_edges(edges: Vec<Edge>) -> Vec<Edge> {
    let mut buckets: IndexMap<(String, String), Vec<usize>> = IndexMap::new();
    for (i, edge) in edges.iter().enumerate() {
        let key = if edge.source <= edge.target {
            (edge.source.clone(), edge.target.clone())
        } else {
            (edge.target.clone(), edge.source.clone())
        };
        buckets.entry(key).or_default().push(i);
    }

    let mut promote = vec![false; edges.len()];
    let mut drop = vec![false; edges.len()];
    for indices in buckets.values() {
        // Collapsing applies only to a pair with exactly one edge in each
        // direction; any other multiplicity is ambiguous.
        if let [i, j] = indices[..] {
            let (a, b) = (&edges[i], &edges[j]);
            let exact_reverse =
                a.source == b.target && a.target == b.source && a.source != a.target;
            if exact_reverse && a.label == b.label {
                promote[i] = true;
                drop[j] = true;
            }
        }
    }

    let collapsed = drop.iter().filter(|d| **d).count();
    if collapsed > 0 {
        debug!(pairs = collapsed, "collapsed symmetric edge pairs");
    }

    edges
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !drop[*i])
        .map(|(i, mut edge)| {
            if promote[i] {
                edge.bidirectional = true;
            }
            edge
        })
        .collect()
}
