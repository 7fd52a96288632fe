//! Constraint compiler: abstract layout → force-directed solver primitives
//!
//! This module sits between the declarative layout evaluator and the numeric
//! solver. It resolves group nesting, translates spatial constraints into
//! separation constraints over real node geometry, and collapses symmetric
//! edge pairs. It never runs the force simulation itself.

pub mod config;
pub mod constraints;
pub mod edges;
pub mod error;
pub mod groups;
pub mod types;

pub use config::CompileConfig;
pub use constraints::compile_constraint;
pub use edges::collapse_edges;
pub use error::CompileError;
pub use groups::resolve_groups;
pub use types::*;

use indexmap::IndexMap;

/// Compile an abstract layout into solver input.
///
/// All reference validation happens before any geometry is computed; on
/// error nothing partial is produced and the caller must treat the whole
/// layout as invalid.
pub fn compile(layout: AbstractLayout, config: &CompileConfig) -> Result<SolverInput, CompileError> {
    let node_index = index_nodes(&layout.nodes)?;
    validate_edges(&layout.edges, &node_index)?;

    let groups = resolve_groups(&layout.groups, &node_index, config)?;

    let mut nodes = layout.nodes;
    let mut separations = Vec::with_capacity(layout.constraints.len());
    for constraint in &layout.constraints {
        separations.push(compile_constraint(constraint, &node_index, &mut nodes, config)?);
    }

    let edges = collapse_edges(layout.edges);

    Ok(SolverInput {
        nodes,
        edges,
        separations,
        groups,
    })
}

/// Build the id → index map, rejecting duplicate ids up front.
fn index_nodes(nodes: &[Node]) -> Result<IndexMap<String, usize>, CompileError> {
    let mut index = IndexMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.clone(), i).is_some() {
            return Err(CompileError::DuplicateNodeId {
                id: node.id.clone(),
            });
        }
    }
    Ok(index)
}

fn validate_edges(
    edges: &[Edge],
    node_index: &IndexMap<String, usize>,
) -> Result<(), CompileError> {
    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_index.contains_key(endpoint.as_str()) {
                return Err(CompileError::dangling(
                    endpoint,
                    format!("edge '{}'", edge.id),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_node_id_rejected() {
        let layout = AbstractLayout {
            nodes: vec![Node::new("a", 10.0, 10.0), Node::new("a", 20.0, 20.0)],
            ..Default::default()
        };
        let err = compile(layout, &CompileConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateNodeId { .. }));
    }

    #[test]
    fn test_dangling_edge_endpoint_rejected() {
        let layout = AbstractLayout {
            nodes: vec![Node::new("a", 10.0, 10.0)],
            edges: vec![Edge::new("e1", "a", "ghost", "r", "r")],
            ..Default::default()
        };
        let err = compile(layout, &CompileConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::DanglingNodeReference { .. }));
    }

    #[test]
    fn test_empty_layout_compiles_to_empty_input() {
        let input = compile(AbstractLayout::default(), &CompileConfig::default()).unwrap();
        assert_eq!(input.nodes.len(), 0);
        assert_eq!(input.edges.len(), 0);
        assert_eq!(input.separations.len(), 0);
        assert_eq!(input.groups.len(), 0);
    }
}
