//! Core types for the constraint compiler
//!
//! The abstract layout arrives from an external evaluator that has already
//! resolved a relational data instance against a diagram specification. The
//! compiler turns it into the primitives a force-directed solver consumes:
//! separation constraints and nested group definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A positioned, sized graph node. Geometry is in pixels; `attributes` is
/// opaque to the compiler and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// Set by upstream placement heuristics. Cleared by the compiler for any
    /// node governed by a constraint, so the solver is free to move it.
    #[serde(default)]
    pub pinned: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            color: None,
            attributes: IndexMap::new(),
            pinned: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// A directed edge between two nodes. Direction matters until the edge
/// collapser has run; a collapsed reverse pair carries `bidirectional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: String,
    pub label: String,
    #[serde(default)]
    pub bidirectional: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            label: label.into(),
            bidirectional: false,
        }
    }
}

/// A named cluster of nodes rendered with a contiguous visual boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    /// Ordered member set; duplicates are ignored.
    pub members: Vec<String>,
    pub key_node: String,
    pub show_label: bool,
}

impl Group {
    pub fn new(
        name: impl Into<String>,
        members: Vec<String>,
        key_node: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            members,
            key_node: key_node.into(),
            show_label: false,
        }
    }

    pub fn with_label(mut self) -> Self {
        self.show_label = true;
        self
    }
}

/// Axis of a separation constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// An abstract spatial constraint from the diagram specification.
///
/// This is a closed tagged union: dispatch in the compiler is exhaustive and
/// an unknown `kind` is rejected at the deserialization boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Constraint {
    /// `left` must sit at least `min_distance` to the left of `right`
    /// (measured between node borders, not centers).
    #[serde(rename_all = "camelCase")]
    LeftOf {
        left: String,
        right: String,
        min_distance: f64,
    },
    /// `top` must sit at least `min_distance` above `bottom`.
    #[serde(rename_all = "camelCase")]
    Above {
        top: String,
        bottom: String,
        min_distance: f64,
    },
    /// `a` and `b` share a coordinate on `axis`.
    #[serde(rename_all = "camelCase")]
    Aligned { axis: Axis, a: String, b: String },
}

impl Constraint {
    /// Node ids referenced by this constraint, in declaration order.
    pub fn referenced_ids(&self) -> [&str; 2] {
        match self {
            Constraint::LeftOf { left, right, .. } => [left, right],
            Constraint::Above { top, bottom, .. } => [top, bottom],
            Constraint::Aligned { a, b, .. } => [a, b],
        }
    }
}

/// Solver primitive: a minimum (or exact, if `equality`) distance between
/// two nodes along one axis. Node references are indices into the compiled
/// node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparationConstraint {
    pub axis: Axis,
    pub left: usize,
    pub right: usize,
    pub gap: f64,
    pub equality: bool,
}

/// Solver primitive: a group with resolved nesting. `leaves` holds the
/// node indices the group owns directly, excluding anything claimed by a
/// subgroup; `subgroups` holds indices into the compiled group list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    pub name: String,
    pub leaves: Vec<usize>,
    pub subgroups: Vec<usize>,
    pub padding: f64,
    pub key_node: usize,
    pub show_label: bool,
}

/// The abstract layout produced by the external evaluator for one data
/// snapshot. Input to [`compile`](crate::compile::compile).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractLayout {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    pub constraints: Vec<Constraint>,
}

/// Everything the external force-directed solver needs for one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverInput {
    /// Nodes in input order, pin flags cleared where a constraint governs
    /// the node.
    pub nodes: Vec<Node>,
    /// Edges after symmetric-pair collapsing.
    pub edges: Vec<Edge>,
    pub separations: Vec<SeparationConstraint>,
    pub groups: Vec<GroupDefinition>,
}
