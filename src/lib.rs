//! Kinegraph - constraint compilation and temporal continuity for animated
//! graph diagrams
//!
//! This library sits between a declarative layout evaluator and a
//! force-directed solver. The [`compile`] half turns an abstract layout
//! (nodes, edges, groups, spatial constraints) into solver primitives:
//! separation constraints and nested group definitions. The [`sequence`]
//! half keeps the numeric layout coherent across repeated recomputation by
//! seeding each solve from the previous one according to a pluggable
//! policy.
//!
//! # Example
//!
//! ```rust
//! use kinegraph::compile::{compile, AbstractLayout, CompileConfig, Constraint, Node};
//!
//! let layout = AbstractLayout {
//!     nodes: vec![Node::new("a", 80.0, 30.0), Node::new("b", 200.0, 30.0)],
//!     constraints: vec![Constraint::LeftOf {
//!         left: "a".into(),
//!         right: "b".into(),
//!         min_distance: 20.0,
//!     }],
//!     ..Default::default()
//! };
//!
//! let input = compile(layout, &CompileConfig::default()).unwrap();
//! assert_eq!(input.separations[0].gap, 160.0); // 20 + 80/2 + 200/2
//! ```

pub mod compile;
pub mod sequence;

pub use compile::{compile, AbstractLayout, CompileConfig, CompileError, SolverInput};
pub use sequence::{
    PolicyContext, PolicyDecision, PolicyRegistry, SequenceConfig, SequencePolicy,
};
