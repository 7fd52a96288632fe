//! Change detection between successive data snapshots
//!
//! Each atom gets a connectivity fingerprint: the set of relation-tuple
//! descriptors it participates in. Diffing the fingerprints of two
//! snapshots classifies every atom and scores how hard its neighborhood
//! changed, which the change-emphasis policy turns into visual movement.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use rustc_hash::{FxHashSet, FxHasher};

/// An atom (graph node) in a data snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub id: String,
}

impl Atom {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One tuple of a relation, as an ordered list of participating atom ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub atoms: Vec<String>,
}

impl Tuple {
    pub fn new(atoms: &[&str]) -> Self {
        Self {
            atoms: atoms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A named relation and its tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub tuples: Vec<Tuple>,
}

impl Relation {
    pub fn new(name: impl Into<String>, tuples: Vec<Tuple>) -> Self {
        Self {
            name: name.into(),
            tuples,
        }
    }
}

/// The seam to the external data-instance layer. Anything that can list its
/// atoms and relations can drive change analysis and sequence policies.
pub trait DataInstance {
    fn atoms(&self) -> &[Atom];
    fn relations(&self) -> &[Relation];
}

/// An owned, in-memory data snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instance {
    pub atoms: Vec<Atom>,
    pub relations: Vec<Relation>,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_atoms(mut self, ids: &[&str]) -> Self {
        self.atoms.extend(ids.iter().copied().map(Atom::new));
        self
    }

    pub fn with_relation(mut self, name: &str, tuples: &[&[&str]]) -> Self {
        self.relations.push(Relation::new(
            name,
            tuples.iter().map(|atoms| Tuple::new(atoms)).collect(),
        ));
        self
    }
}

impl DataInstance for Instance {
    fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    fn relations(&self) -> &[Relation] {
        &self.relations
    }
}

/// How one atom changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChange {
    /// Present only in the current snapshot
    New,
    /// Present only in the previous snapshot
    Removed,
    /// Present in both with identical connectivity
    Stable,
    /// Present in both with differing connectivity; `intensity` scores the
    /// size of the difference in diff units
    Changed { intensity: u32 },
}

/// The result of diffing two snapshots: a per-atom classification plus a
/// deterministic signature string.
///
/// The signature encodes the before/after fingerprint state and exists only
/// to seed reproducible pseudo-randomness downstream; it carries no
/// business meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAnalysis {
    /// Current-snapshot atoms in input order, then removed atoms
    pub changes: IndexMap<String, NodeChange>,
    pub signature: String,
}

impl ChangeAnalysis {
    pub fn classification(&self, id: &str) -> Option<NodeChange> {
        self.changes.get(id).copied()
    }

    pub fn is_changed(&self, id: &str) -> bool {
        matches!(self.changes.get(id), Some(NodeChange::Changed { .. }))
    }

    /// Change intensity for an atom; zero unless it classified as changed.
    pub fn intensity(&self, id: &str) -> u32 {
        match self.changes.get(id) {
            Some(NodeChange::Changed { intensity }) => *intensity,
            _ => 0,
        }
    }
}

/// Diff two successive data snapshots.
pub fn analyze(prev: &dyn DataInstance, curr: &dyn DataInstance) -> ChangeAnalysis {
    let prev_prints = fingerprints(prev);
    let curr_prints = fingerprints(curr);
    let curr_atoms: FxHashSet<&str> = curr.atoms().iter().map(|a| a.id.as_str()).collect();

    let mut changes = IndexMap::new();
    for (id, curr_print) in &curr_prints {
        let change = match prev_prints.get(id) {
            None => NodeChange::New,
            Some(prev_print) => {
                let diff = prev_print.symmetric_difference(curr_print).count() as u32;
                let loss = removed_neighbor_loss(prev, id, &curr_atoms);
                if diff == 0 && loss == 0 {
                    NodeChange::Stable
                } else {
                    NodeChange::Changed {
                        intensity: diff.max(1) + loss,
                    }
                }
            }
        };
        changes.insert(id.clone(), change);
    }
    for id in prev_prints.keys() {
        if !curr_prints.contains_key(id) {
            changes.insert(id.clone(), NodeChange::Removed);
        }
    }

    ChangeAnalysis {
        changes,
        signature: signature(&prev_prints, &curr_prints),
    }
}

/// Per-atom descriptor sets: one `"relation:joined-participant-ids"` entry
/// for every tuple the atom participates in. Atoms with no tuples get an
/// empty set, which still marks them as present.
fn fingerprints(instance: &dyn DataInstance) -> IndexMap<String, BTreeSet<String>> {
    let mut prints: IndexMap<String, BTreeSet<String>> = instance
        .atoms()
        .iter()
        .map(|a| (a.id.clone(), BTreeSet::new()))
        .collect();

    for relation in instance.relations() {
        for tuple in &relation.tuples {
            let descriptor = format!("{}:{}", relation.name, tuple.atoms.join(","));
            for atom in &tuple.atoms {
                if let Some(set) = prints.get_mut(atom.as_str()) {
                    set.insert(descriptor.clone());
                }
            }
        }
    }

    prints
}

/// Count previous tuples of `id` that reference an atom missing from the
/// current snapshot. Captures lost context even when the atom's own
/// descriptor set is otherwise unchanged.
fn removed_neighbor_loss(prev: &dyn DataInstance, id: &str, curr_atoms: &FxHashSet<&str>) -> u32 {
    let mut loss = 0;
    for relation in prev.relations() {
        for tuple in &relation.tuples {
            if tuple.atoms.iter().any(|a| a == id)
                && tuple.atoms.iter().any(|a| !curr_atoms.contains(a.as_str()))
            {
                loss += 1;
            }
        }
    }
    loss
}

/// Deterministic digest of the full before/after fingerprint state.
fn signature(
    prev: &IndexMap<String, BTreeSet<String>>,
    curr: &IndexMap<String, BTreeSet<String>>,
) -> String {
    let mut ids: BTreeSet<&String> = prev.keys().collect();
    ids.extend(curr.keys());

    let mut hasher = FxHasher::default();
    for id in ids {
        id.hash(&mut hasher);
        for side in [prev.get(id), curr.get(id)] {
            match side {
                Some(set) => {
                    for descriptor in set {
                        descriptor.hash(&mut hasher);
                    }
                }
                None => "absent".hash(&mut hasher),
            }
            "/".hash(&mut hasher);
        }
    }
    format!("{:016x}", hasher.finish())
}
