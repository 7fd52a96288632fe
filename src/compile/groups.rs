//! Group deduplication and hierarchy resolution
//!
//! The target solver expresses clusters as a strict tree: a group owns leaf
//! nodes plus fully-contained subgroups. This module deduplicates groups
//! with identical member sets, derives the containment tree, and rejects
//! overlapping-but-not-nested groups, which that tree cannot express.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::config::CompileConfig;
use super::error::CompileError;
use super::types::{Group, GroupDefinition};

/// A group after identical-member-set deduplication.
struct MergedGroup {
    name: String,
    /// Members in first-seen order
    members: IndexSet<String>,
    /// Members as a sorted set, for subset tests
    member_set: BTreeSet<String>,
    key_node: String,
    show_label: bool,
    disconnected: bool,
}

/// Resolve groups into solver group definitions with nested containment.
///
/// Containment is derived purely from member sets: A is a direct subgroup of
/// B iff A's members are a strict subset of B's and A is not already covered
/// by another subgroup of B. This is best-effort de-duplication of
/// transitive registrations, not full cycle detection; deduplication plus
/// strict-subset nesting makes cycles unrepresentable here.
pub fn resolve_groups(
    groups: &[Group],
    node_index: &IndexMap<String, usize>,
    config: &CompileConfig,
) -> Result<Vec<GroupDefinition>, CompileError> {
    let merged = deduplicate(groups, node_index, config)?;
    detect_overlap(&merged)?;

    // Direct subgroups per group. Candidates are visited largest-first so a
    // subgroup nested inside an already-registered subgroup is skipped.
    let mut subgroups: Vec<Vec<usize>> = vec![Vec::new(); merged.len()];
    for (bi, b) in merged.iter().enumerate() {
        let mut candidates: Vec<usize> = merged
            .iter()
            .enumerate()
            .filter(|(ai, a)| {
                *ai != bi && a.member_set.is_subset(&b.member_set)
            })
            .map(|(ai, _)| ai)
            .collect();
        candidates.sort_by_key(|&ai| std::cmp::Reverse(merged[ai].member_set.len()));

        for ai in candidates {
            let covered = subgroups[bi].iter().any(|&si| {
                merged[ai].member_set.is_subset(&merged[si].member_set)
            });
            if !covered {
                subgroups[bi].push(ai);
            }
        }
    }

    let mut definitions = Vec::with_capacity(merged.len());
    for (gi, group) in merged.iter().enumerate() {
        // Own leaves: members not claimed by any direct subgroup.
        let claimed: BTreeSet<&String> = subgroups[gi]
            .iter()
            .flat_map(|&si| merged[si].member_set.iter())
            .collect();
        let leaves = group
            .members
            .iter()
            .filter(|id| !claimed.contains(id))
            .map(|id| node_index[id.as_str()])
            .collect();

        let padding = if group.disconnected {
            config.disconnected_group_padding
        } else {
            config.group_padding
        };

        definitions.push(GroupDefinition {
            name: group.name.clone(),
            leaves,
            subgroups: subgroups[gi].clone(),
            padding,
            key_node: node_index[group.key_node.as_str()],
            show_label: group.show_label,
        });
    }

    Ok(definitions)
}

/// Collapse groups with an identical member-id set into one group. The
/// merged name concatenates the source names in input order; show-label is
/// the OR of all sources; the key node comes from the first source.
fn deduplicate(
    groups: &[Group],
    node_index: &IndexMap<String, usize>,
    config: &CompileConfig,
) -> Result<Vec<MergedGroup>, CompileError> {
    let mut merged: IndexMap<BTreeSet<String>, MergedGroup> = IndexMap::new();

    for group in groups {
        let mut members = IndexSet::new();
        for id in &group.members {
            if !node_index.contains_key(id.as_str()) {
                return Err(CompileError::dangling(id, format!("group '{}'", group.name)));
            }
            members.insert(id.clone());
        }
        if !node_index.contains_key(group.key_node.as_str()) {
            return Err(CompileError::dangling(
                &group.key_node,
                format!("key node of group '{}'", group.name),
            ));
        }

        let member_set: BTreeSet<String> = members.iter().cloned().collect();
        let disconnected = group.name.starts_with(&config.disconnected_name_marker);

        match merged.get_mut(&member_set) {
            Some(existing) => {
                debug!(
                    first = %existing.name,
                    second = %group.name,
                    "collapsing groups with identical member sets"
                );
                existing.name.push_str(&config.merged_name_separator);
                existing.name.push_str(&group.name);
                existing.show_label |= group.show_label;
                existing.disconnected |= disconnected;
            }
            None => {
                merged.insert(
                    member_set.clone(),
                    MergedGroup {
                        name: group.name.clone(),
                        members,
                        member_set,
                        key_node: group.key_node.clone(),
                        show_label: group.show_label,
                        disconnected,
                    },
                );
            }
        }
    }

    Ok(merged.into_values().collect())
}

/// Reject group pairs whose member sets intersect without either containing
/// the other. Producing a plausible-looking diagram for such input would be
/// wrong, so this is surfaced to the caller instead.
fn detect_overlap(merged: &[MergedGroup]) -> Result<(), CompileError> {
    for (i, a) in merged.iter().enumerate() {
        for b in &merged[i + 1..] {
            let shared: Vec<String> = a
                .member_set
                .intersection(&b.member_set)
                .cloned()
                .collect();
            if !shared.is_empty()
                && !a.member_set.is_subset(&b.member_set)
                && !b.member_set.is_subset(&a.member_set)
            {
                return Err(CompileError::overlap(&a.name, &b.name, shared));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index(ids: &[&str]) -> IndexMap<String, usize> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), i))
            .collect()
    }

    fn members(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_groups_collapse_to_one() {
        let idx = index(&["a", "b"]);
        let groups = vec![
            Group::new("left", members(&["a", "b"]), "a").with_label(),
            Group::new("right", members(&["b", "a"]), "b"),
        ];
        let defs = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].name.contains("left"));
        assert!(defs[0].name.contains("right"));
        assert!(defs[0].show_label);
        // Key node comes from the first source group.
        assert_eq!(defs[0].key_node, 0);
    }

    #[test]
    fn test_three_identical_groups_collapse_to_one() {
        let idx = index(&["a", "b"]);
        let groups = vec![
            Group::new("g1", members(&["a", "b"]), "a"),
            Group::new("g2", members(&["a", "b"]), "b"),
            Group::new("g3", members(&["b", "a"]), "a"),
        ];
        let defs = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].name.contains("g1"));
        assert!(defs[0].name.contains("g2"));
        assert!(defs[0].name.contains("g3"));
    }

    #[test]
    fn test_strict_subset_becomes_subgroup() {
        let idx = index(&["a", "b", "c", "d"]);
        let groups = vec![
            Group::new("outer", members(&["a", "b", "c", "d"]), "a"),
            Group::new("inner", members(&["b", "c"]), "b"),
        ];
        let defs = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap();
        assert_eq!(defs.len(), 2);
        let outer = &defs[0];
        let inner = &defs[1];
        assert_eq!(inner.name, "inner");
        assert_eq!(outer.subgroups, vec![1]);
        // Outer's own leaves exclude every node claimed by inner.
        assert_eq!(outer.leaves, vec![0, 3]);
        assert_eq!(inner.leaves, vec![1, 2]);
    }

    #[test]
    fn test_nested_subgroup_not_double_registered() {
        let idx = index(&["a", "b", "c", "d"]);
        let groups = vec![
            Group::new("outer", members(&["a", "b", "c", "d"]), "a"),
            Group::new("middle", members(&["b", "c", "d"]), "b"),
            Group::new("inner", members(&["c", "d"]), "c"),
        ];
        let defs = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap();
        // inner is a subgroup of middle only, not registered on outer again.
        assert_eq!(defs[0].subgroups, vec![1]);
        assert_eq!(defs[1].subgroups, vec![2]);
        assert_eq!(defs[0].leaves, vec![0]);
        assert_eq!(defs[1].leaves, vec![1]);
        assert_eq!(defs[2].leaves, vec![2, 3]);
    }

    #[test]
    fn test_disconnected_placeholder_padding() {
        let idx = index(&["a", "b"]);
        let groups = vec![
            Group::new("_disconnected_nodes", members(&["a"]), "a"),
            Group::new("plain", members(&["b"]), "b"),
        ];
        let defs = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap();
        assert_eq!(defs[0].padding, 30.0);
        assert_eq!(defs[1].padding, 10.0);
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let idx = index(&["a", "b", "c"]);
        let groups = vec![
            Group::new("left", members(&["a", "b"]), "a"),
            Group::new("right", members(&["b", "c"]), "b"),
        ];
        let err = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap_err();
        match err {
            CompileError::UnsupportedGroupOverlap { shared, .. } => {
                assert_eq!(shared, vec!["b".to_string()]);
            }
            other => panic!("expected overlap error, got: {other:?}"),
        }
    }

    #[test]
    fn test_dangling_member_rejected() {
        let idx = index(&["a"]);
        let groups = vec![Group::new("g", members(&["a", "ghost"]), "a")];
        let err = resolve_groups(&groups, &idx, &CompileConfig::default()).unwrap_err();
        assert!(matches!(err, CompileError::DanglingNodeReference { .. }));
    }
}
