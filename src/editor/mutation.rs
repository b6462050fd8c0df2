//! Structural edits on tree snapshots
//!
//! Every operation takes the caller's tree by reference, works on a deep
//! copy and returns the new snapshot. The input is never touched, so history
//! entries stay independent. Cycles are re-validated here no matter what the
//! caller already checked.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::hierarchy::{NodeId, TreeNode};

use super::error::{EditorError, EntityKind};

/// A local edit that can be committed to history
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Move {
        node: NodeId,
        target: NodeId,
        with_children: bool,
    },
    BulkMove {
        nodes: Vec<NodeId>,
        target: NodeId,
    },
}

/// Result of applying a [`Mutation`]
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub tree: TreeNode,
    /// Ids that were moved
    pub moved: Vec<NodeId>,
    /// Bulk members left in place because their move was invalid
    pub skipped: Vec<NodeId>,
}

impl MutationOutcome {
    /// True when nothing moved at all
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

impl Mutation {
    pub fn apply(&self, tree: &TreeNode) -> Result<MutationOutcome, EditorError> {
        match self {
            Mutation::Move {
                node,
                target,
                with_children,
            } => Ok(MutationOutcome {
                tree: move_node(tree, node, target, *with_children)?,
                moved: vec![node.clone()],
                skipped: vec![],
            }),
            Mutation::BulkMove { nodes, target } => bulk_move(tree, nodes, target),
        }
    }

    /// The node the edit lands on
    pub fn target(&self) -> &NodeId {
        match self {
            Mutation::Move { target, .. } | Mutation::BulkMove { target, .. } => target,
        }
    }
}

fn check_move(tree: &TreeNode, node: &NodeId, target: &NodeId) -> Result<(), EditorError> {
    let moved = tree
        .find(node)
        .ok_or_else(|| EditorError::not_found(EntityKind::Node, node.as_str()))?;
    let landing = tree
        .find(target)
        .ok_or_else(|| EditorError::not_found(EntityKind::Target, target.as_str()))?;
    if &tree.id == node {
        return Err(EditorError::validation("the root cannot be moved"));
    }
    if moved.is_seat() {
        return Err(EditorError::validation(format!(
            "seat '{node}' cannot be moved"
        )));
    }
    if landing.is_seat() {
        return Err(EditorError::validation(format!(
            "seat '{target}' cannot receive reports"
        )));
    }
    if moved.contains(target) {
        return Err(EditorError::cycle(node, target));
    }
    Ok(())
}

/// Re-parent `node` under `target`.
///
/// With `with_children == false` the node's former children are first
/// handed to its former parent, and the node arrives with no children.
pub fn move_node(
    tree: &TreeNode,
    node: &NodeId,
    target: &NodeId,
    with_children: bool,
) -> Result<TreeNode, EditorError> {
    check_move(tree, node, target)?;

    let mut next = tree.clone();
    let old_parent = next
        .parent_of(node)
        .map(|parent| parent.id.clone())
        .ok_or_else(|| EditorError::not_found(EntityKind::Node, node.as_str()))?;
    let mut detached = next
        .detach(node)
        .ok_or_else(|| EditorError::not_found(EntityKind::Node, node.as_str()))?;

    if !with_children {
        let orphans = std::mem::take(&mut detached.children);
        attach(&mut next, &old_parent, orphans)?;
    }
    attach(&mut next, target, vec![detached])?;

    debug!(%node, %target, with_children, "moved node");
    Ok(next)
}

/// Move each id's whole subtree under `target`, in order.
///
/// Individual moves that are invalid (cycles included) are skipped; moves
/// already applied stay applied.
pub fn bulk_move(
    tree: &TreeNode,
    nodes: &[NodeId],
    target: &NodeId,
) -> Result<MutationOutcome, EditorError> {
    if !tree.contains(target) {
        return Err(EditorError::not_found(EntityKind::Target, target.as_str()));
    }
    let mut current = tree.clone();
    let mut moved = vec![];
    let mut skipped = vec![];
    for node in nodes {
        match move_node(&current, node, target, true) {
            Ok(next) => {
                current = next;
                moved.push(node.clone());
            }
            Err(err) => {
                debug!(%node, %target, error = %err, "skipped bulk member");
                skipped.push(node.clone());
            }
        }
    }
    Ok(MutationOutcome {
        tree: current,
        moved,
        skipped,
    })
}

fn attach(tree: &mut TreeNode, parent: &NodeId, nodes: Vec<TreeNode>) -> Result<(), EditorError> {
    let parent = tree
        .find_mut(parent)
        .ok_or_else(|| EditorError::not_found(EntityKind::Target, parent.as_str()))?;
    parent.children.extend(nodes);
    Ok(())
}

/// Summary returned by a manager swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSummary {
    pub manager1_name: String,
    pub manager2_name: String,
    pub manager1_team_count: usize,
    pub manager2_team_count: usize,
    pub total_updated: usize,
}

/// Summary returned by a team reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamSummary {
    pub old_manager_name: String,
    pub new_manager_name: String,
    pub team_count: usize,
    pub updated_count: usize,
}

/// Summary returned by a single-person reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPersonSummary {
    pub person_name: String,
    pub target_manager_name: String,
}

fn lookup<'a>(tree: &'a TreeNode, id: &NodeId, entity: EntityKind) -> Result<&'a TreeNode, EditorError> {
    tree.find(id)
        .ok_or_else(|| EditorError::not_found(entity, id.as_str()))
}

fn team_of(node: &TreeNode, except: &NodeId) -> Vec<NodeId> {
    node.children
        .iter()
        .map(|child| child.id.clone())
        .filter(|id| id != except)
        .collect()
}

/// Exchange the direct reports of two managers.
///
/// When one manager reports directly to the other, their own links swap as
/// well. Everything else about the managers (location included) stays with
/// the person.
pub fn swap_managers(
    tree: &TreeNode,
    manager1: &NodeId,
    manager2: &NodeId,
) -> Result<(TreeNode, SwapSummary), EditorError> {
    if manager1 == manager2 {
        return Err(EditorError::validation("cannot swap a manager with themselves"));
    }
    let m1 = lookup(tree, manager1, EntityKind::Manager)?;
    let m2 = lookup(tree, manager2, EntityKind::Manager)?;
    if &tree.id == manager1 || &tree.id == manager2 {
        return Err(EditorError::validation("the root cannot be swapped"));
    }

    let team1 = team_of(m1, manager2);
    let team2 = team_of(m2, manager1);
    let mut changes: Vec<(NodeId, NodeId)> = vec![];
    changes.extend(team1.iter().map(|id| (id.clone(), manager2.clone())));
    changes.extend(team2.iter().map(|id| (id.clone(), manager1.clone())));

    let parent_of = |id: &NodeId| tree.parent_of(id).map(|p| p.id.clone());
    if parent_of(manager2).as_ref() == Some(manager1) {
        if let Some(grand) = parent_of(manager1) {
            changes.push((manager2.clone(), grand));
            changes.push((manager1.clone(), manager2.clone()));
        }
    } else if parent_of(manager1).as_ref() == Some(manager2) {
        if let Some(grand) = parent_of(manager2) {
            changes.push((manager1.clone(), grand));
            changes.push((manager2.clone(), manager1.clone()));
        }
    }

    let summary = SwapSummary {
        manager1_name: m1.display_name().to_string(),
        manager2_name: m2.display_name().to_string(),
        manager1_team_count: team1.len(),
        manager2_team_count: team2.len(),
        total_updated: changes.len(),
    };
    let next = relink(tree, &changes)?;
    debug!(%manager1, %manager2, total = summary.total_updated, "swapped managers");
    Ok((next, summary))
}

/// Re-point every direct report of `old_manager` to `new_manager`
pub fn assign_team(
    tree: &TreeNode,
    old_manager: &NodeId,
    new_manager: &NodeId,
) -> Result<(TreeNode, AssignTeamSummary), EditorError> {
    if old_manager == new_manager {
        return Err(EditorError::validation(
            "old and new manager must be different people",
        ));
    }
    let old = lookup(tree, old_manager, EntityKind::Manager)?;
    let new = lookup(tree, new_manager, EntityKind::Manager)?;
    if new.is_seat() {
        return Err(EditorError::validation(format!(
            "seat '{new_manager}' cannot receive reports"
        )));
    }

    // A new manager who is one of the reports stays where they are
    let team = team_of(old, new_manager);
    let changes: Vec<_> = team
        .iter()
        .map(|id| (id.clone(), new_manager.clone()))
        .collect();
    let summary = AssignTeamSummary {
        old_manager_name: old.display_name().to_string(),
        new_manager_name: new.display_name().to_string(),
        team_count: team.len(),
        updated_count: changes.len(),
    };
    let next = relink(tree, &changes)?;
    debug!(%old_manager, %new_manager, team = summary.team_count, "assigned team");
    Ok((next, summary))
}

/// Re-point one person to `target_manager`, keeping their own reports
pub fn assign_person(
    tree: &TreeNode,
    person: &NodeId,
    target_manager: &NodeId,
) -> Result<(TreeNode, AssignPersonSummary), EditorError> {
    if person == target_manager {
        return Err(EditorError::validation("a person cannot report to themselves"));
    }
    let who = lookup(tree, person, EntityKind::Person)?;
    let manager = lookup(tree, target_manager, EntityKind::Manager)?;
    if &tree.id == person {
        return Err(EditorError::validation("the root cannot be reassigned"));
    }
    if manager.is_seat() {
        return Err(EditorError::validation(format!(
            "seat '{target_manager}' cannot receive reports"
        )));
    }
    let summary = AssignPersonSummary {
        person_name: who.display_name().to_string(),
        target_manager_name: manager.display_name().to_string(),
    };
    let next = relink(tree, &[(person.clone(), target_manager.clone())])?;
    debug!(%person, %target_manager, "assigned person");
    Ok((next, summary))
}

/// Apply a batch of `(node, new parent)` links and rebuild the tree.
///
/// Every changed node's chain is walked to the root with a visited set
/// before anything is rebuilt; a loop rejects the whole batch.
fn relink(tree: &TreeNode, changes: &[(NodeId, NodeId)]) -> Result<TreeNode, EditorError> {
    let mut parents: HashMap<NodeId, NodeId> = tree
        .iter_with_parent()
        .filter_map(|(node, parent)| parent.map(|p| (node.id.clone(), p.clone())))
        .collect();
    for (node, parent) in changes {
        parents.insert(node.clone(), parent.clone());
    }

    for (node, target) in changes {
        let mut visited = HashSet::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if !visited.insert(id) {
                return Err(EditorError::cycle(node, target));
            }
            cursor = parents.get(id);
        }
    }

    let mut by_parent: HashMap<&NodeId, Vec<&TreeNode>> = HashMap::new();
    for node in tree.iter().skip(1) {
        if let Some(parent) = parents.get(&node.id) {
            by_parent.entry(parent).or_default().push(node);
        }
    }
    Ok(rebuild(tree, &by_parent))
}

fn rebuild(node: &TreeNode, by_parent: &HashMap<&NodeId, Vec<&TreeNode>>) -> TreeNode {
    let children = by_parent
        .get(&node.id)
        .map(|kids| kids.iter().map(|kid| rebuild(kid, by_parent)).collect())
        .unwrap_or_default();
    TreeNode {
        id: node.id.clone(),
        data: node.data.clone(),
        children,
        is_hidden_manager: node.is_hidden_manager,
    }
}

/// One entry of the save payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerChange {
    pub id: NodeId,
    pub new_manager_id: Option<NodeId>,
}

/// Every node with its current parent, in pre-order. The root maps to `None`.
pub fn save_changes(tree: &TreeNode) -> Vec<ManagerChange> {
    tree.iter_with_parent()
        .map(|(node, parent)| ManagerChange {
            id: node.id.clone(),
            new_manager_id: parent.cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn leaf(s: &str) -> TreeNode {
        TreeNode::leaf(s)
    }

    #[test]
    fn test_move_with_children() {
        let tree = leaf("Root").with_children(vec![
            leaf("A").with_children(vec![leaf("B"), leaf("C")]),
        ]);
        let next = move_node(&tree, &id("C"), &id("Root"), true).expect("valid move");
        let expected = leaf("Root").with_children(vec![
            leaf("A").with_children(vec![leaf("B")]),
            leaf("C"),
        ]);
        assert_eq!(next, expected);
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn test_move_without_children() {
        let tree = leaf("Root").with_children(vec![leaf("A").with_children(vec![
            leaf("B").with_children(vec![leaf("D")]),
        ])]);
        let next = move_node(&tree, &id("B"), &id("Root"), false).expect("valid move");
        let expected = leaf("Root").with_children(vec![
            leaf("A").with_children(vec![leaf("D")]),
            leaf("B"),
        ]);
        assert_eq!(next, expected);
    }

    #[test]
    fn test_move_rejects_cycle() {
        let tree = leaf("Root").with_children(vec![leaf("A").with_children(vec![leaf("B")])]);
        let err = move_node(&tree, &id("A"), &id("B"), true).unwrap_err();
        assert_eq!(err, EditorError::cycle(&id("A"), &id("B")));
        let err = move_node(&tree, &id("A"), &id("A"), false).unwrap_err();
        assert!(matches!(err, EditorError::CycleViolation { .. }));
    }

    #[test]
    fn test_move_rejects_root_and_seats() {
        let tree = leaf("Root").with_children(vec![leaf("A"), leaf("SEAT_1_1")]);
        assert!(matches!(
            move_node(&tree, &id("Root"), &id("A"), true),
            Err(EditorError::Validation { .. })
        ));
        assert!(matches!(
            move_node(&tree, &id("A"), &id("SEAT_1_1"), true),
            Err(EditorError::Validation { .. })
        ));
        assert!(matches!(
            move_node(&tree, &id("SEAT_1_1"), &id("A"), true),
            Err(EditorError::Validation { .. })
        ));
    }

    #[test]
    fn test_move_unknown_ids() {
        let tree = leaf("Root").with_children(vec![leaf("A")]);
        assert_eq!(
            move_node(&tree, &id("Z"), &id("Root"), true).unwrap_err(),
            EditorError::not_found(EntityKind::Node, "Z")
        );
        assert_eq!(
            move_node(&tree, &id("A"), &id("Z"), true).unwrap_err(),
            EditorError::not_found(EntityKind::Target, "Z")
        );
    }

    #[test]
    fn test_bulk_move_skips_cycles_and_keeps_earlier_moves() {
        let tree = leaf("Root").with_children(vec![
            leaf("X"),
            leaf("P").with_children(vec![leaf("Y").with_children(vec![leaf("T")])]),
        ]);
        let outcome = bulk_move(&tree, &[id("X"), id("Y")], &id("T")).expect("target exists");
        assert_eq!(outcome.moved, vec![id("X")]);
        assert_eq!(outcome.skipped, vec![id("Y")]);
        assert_eq!(outcome.tree.parent_of(&id("X")).map(|n| n.id.clone()), Some(id("T")));
    }

    #[test]
    fn test_swap_exchanges_teams() {
        let tree = leaf("Root").with_children(vec![
            leaf("M1").with_children(vec![leaf("a"), leaf("b")]),
            leaf("M2").with_children(vec![leaf("c")]),
        ]);
        let (next, summary) = swap_managers(&tree, &id("M1"), &id("M2")).expect("swap");
        let expected = leaf("Root").with_children(vec![
            leaf("M1").with_children(vec![leaf("c")]),
            leaf("M2").with_children(vec![leaf("a"), leaf("b")]),
        ]);
        assert_eq!(next, expected);
        assert_eq!(summary.manager1_team_count, 2);
        assert_eq!(summary.manager2_team_count, 1);
        assert_eq!(summary.total_updated, 3);
    }

    #[test]
    fn test_swap_adjacent_managers() {
        let tree = leaf("Root").with_children(vec![leaf("M1").with_children(vec![
            leaf("M2").with_children(vec![leaf("c")]),
            leaf("a"),
        ])]);
        let (next, summary) = swap_managers(&tree, &id("M1"), &id("M2")).expect("swap");
        let expected = leaf("Root").with_children(vec![leaf("M2").with_children(vec![
            leaf("M1").with_children(vec![leaf("c")]),
            leaf("a"),
        ])]);
        assert_eq!(next, expected);
        assert_eq!(summary.total_updated, 4);
    }

    #[test]
    fn test_swap_with_deep_descendant_is_cycle() {
        let tree = leaf("Root").with_children(vec![leaf("M1").with_children(vec![
            leaf("mid").with_children(vec![leaf("M2")]),
        ])]);
        let err = swap_managers(&tree, &id("M1"), &id("M2")).unwrap_err();
        assert!(matches!(err, EditorError::CycleViolation { .. }));
    }

    #[test]
    fn test_assign_team_keeps_old_manager_in_place() {
        let tree = leaf("Root").with_children(vec![
            leaf("Old").with_children(vec![leaf("a"), leaf("b")]),
            leaf("New"),
        ]);
        let (next, summary) = assign_team(&tree, &id("Old"), &id("New")).expect("assign");
        assert!(next.find(&id("Old")).map(TreeNode::is_leaf).unwrap_or(false));
        assert_eq!(next.parent_of(&id("Old")).map(|n| n.id.clone()), Some(id("Root")));
        assert_eq!(next.find(&id("New")).map(|n| n.children.len()), Some(2));
        assert_eq!(summary.team_count, 2);
    }

    #[test]
    fn test_assign_team_into_own_subtree_is_cycle() {
        let tree = leaf("Root").with_children(vec![leaf("Old").with_children(vec![
            leaf("a").with_children(vec![leaf("deep")]),
        ])]);
        let err = assign_team(&tree, &id("Old"), &id("deep")).unwrap_err();
        assert!(matches!(err, EditorError::CycleViolation { .. }));
    }

    #[test]
    fn test_assign_team_to_one_of_the_reports() {
        let tree = leaf("Root").with_children(vec![
            leaf("Old").with_children(vec![leaf("a"), leaf("b")]),
        ]);
        let (next, summary) = assign_team(&tree, &id("Old"), &id("a")).expect("assign");
        assert_eq!(next.parent_of(&id("a")).map(|n| n.id.clone()), Some(id("Old")));
        assert_eq!(next.parent_of(&id("b")).map(|n| n.id.clone()), Some(id("a")));
        assert_eq!(summary.team_count, 1);
    }

    #[test]
    fn test_assign_person_keeps_subtree() {
        let tree = leaf("Root").with_children(vec![
            leaf("P").with_children(vec![leaf("r")]),
            leaf("M"),
        ]);
        let (next, summary) = assign_person(&tree, &id("P"), &id("M")).expect("assign");
        assert_eq!(next.parent_of(&id("P")).map(|n| n.id.clone()), Some(id("M")));
        assert_eq!(next.parent_of(&id("r")).map(|n| n.id.clone()), Some(id("P")));
        assert_eq!(summary.target_manager_name, "M");
    }

    #[test]
    fn test_assign_person_self_reference() {
        let tree = leaf("Root").with_children(vec![leaf("P")]);
        assert!(matches!(
            assign_person(&tree, &id("P"), &id("P")),
            Err(EditorError::Validation { .. })
        ));
    }

    #[test]
    fn test_save_changes_preorder() {
        let tree = leaf("Root").with_children(vec![leaf("A").with_children(vec![leaf("B")])]);
        let changes = save_changes(&tree);
        assert_eq!(
            changes,
            vec![
                ManagerChange { id: id("Root"), new_manager_id: None },
                ManagerChange { id: id("A"), new_manager_id: Some(id("Root")) },
                ManagerChange { id: id("B"), new_manager_id: Some(id("A")) },
            ]
        );
        let json = serde_json::to_string(&changes[1]).expect("serialize");
        assert_eq!(json, r#"{"id":"A","newManagerId":"Root"}"#);
    }
}
