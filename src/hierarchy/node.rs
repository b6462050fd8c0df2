//! The owned reporting tree

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::EmployeeRecord;

/// Id prefix marking placeholder seats (`SEAT_<ts>_<n>`)
pub const SEAT_PREFIX: &str = "SEAT_";

/// Stable node identifier, the employee id or a seat id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_seat(&self) -> bool {
        self.0.starts_with(SEAT_PREFIX)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Employee,
    /// Open position with no occupant; always a leaf
    Seat,
}

/// One node of the reporting tree. A parent exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: NodeId,
    pub data: EmployeeRecord,
    pub children: Vec<TreeNode>,
    /// Hidden from the chart but kept as a structural pass-through
    pub is_hidden_manager: bool,
}

impl TreeNode {
    pub fn from_record(record: EmployeeRecord) -> Self {
        Self {
            id: NodeId::new(record.id.clone()),
            is_hidden_manager: record.is_hidden_manager(),
            data: record,
            children: vec![],
        }
    }

    /// Build a tree by hand: `TreeNode::leaf("A").with_children(vec![...])`
    pub fn leaf(id: &str) -> Self {
        Self::from_record(EmployeeRecord::new(id, id))
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn kind(&self) -> NodeKind {
        if self.id.is_seat() {
            NodeKind::Seat
        } else {
            NodeKind::Employee
        }
    }

    pub fn is_seat(&self) -> bool {
        self.kind() == NodeKind::Seat
    }

    pub fn is_manager(&self) -> bool {
        self.data.is_manager
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn display_name(&self) -> &str {
        &self.data.display_name
    }

    /// Find a node anywhere in this subtree
    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut TreeNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// True if `id` is this node or one of its descendants
    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// True if `candidate` lies in the subtree rooted at `ancestor` (inclusive)
    pub fn is_in_subtree(&self, ancestor: &NodeId, candidate: &NodeId) -> bool {
        self.find(ancestor)
            .is_some_and(|node| node.contains(candidate))
    }

    /// The node whose child list holds `id`
    pub fn parent_of(&self, id: &NodeId) -> Option<&TreeNode> {
        if self.children.iter().any(|child| &child.id == id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.parent_of(id))
    }

    /// Remove the subtree rooted at `id` from its parent. The root itself cannot be detached.
    pub fn detach(&mut self, id: &NodeId) -> Option<TreeNode> {
        if let Some(pos) = self.children.iter().position(|child| &child.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|child| child.detach(id))
    }

    /// Total number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Pre-order traversal
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Pre-order traversal yielding each node with its parent id
    pub fn iter_with_parent(&self) -> impl Iterator<Item = (&TreeNode, Option<&NodeId>)> {
        let mut out = vec![];
        collect_with_parent(self, None, &mut out);
        out.into_iter()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|node| node.id.clone()).collect()
    }
}

fn collect_with_parent<'a>(
    node: &'a TreeNode,
    parent: Option<&'a NodeId>,
    out: &mut Vec<(&'a TreeNode, Option<&'a NodeId>)>,
) {
    out.push((node, parent));
    for child in &node.children {
        collect_with_parent(child, Some(&node.id), out);
    }
}

/// Pre-order iterator over a subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::leaf("Root").with_children(vec![
            TreeNode::leaf("A").with_children(vec![TreeNode::leaf("B"), TreeNode::leaf("C")]),
            TreeNode::leaf("D"),
        ])
    }

    #[test]
    fn test_preorder_ids() {
        let ids: Vec<_> = sample().iter().map(|n| n.id.0.clone()).collect();
        assert_eq!(ids, vec!["Root", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_parent_of() {
        let tree = sample();
        assert_eq!(tree.parent_of(&"C".into()).map(|n| n.id.as_str()), Some("A"));
        assert_eq!(tree.parent_of(&"A".into()).map(|n| n.id.as_str()), Some("Root"));
        assert!(tree.parent_of(&"Root".into()).is_none());
    }

    #[test]
    fn test_is_in_subtree() {
        let tree = sample();
        assert!(tree.is_in_subtree(&"A".into(), &"B".into()));
        assert!(tree.is_in_subtree(&"A".into(), &"A".into()));
        assert!(!tree.is_in_subtree(&"A".into(), &"D".into()));
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut tree = sample();
        let a = tree.detach(&"A".into()).expect("A should detach");
        assert_eq!(a.count(), 3);
        assert_eq!(tree.count(), 2);
        assert!(tree.detach(&"Root".into()).is_none());
    }

    #[test]
    fn test_seat_kind() {
        let seat = TreeNode::leaf("SEAT_1700000000_1");
        assert_eq!(seat.kind(), NodeKind::Seat);
        assert_eq!(TreeNode::leaf("E1").kind(), NodeKind::Employee);
    }
}
