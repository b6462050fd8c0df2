//! Pointer-drag state machine
//!
//! `Idle -> Dragging -> Idle`. A drag carries either one node or, when the
//! grabbed node is part of a multi-selection, the whole selection as a rigid
//! group. Positions are in chart space; the caller inverts the viewport
//! transform before feeding pointer coordinates in.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::hierarchy::{NodeId, TreeNode};
use crate::layout::{route_with_overrides, ChartLayout, LayoutConfig, LinkLayout, Point};

use super::error::{EditorError, EntityKind};
use super::mutation::Mutation;
use super::pending::PendingMutation;
use super::selection::SelectionController;

/// Configuration for drag and drop
#[derive(Debug, Clone, PartialEq)]
pub struct DragConfig {
    /// Max distance between node centres for a drop target to count
    pub drop_threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drop_threshold: 120.0,
        }
    }
}

impl DragConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drop_threshold(mut self, threshold: f64) -> Self {
        self.drop_threshold = threshold;
        self
    }
}

/// An active drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The node under the pointer when the drag started
    pub anchor: NodeId,
    /// Everything being dragged, anchor first
    pub members: Vec<NodeId>,
    pub start_pointer: Point,
    /// Layout positions of the members when the drag started
    pub origins: HashMap<NodeId, Point>,
    pub delta: (f64, f64),
    pub candidate: Option<NodeId>,
}

impl DragSession {
    pub fn is_multi(&self) -> bool {
        self.members.len() > 1
    }

    /// Current position of a dragged member
    pub fn position_of(&self, id: &NodeId) -> Option<Point> {
        self.origins
            .get(id)
            .map(|origin| origin.offset(self.delta.0, self.delta.1))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// What to redraw after a pointer move
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrame {
    /// New centres of the dragged nodes
    pub positions: Vec<(NodeId, Point)>,
    /// Re-routed links with an endpoint among the dragged nodes
    pub links: Vec<LinkLayout>,
    /// Highlighted drop target
    pub candidate: Option<NodeId>,
    /// Shadow left at the drag origin, single drags only
    pub ghost: Option<Point>,
}

/// How a drag ended
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// No target in range, or the drag was abandoned. Not an error.
    Cancelled,
    /// The drop failed the cycle check
    Rejected(EditorError),
    /// The drop needs a dialog
    Pending(PendingMutation),
    /// The drop can be committed right away
    Commit(Mutation),
}

/// Drives one drag at a time
#[derive(Debug, Clone, Default)]
pub struct DragController {
    config: DragConfig,
    state: DragState,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Begin dragging `node`. Returns false (and stays idle) for seats and
    /// ids missing from the layout.
    pub fn start(
        &mut self,
        layout: &ChartLayout,
        node: &NodeId,
        pointer: Point,
        selection: &SelectionController,
    ) -> bool {
        self.state = DragState::Idle;
        let Some(grabbed) = layout.node(node) else {
            return false;
        };
        if grabbed.is_seat() {
            debug!(%node, "seats are not draggable");
            return false;
        }

        let selected = selection.selected_ids();
        let members: Vec<NodeId> = if selected.len() > 1 && selected.contains(node) {
            let mut members = vec![node.clone()];
            members.extend(selected.iter().filter(|id| *id != node).cloned());
            members
        } else {
            vec![node.clone()]
        };
        let origins = members
            .iter()
            .filter_map(|id| layout.position_of(id).map(|p| (id.clone(), p)))
            .collect();

        debug!(%node, members = members.len(), "drag started");
        self.state = DragState::Dragging(DragSession {
            anchor: node.clone(),
            members,
            start_pointer: pointer,
            origins,
            delta: (0.0, 0.0),
            candidate: None,
        });
        true
    }

    /// Follow the pointer. `None` when no drag is active.
    pub fn move_to(
        &mut self,
        layout: &ChartLayout,
        config: &LayoutConfig,
        pointer: Point,
    ) -> Option<DragFrame> {
        let threshold = self.config.drop_threshold;
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        session.delta = (
            pointer.x - session.start_pointer.x,
            pointer.y - session.start_pointer.y,
        );

        let overrides: HashMap<NodeId, Point> = session
            .members
            .iter()
            .filter_map(|id| session.position_of(id).map(|p| (id.clone(), p)))
            .collect();
        session.candidate = Self::find_candidate(layout, session, threshold);

        let moved: HashSet<&NodeId> = session.members.iter().collect();
        let links = route_with_overrides(&layout.nodes, &overrides, config, |child| {
            moved.contains(&child.id) || child.parent.as_ref().is_some_and(|p| moved.contains(p))
        });

        let positions = session
            .members
            .iter()
            .filter_map(|id| overrides.get(id).map(|p| (id.clone(), *p)))
            .collect();
        let ghost = if session.is_multi() {
            None
        } else {
            session.origins.get(&session.anchor).copied()
        };
        Some(DragFrame {
            positions,
            links,
            candidate: session.candidate.clone(),
            ghost,
        })
    }

    fn find_candidate(
        layout: &ChartLayout,
        session: &DragSession,
        threshold: f64,
    ) -> Option<NodeId> {
        let anchor = session.position_of(&session.anchor)?;
        let mut exclude: HashSet<NodeId> = session.members.iter().cloned().collect();
        exclude.extend(layout.nodes.iter().filter(|n| n.is_seat()).map(|n| n.id.clone()));
        layout
            .nearest_node(anchor, &exclude, threshold)
            .map(|node| node.id.clone())
    }

    /// Abandon the drag without touching anything
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Finish the drag at `pointer` and decide what the drop means
    pub fn end(
        &mut self,
        tree: &TreeNode,
        layout: &ChartLayout,
        config: &LayoutConfig,
        pointer: Point,
    ) -> DropOutcome {
        self.move_to(layout, config, pointer);
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DropOutcome::Cancelled;
        };
        let Some(target) = session.candidate.clone() else {
            debug!(anchor = %session.anchor, "drop out of range");
            return DropOutcome::Cancelled;
        };

        if let Some(member) = session
            .members
            .iter()
            .find(|member| tree.is_in_subtree(member, &target))
        {
            info!(node = %member, %target, "drop rejected: cycle");
            return DropOutcome::Rejected(EditorError::cycle(member, &target));
        }

        if session.is_multi() {
            return DropOutcome::Pending(PendingMutation::MultiMoveChoice {
                nodes: session.members,
                target,
            });
        }

        let Some(node) = tree.find(&session.anchor) else {
            return DropOutcome::Rejected(EditorError::not_found(
                EntityKind::Node,
                session.anchor.as_str(),
            ));
        };
        let target_is_manager = tree.find(&target).is_some_and(TreeNode::is_manager);
        if node.is_manager() {
            DropOutcome::Pending(PendingMutation::AssignChoice {
                person: node.id.clone(),
                target,
                team_count: node.children.len(),
                target_is_manager,
            })
        } else if !node.is_leaf() {
            DropOutcome::Pending(PendingMutation::MoveChoice {
                node: node.id.clone(),
                target,
                child_count: node.children.len(),
            })
        } else {
            DropOutcome::Commit(Mutation::Move {
                node: node.id.clone(),
                target,
                with_children: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::EmployeeRecord;
    use crate::layout::compute;
    use crate::levels::LevelCatalog;

    fn tree() -> TreeNode {
        let manager = TreeNode::from_record(EmployeeRecord::new("M", "M").manager());
        TreeNode::leaf("Root").with_children(vec![
            TreeNode::leaf("A").with_children(vec![TreeNode::leaf("B"), TreeNode::leaf("C")]),
            manager.with_children(vec![TreeNode::leaf("D")]),
            TreeNode::leaf("SEAT_1_1"),
        ])
    }

    fn setup() -> (TreeNode, ChartLayout, LayoutConfig) {
        let tree = tree();
        let config = LayoutConfig::default();
        let layout = compute(&tree, &LevelCatalog::new(), &config);
        (tree, layout, config)
    }

    fn drag_onto(
        drag: &mut DragController,
        tree: &TreeNode,
        layout: &ChartLayout,
        config: &LayoutConfig,
        node: &str,
        target: &str,
    ) -> DropOutcome {
        let from = layout.position_of(&NodeId::new(node)).expect("node");
        let to = layout.position_of(&NodeId::new(target)).expect("target");
        let selection = SelectionController::new();
        assert!(drag.start(layout, &NodeId::new(node), from, &selection));
        drag.end(tree, layout, config, to)
    }

    #[test]
    fn test_seat_is_not_draggable() {
        let (_, layout, _) = setup();
        let mut drag = DragController::default();
        let seat = NodeId::new("SEAT_1_1");
        let start = layout.position_of(&seat).expect("seat");
        assert!(!drag.start(&layout, &seat, start, &SelectionController::new()));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_leaf_drop_commits() {
        let (tree, layout, config) = setup();
        let mut drag = DragController::default();
        let outcome = drag_onto(&mut drag, &tree, &layout, &config, "C", "Root");
        assert_eq!(
            outcome,
            DropOutcome::Commit(Mutation::Move {
                node: NodeId::new("C"),
                target: NodeId::new("Root"),
                with_children: true,
            })
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_parent_drop_asks_about_children() {
        let (tree, layout, config) = setup();
        let mut drag = DragController::default();
        let outcome = drag_onto(&mut drag, &tree, &layout, &config, "A", "D");
        assert!(matches!(
            outcome,
            DropOutcome::Pending(PendingMutation::MoveChoice { child_count: 2, .. })
        ));
    }

    #[test]
    fn test_manager_drop_asks_to_assign() {
        let (tree, layout, config) = setup();
        let mut drag = DragController::default();
        let outcome = drag_onto(&mut drag, &tree, &layout, &config, "M", "B");
        assert!(matches!(
            outcome,
            DropOutcome::Pending(PendingMutation::AssignChoice { team_count: 1, .. })
        ));
    }

    #[test]
    fn test_drop_on_descendant_is_rejected() {
        let (tree, layout, config) = setup();
        let mut drag = DragController::default();
        let outcome = drag_onto(&mut drag, &tree, &layout, &config, "A", "B");
        assert_eq!(
            outcome,
            DropOutcome::Rejected(EditorError::cycle(&NodeId::new("A"), &NodeId::new("B")))
        );
    }

    #[test]
    fn test_far_drop_cancels() {
        let (tree, layout, config) = setup();
        let mut drag = DragController::default();
        let c = NodeId::new("C");
        let start = layout.position_of(&c).expect("C");
        drag.start(&layout, &c, start, &SelectionController::new());
        let outcome = drag.end(&tree, &layout, &config, start.offset(5000.0, 5000.0));
        assert_eq!(outcome, DropOutcome::Cancelled);
    }

    #[test]
    fn test_multi_drag_moves_group_rigidly() {
        let (tree, layout, config) = setup();
        let mut selection = SelectionController::new();
        selection.toggle(&NodeId::new("B"), true);
        selection.toggle(&NodeId::new("D"), true);
        let mut drag = DragController::default();
        let b = NodeId::new("B");
        let start = layout.position_of(&b).expect("B");
        assert!(drag.start(&layout, &b, start, &selection));

        let frame = drag
            .move_to(&layout, &config, start.offset(10.0, 20.0))
            .expect("dragging");
        assert!(frame.ghost.is_none());
        for (id, position) in &frame.positions {
            let origin = layout.position_of(id).expect("member");
            assert_eq!(*position, origin.offset(10.0, 20.0));
        }
        assert_eq!(frame.positions.len(), 2);
        assert!(frame.links.iter().any(|l| l.to == NodeId::new("D")));

        let root = layout.position_of(&NodeId::new("Root")).expect("root");
        let outcome = drag.end(&tree, &layout, &config, root);
        assert_eq!(
            outcome,
            DropOutcome::Pending(PendingMutation::MultiMoveChoice {
                nodes: vec![NodeId::new("B"), NodeId::new("D")],
                target: NodeId::new("Root"),
            })
        );
    }

    #[test]
    fn test_single_drag_leaves_ghost() {
        let (_, layout, config) = setup();
        let mut drag = DragController::default();
        let c = NodeId::new("C");
        let start = layout.position_of(&c).expect("C");
        drag.start(&layout, &c, start, &SelectionController::new());
        let frame = drag
            .move_to(&layout, &config, start.offset(3.0, 4.0))
            .expect("dragging");
        assert_eq!(frame.ghost, Some(start));
        assert_eq!(frame.links.len(), 1);
    }
}
