//! Decisions waiting on the user
//!
//! A drop (or an explicit swap action) that needs confirmation yields one
//! [`PendingMutation`]. The dialog layer renders it by tag, offers
//! [`PendingMutation::choices`], and hands the picked [`DialogChoice`] back to
//! [`PendingMutation::resolve`].

use std::fmt;

use crate::hierarchy::{NodeId, TreeNode};
use crate::store::Request;

use super::error::EditorError;
use super::mutation::Mutation;

/// An edit that needs a dialog before it can happen
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    /// Single drag of a non-manager who still has reports
    MoveChoice {
        node: NodeId,
        target: NodeId,
        child_count: usize,
    },
    /// Drag of a multi-selection
    MultiMoveChoice { nodes: Vec<NodeId>, target: NodeId },
    /// Single drag of a manager
    AssignChoice {
        person: NodeId,
        target: NodeId,
        team_count: usize,
        target_is_manager: bool,
    },
    /// Two managers picked for a team exchange
    SwapChoice { manager1: NodeId, manager2: NodeId },
}

/// A button in the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    WithChildren,
    WithoutChildren,
    Confirm,
    /// Move only the manager; their reports stay with the old manager
    JustPerson,
    /// Move the manager together with their team
    WithTeam,
    /// Exchange teams with the target manager instead of moving
    SwapTeams,
}

impl fmt::Display for DialogChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DialogChoice::WithChildren => "Move with reports",
            DialogChoice::WithoutChildren => "Move without reports",
            DialogChoice::Confirm => "Move",
            DialogChoice::JustPerson => "Move just this person",
            DialogChoice::WithTeam => "Move with team",
            DialogChoice::SwapTeams => "Swap teams",
        };
        write!(f, "{label}")
    }
}

/// What a resolved dialog turns into
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Committed locally and pushed into history
    Commit(Mutation),
    /// Sent to the store; local state waits for the refetch
    Request(Request),
}

impl PendingMutation {
    pub fn target(&self) -> &NodeId {
        match self {
            PendingMutation::MoveChoice { target, .. }
            | PendingMutation::MultiMoveChoice { target, .. }
            | PendingMutation::AssignChoice { target, .. } => target,
            PendingMutation::SwapChoice { manager2, .. } => manager2,
        }
    }

    /// The buttons this dialog offers, besides cancel
    pub fn choices(&self) -> Vec<DialogChoice> {
        match self {
            PendingMutation::MoveChoice { .. } => {
                vec![DialogChoice::WithChildren, DialogChoice::WithoutChildren]
            }
            PendingMutation::MultiMoveChoice { .. } | PendingMutation::SwapChoice { .. } => {
                vec![DialogChoice::Confirm]
            }
            PendingMutation::AssignChoice {
                target_is_manager, ..
            } => {
                let mut choices = vec![DialogChoice::JustPerson, DialogChoice::WithTeam];
                if *target_is_manager {
                    choices.push(DialogChoice::SwapTeams);
                }
                choices
            }
        }
    }

    /// The dialog text, using display names from `tree` where it has them
    pub fn prompt(&self, tree: &TreeNode) -> String {
        let name = |id: &NodeId| {
            tree.find(id)
                .map(|node| node.display_name().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            PendingMutation::MoveChoice {
                node,
                target,
                child_count,
            } => format!(
                "Move {} under {}? They have {} direct report(s).",
                name(node),
                name(target),
                child_count
            ),
            PendingMutation::MultiMoveChoice { nodes, target } => {
                format!("Move {} people under {}?", nodes.len(), name(target))
            }
            PendingMutation::AssignChoice {
                person,
                target,
                team_count,
                ..
            } => format!(
                "Assign {} to {}? Their team has {} member(s).",
                name(person),
                name(target),
                team_count
            ),
            PendingMutation::SwapChoice { manager1, manager2 } => {
                format!("Swap the teams of {} and {}?", name(manager1), name(manager2))
            }
        }
    }

    /// Turn the user's pick into a local commit or a store request
    pub fn resolve(&self, choice: DialogChoice) -> Result<Resolution, EditorError> {
        if !self.choices().contains(&choice) {
            return Err(EditorError::validation(format!(
                "'{choice}' is not offered by this dialog"
            )));
        }
        let resolution = match (self, choice) {
            (PendingMutation::MoveChoice { node, target, .. }, choice) => {
                Resolution::Commit(Mutation::Move {
                    node: node.clone(),
                    target: target.clone(),
                    with_children: choice == DialogChoice::WithChildren,
                })
            }
            (PendingMutation::MultiMoveChoice { nodes, target }, _) => {
                Resolution::Commit(Mutation::BulkMove {
                    nodes: nodes.clone(),
                    target: target.clone(),
                })
            }
            (PendingMutation::AssignChoice { person, target, .. }, DialogChoice::SwapTeams) => {
                Resolution::Request(Request::SwapManagers {
                    manager1: person.clone(),
                    manager2: target.clone(),
                })
            }
            (PendingMutation::AssignChoice { person, target, .. }, choice) => {
                Resolution::Commit(Mutation::Move {
                    node: person.clone(),
                    target: target.clone(),
                    with_children: choice == DialogChoice::WithTeam,
                })
            }
            (PendingMutation::SwapChoice { manager1, manager2 }, _) => {
                Resolution::Request(Request::SwapManagers {
                    manager1: manager1.clone(),
                    manager2: manager2.clone(),
                })
            }
        };
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    #[test]
    fn test_move_choice_maps_to_move() {
        let pending = PendingMutation::MoveChoice {
            node: id("B"),
            target: id("Root"),
            child_count: 1,
        };
        assert_eq!(
            pending.resolve(DialogChoice::WithoutChildren),
            Ok(Resolution::Commit(Mutation::Move {
                node: id("B"),
                target: id("Root"),
                with_children: false,
            }))
        );
    }

    #[test]
    fn test_assign_choice_offers_swap_only_for_managers() {
        let mut pending = PendingMutation::AssignChoice {
            person: id("M1"),
            target: id("M2"),
            team_count: 3,
            target_is_manager: false,
        };
        assert_eq!(pending.choices().len(), 2);
        assert!(pending.resolve(DialogChoice::SwapTeams).is_err());

        if let PendingMutation::AssignChoice {
            target_is_manager, ..
        } = &mut pending
        {
            *target_is_manager = true;
        }
        assert_eq!(
            pending.resolve(DialogChoice::SwapTeams),
            Ok(Resolution::Request(Request::SwapManagers {
                manager1: id("M1"),
                manager2: id("M2"),
            }))
        );
    }

    #[test]
    fn test_multi_move_prompt_names_target_and_count() {
        let tree = TreeNode::leaf("Root");
        let pending = PendingMutation::MultiMoveChoice {
            nodes: vec![id("X"), id("Y")],
            target: id("Root"),
        };
        assert_eq!(pending.prompt(&tree), "Move 2 people under Root?");
        assert!(matches!(
            pending.resolve(DialogChoice::Confirm),
            Ok(Resolution::Commit(Mutation::BulkMove { .. }))
        ));
    }
}
