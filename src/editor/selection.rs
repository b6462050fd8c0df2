//! Selection state for structural nodes and seats
//!
//! The controller is the single source of truth for "what is selected";
//! `selected_node` is derived on every read rather than cached.

use crate::hierarchy::{NodeId, TreeNode};

/// Tracks selected node ids and, separately, selected seat ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionController {
    /// Structural nodes in the order they were selected
    selected_ids: Vec<NodeId>,
    selected_seat_ids: Vec<NodeId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on `id`. Without the modifier this does nothing.
    ///
    /// Returns the ids whose selection styling changed, so the renderer can
    /// restyle them without a relayout.
    pub fn toggle(&mut self, id: &NodeId, multi: bool) -> Vec<NodeId> {
        if !multi {
            return vec![];
        }
        let set = if id.is_seat() {
            &mut self.selected_seat_ids
        } else {
            &mut self.selected_ids
        };
        match set.iter().position(|selected| selected == id) {
            Some(pos) => {
                set.remove(pos);
            }
            None => set.push(id.clone()),
        }
        vec![id.clone()]
    }

    /// Deselect everything, returning the ids that need restyling
    pub fn clear(&mut self) -> Vec<NodeId> {
        let mut changed = std::mem::take(&mut self.selected_ids);
        changed.append(&mut self.selected_seat_ids);
        changed
    }

    /// Drop ids that are no longer in `tree`
    pub fn retain_existing(&mut self, tree: &TreeNode) {
        self.selected_ids.retain(|id| tree.contains(id));
        self.selected_seat_ids.retain(|id| tree.contains(id));
    }

    pub fn selected_ids(&self) -> &[NodeId] {
        &self.selected_ids
    }

    pub fn selected_seat_ids(&self) -> &[NodeId] {
        &self.selected_seat_ids
    }

    /// The selected node when exactly one structural node is selected
    pub fn selected_node(&self) -> Option<&NodeId> {
        match self.selected_ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected_ids.contains(id) || self.selected_seat_ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty() && self.selected_seat_ids.is_empty()
    }
}
