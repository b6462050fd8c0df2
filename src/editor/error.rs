//! Error types for the editor core

use std::fmt;

use thiserror::Error;

use crate::hierarchy::NodeId;

/// Which kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Manager,
    Target,
    Person,
    Seat,
    Department,
    Brand,
    Location,
    Company,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Manager => write!(f, "manager"),
            EntityKind::Target => write!(f, "target"),
            EntityKind::Person => write!(f, "person"),
            EntityKind::Seat => write!(f, "seat"),
            EntityKind::Department => write!(f, "department"),
            EntityKind::Brand => write!(f, "brand"),
            EntityKind::Location => write!(f, "location"),
            EntityKind::Company => write!(f, "company"),
        }
    }
}

/// Errors raised by editor operations. None of them is fatal: the worst
/// outcome is a discarded edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The edit would make a node its own ancestor
    #[error("moving '{node}' under '{target}' would create a reporting cycle")]
    CycleViolation { node: NodeId, target: NodeId },

    /// A referenced entity does not exist
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// The request breaks an input constraint
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    /// The persistence collaborator failed; the message is the server's
    #[error("{message}")]
    Persistence { message: String },

    /// A request is already in flight
    #[error("another request is still in progress")]
    Busy,
}

impl EditorError {
    pub fn cycle(node: &NodeId, target: &NodeId) -> Self {
        Self::CycleViolation {
            node: node.clone(),
            target: target.clone(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Cycle violations are shown as a transient notice, everything else blocks
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CycleViolation { .. })
    }
}
