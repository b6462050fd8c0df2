//! Syntax tree of an edit script

use crate::hierarchy::NodeId;

pub use super::lexer::Span;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A node reference as written in the script
pub type NodeRef = Spanned<NodeId>;

/// One script command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `move A -> B [with_children: false]`
    Move {
        node: NodeRef,
        target: NodeRef,
        with_children: bool,
    },
    /// `bulk A, B -> T`
    Bulk { nodes: Vec<NodeRef>, target: NodeRef },
    /// `swap M1 <-> M2`
    Swap { manager1: NodeRef, manager2: NodeRef },
    /// `assign team OLD -> NEW`
    AssignTeam {
        old_manager: NodeRef,
        new_manager: NodeRef,
    },
    /// `assign person P -> M`
    AssignPerson { person: NodeRef, manager: NodeRef },
    Select(NodeRef),
    Clear,
    Undo,
    Redo,
    Save,
    /// `focus A`, or `focus root` for `None`
    Focus(Option<NodeRef>),
    ZoomIn,
    ZoomOut,
    Reset,
}

impl Command {
    /// Keyword-style name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Move { .. } => "move",
            Command::Bulk { .. } => "bulk",
            Command::Swap { .. } => "swap",
            Command::AssignTeam { .. } => "assign team",
            Command::AssignPerson { .. } => "assign person",
            Command::Select(_) => "select",
            Command::Clear => "clear",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Save => "save",
            Command::Focus(_) => "focus",
            Command::ZoomIn => "zoom in",
            Command::ZoomOut => "zoom out",
            Command::Reset => "reset",
        }
    }
}

/// A parsed script
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub commands: Vec<Spanned<Command>>,
}
