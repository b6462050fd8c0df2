//! The interactive editor core
//!
//! Controllers for the viewport, selection, drag and drop, and history, the
//! mutation engine they commit through, and [`EditorSession`], which owns one
//! of each for a mounted chart.

pub mod drag;
pub mod error;
pub mod history;
pub mod keys;
pub mod mutation;
pub mod notice;
pub mod pending;
pub mod selection;
pub mod session;
pub mod viewport;

pub use drag::{DragConfig, DragController, DragFrame, DragState, DropOutcome};
pub use error::{EditorError, EntityKind};
pub use history::{History, HistoryManager};
pub use keys::{match_shortcut, KeyEvent, KeyResponse, Shortcut};
pub use mutation::{
    assign_person, assign_team, bulk_move, move_node, save_changes, swap_managers,
    AssignPersonSummary, AssignTeamSummary, ManagerChange, Mutation, MutationOutcome, SwapSummary,
};
pub use notice::{Notice, NoticeBoard, NoticeConfig, NoticeKind};
pub use pending::{DialogChoice, PendingMutation, Resolution};
pub use selection::SelectionController;
pub use session::{EditorConfig, EditorSession, FinishAction, NO_DATA_ID};
pub use viewport::{Transform, ViewportConfig, ViewportController};
