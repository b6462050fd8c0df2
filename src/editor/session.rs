//! One mounted editor
//!
//! `EditorSession` owns exactly one of each controller and routes gestures,
//! dialogs, shortcuts and store requests between them. It does no I/O itself:
//! a server-delegated operation is started with [`EditorSession::begin`],
//! sent by the caller, and completed with [`EditorSession::finish`]. Local
//! state is never patched for server-delegated operations; a success asks the
//! caller to refetch and [`EditorSession::load`] the fresh records.

use tracing::{debug, info, warn};

use crate::hierarchy::{BuildWarning, EmployeeRecord, HierarchyBuilder, NodeId, TreeNode};
use crate::layout::{ChartLayout, LayoutConfig, Point, TreeLayoutEngine};
use crate::levels::LevelCatalog;
use crate::store::{dispatch, HierarchyStore, Request, Response, StoreError};

use super::drag::{DragConfig, DragController, DragFrame, DropOutcome};
use super::error::{EditorError, EntityKind};
use super::history::HistoryManager;
use super::keys::{match_shortcut, KeyEvent, KeyResponse, Shortcut};
use super::mutation::{save_changes, Mutation, MutationOutcome};
use super::notice::{NoticeBoard, NoticeConfig};
use super::pending::{DialogChoice, PendingMutation, Resolution};
use super::selection::SelectionController;
use super::viewport::{ViewportConfig, ViewportController};

/// Id of the placeholder node shown when there are no records
pub const NO_DATA_ID: &str = "__no_data__";

/// Configuration for an editor session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub drag: DragConfig,
    pub notice: NoticeConfig,
    /// Display name of the designated top-of-chart person
    pub root_name: Option<String>,
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_drag(mut self, drag: DragConfig) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }
}

/// What the caller should do after a request finished
#[derive(Debug, Clone, PartialEq)]
pub enum FinishAction {
    /// The save went through; history now holds only the saved snapshot
    Saved,
    /// Refetch the records and `load` them
    Refetch,
    /// The request failed; tree and history are untouched
    Failed(EditorError),
    /// No request was in flight
    Ignored,
}

/// The editor core for one mounted chart
#[derive(Debug, Clone)]
pub struct EditorSession {
    builder: HierarchyBuilder,
    engine: TreeLayoutEngine,
    records: Vec<EmployeeRecord>,
    warnings: Vec<BuildWarning>,
    has_data: bool,
    history: HistoryManager,
    layout: ChartLayout,
    viewport: ViewportController,
    selection: SelectionController,
    drag: DragController,
    pending: Option<PendingMutation>,
    notices: NoticeBoard,
    in_flight: Option<Request>,
}

fn placeholder() -> TreeNode {
    TreeNode::from_record(EmployeeRecord::new(NO_DATA_ID, "No data"))
}

impl EditorSession {
    pub fn new(config: EditorConfig, levels: LevelCatalog) -> Self {
        let builder = match &config.root_name {
            Some(name) => HierarchyBuilder::new().with_root_name(name.clone()),
            None => HierarchyBuilder::new(),
        };
        let engine = TreeLayoutEngine::new(config.layout, levels);
        let tree = placeholder();
        let layout = engine.layout(&tree);
        Self {
            builder,
            engine,
            records: vec![],
            warnings: vec![],
            has_data: false,
            history: HistoryManager::new(tree),
            layout,
            viewport: ViewportController::new(config.viewport),
            selection: SelectionController::new(),
            drag: DragController::new(config.drag),
            pending: None,
            notices: NoticeBoard::new(config.notice),
            in_flight: None,
        }
    }

    /// Rebuild from a fresh record list. History restarts at the new tree.
    pub fn load(&mut self, records: Vec<EmployeeRecord>) {
        let (tree, warnings, has_data) = match self.builder.build_report(&records) {
            Some(report) => (report.root, report.warnings, true),
            None => (placeholder(), vec![], false),
        };
        debug!(records = records.len(), nodes = tree.count(), "loaded records");
        self.records = records;
        self.warnings = warnings;
        self.has_data = has_data;
        self.history.reset_to(tree);
        self.drag.cancel();
        self.viewport.suppress_panning(false);
        self.pending = None;
        self.selection.retain_existing(self.history.current());
        self.relayout();
    }

    /// Swap in a new level catalog and relayout
    pub fn set_levels(&mut self, levels: LevelCatalog) {
        self.engine.levels = levels;
        self.relayout();
    }

    pub fn tree(&self) -> &TreeNode {
        self.history.current()
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn levels(&self) -> &LevelCatalog {
        &self.engine.levels
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.engine.config
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn pending(&self) -> Option<&PendingMutation> {
        self.pending.as_ref()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&Request> {
        self.in_flight.as_ref()
    }

    fn relayout(&mut self) {
        self.layout = self.engine.layout(self.history.current());
    }

    // Selection

    /// A click on a node. Returns the ids to restyle.
    pub fn click(&mut self, id: &NodeId, multi: bool) -> Vec<NodeId> {
        if !self.tree().contains(id) {
            return vec![];
        }
        self.selection.toggle(id, multi)
    }

    pub fn clear_selection(&mut self) -> Vec<NodeId> {
        self.selection.clear()
    }

    // Drag and drop

    /// Start a drag on `node` at a screen-space pointer position
    pub fn pointer_down(&mut self, node: &NodeId, screen: Point) -> bool {
        if self.is_busy() || self.pending.is_some() {
            return false;
        }
        let pointer = self.viewport.to_chart(screen);
        let started = self.drag.start(&self.layout, node, pointer, &self.selection);
        if started {
            self.viewport.suppress_panning(true);
        }
        started
    }

    pub fn pointer_move(&mut self, screen: Point) -> Option<DragFrame> {
        let pointer = self.viewport.to_chart(screen);
        self.drag.move_to(&self.layout, &self.engine.config, pointer)
    }

    /// Finish a drag. Commits, opens a dialog, or reverts, depending on the drop.
    pub fn pointer_up(&mut self, screen: Point) -> DropOutcome {
        if !self.drag.is_dragging() {
            return DropOutcome::Cancelled;
        }
        let pointer = self.viewport.to_chart(screen);
        let outcome = self
            .drag
            .end(self.history.current(), &self.layout, &self.engine.config, pointer);
        self.viewport.suppress_panning(false);

        match &outcome {
            DropOutcome::Cancelled => self.relayout(),
            DropOutcome::Rejected(err) => {
                self.notices.report(err);
                self.relayout();
            }
            DropOutcome::Pending(pending) => {
                self.pending = Some(pending.clone());
            }
            DropOutcome::Commit(mutation) => {
                if let Err(err) = self.commit(mutation) {
                    self.notices.report(&err);
                }
            }
        }
        outcome
    }

    /// Abandon the current drag
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
        self.viewport.suppress_panning(false);
        self.relayout();
    }

    // Mutations

    /// Apply a local edit, push it into history, and relayout.
    ///
    /// A bulk move where every member was skipped does not create a history
    /// entry.
    pub fn commit(&mut self, mutation: &Mutation) -> Result<MutationOutcome, EditorError> {
        if self.is_busy() {
            return Err(EditorError::Busy);
        }
        let outcome = mutation.apply(self.history.current())?;
        if !outcome.skipped.is_empty() {
            info!(skipped = outcome.skipped.len(), "bulk move skipped members");
        }
        if outcome.is_noop() {
            return Ok(outcome);
        }
        self.history.push(outcome.tree.clone());
        self.selection.clear();
        self.relayout();
        Ok(outcome)
    }

    /// Open the swap dialog for exactly two selected managers
    pub fn propose_swap(&mut self) -> Result<&PendingMutation, EditorError> {
        let [first, second] = self.selection.selected_ids() else {
            return Err(EditorError::validation(
                "select exactly two managers to swap",
            ));
        };
        for id in [first, second] {
            let node = self
                .tree()
                .find(id)
                .ok_or_else(|| EditorError::not_found(EntityKind::Manager, id.as_str()))?;
            if !node.is_manager() {
                return Err(EditorError::validation(format!(
                    "'{}' is not a manager",
                    node.display_name()
                )));
            }
        }
        let pending = PendingMutation::SwapChoice {
            manager1: first.clone(),
            manager2: second.clone(),
        };
        let pending: &PendingMutation = self.pending.insert(pending);
        Ok(pending)
    }

    /// Resolve the open dialog. A local choice is committed right away; a
    /// server-delegated one is returned for the caller to `begin`.
    pub fn resolve_dialog(&mut self, choice: DialogChoice) -> Result<Option<Request>, EditorError> {
        if self.is_busy() {
            return Err(EditorError::Busy);
        }
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| EditorError::validation("no dialog is open"))?;
        let resolution = pending.resolve(choice)?;
        self.pending = None;
        match resolution {
            Resolution::Commit(mutation) => {
                if let Err(err) = self.commit(&mutation) {
                    self.notices.report(&err);
                    return Err(err);
                }
                Ok(None)
            }
            Resolution::Request(request) => Ok(Some(request)),
        }
    }

    pub fn cancel_dialog(&mut self) {
        if self.pending.take().is_some() {
            self.relayout();
        }
    }

    // History

    /// Whether [`undo`](Self::undo) would step back right now
    pub fn can_undo(&self) -> bool {
        !self.is_busy() && !self.drag.is_dragging() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_busy() && !self.drag.is_dragging() && self.history.can_redo()
    }

    /// Step back. Ignored while busy, dragging, or at the oldest entry.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.history.undo();
        self.after_history_step();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.history.redo();
        self.after_history_step();
        true
    }

    fn after_history_step(&mut self) {
        self.selection.retain_existing(self.history.current());
        self.relayout();
    }

    /// Route a key press. Shortcuts always prevent the default, but do
    /// nothing while a request is in flight.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyResponse {
        let Some(shortcut) = match_shortcut(event) else {
            return KeyResponse::default();
        };
        let mut response = KeyResponse {
            handled: None,
            prevent_default: true,
        };
        if self.is_busy() {
            debug!(?shortcut, "shortcut ignored while busy");
            return response;
        }
        let ran = match shortcut {
            Shortcut::Undo => self.undo(),
            Shortcut::Redo => self.redo(),
            Shortcut::Save => match self.save_request() {
                Ok(request) => self.begin(request).is_ok(),
                Err(_) => false,
            },
        };
        if ran {
            response.handled = Some(shortcut);
        }
        response
    }

    // Viewport

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset(&self.layout);
    }

    /// Centre `node`, or the root when `None`, on a freshly computed layout
    pub fn focus(&mut self, node: Option<&NodeId>) -> Result<(), EditorError> {
        self.relayout();
        self.viewport.focus(&self.layout, node)
    }

    /// Advance animations and notice timers
    pub fn tick(&mut self, dt_ms: f64) {
        self.viewport.advance(dt_ms);
        self.notices.tick(dt_ms);
    }

    // Requests

    /// The save payload for the current snapshot. Refused until records are loaded.
    pub fn save_request(&self) -> Result<Request, EditorError> {
        if !self.has_data() {
            return Err(EditorError::validation("no chart data loaded"));
        }
        Ok(Request::Save(save_changes(self.history.current())))
    }

    /// Delete the selected seats
    pub fn delete_seats_request(&self) -> Result<Request, EditorError> {
        let seats = self.selection.selected_seat_ids();
        if seats.is_empty() {
            return Err(EditorError::validation("no seats selected"));
        }
        Ok(Request::DeleteSeats(seats.to_vec()))
    }

    /// Mark `request` as in flight. Fails with `Busy` if one already is.
    pub fn begin(&mut self, request: Request) -> Result<&Request, EditorError> {
        if self.is_busy() {
            return Err(EditorError::Busy);
        }
        debug!(request = request.name(), "request started");
        let request: &Request = self.in_flight.insert(request);
        Ok(request)
    }

    /// Complete the in-flight request with the store's answer
    pub fn finish(&mut self, result: Result<Response, StoreError>) -> FinishAction {
        let Some(request) = self.in_flight.take() else {
            warn!("finish called with no request in flight");
            return FinishAction::Ignored;
        };
        match result {
            Ok(_) if matches!(request, Request::Save(_)) => {
                let saved = self.history.current().clone();
                self.history.reset_to(saved);
                info!("saved");
                FinishAction::Saved
            }
            Ok(response) => {
                debug!(request = request.name(), ?response, "request succeeded");
                FinishAction::Refetch
            }
            Err(err) => {
                let err = EditorError::from(err);
                self.notices.report(&err);
                FinishAction::Failed(err)
            }
        }
    }

    /// Send the in-flight request to `store` and apply the result,
    /// refetching when the store asks for it
    pub fn run_in_flight<S: HierarchyStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<FinishAction, EditorError> {
        let Some(request) = self.in_flight.clone() else {
            return Ok(FinishAction::Ignored);
        };
        let result = dispatch(store, &request);
        let action = self.finish(result);
        match &action {
            FinishAction::Refetch => self.refetch(&*store)?,
            FinishAction::Failed(err) => return Err(err.clone()),
            FinishAction::Saved | FinishAction::Ignored => {}
        }
        Ok(action)
    }

    /// `begin`, send, `finish`, and refetch, all in one step
    pub fn execute<S: HierarchyStore + ?Sized>(
        &mut self,
        store: &mut S,
        request: Request,
    ) -> Result<FinishAction, EditorError> {
        self.begin(request)?;
        self.run_in_flight(store)
    }

    /// Reload records and levels from `store`
    pub fn refetch<S: HierarchyStore + ?Sized>(&mut self, store: &S) -> Result<(), EditorError> {
        let fetched = store
            .list_employees()
            .and_then(|records| Ok((records, store.list_levels()?)));
        match fetched {
            Ok((records, levels)) => {
                self.engine.levels = levels;
                self.load(records);
                Ok(())
            }
            Err(err) => {
                let err = EditorError::from(err);
                self.notices.report(&err);
                Err(err)
            }
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default(), LevelCatalog::new())
    }
}
