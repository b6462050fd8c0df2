//! Org Chart - an editor core for company reporting hierarchies
//!
//! This library builds a reporting tree from flat employee records, lays it
//! out as a chart, and edits it through drag-and-drop style mutations with
//! undo/redo and a save protocol against a pluggable store.
//!
//! # Example
//!
//! ```rust
//! use org_chart::{render_chart, ChartOptions, ChartSettings, EmployeeRecord};
//!
//! let records = vec![
//!     EmployeeRecord::new("E1", "Ada").manager(),
//!     EmployeeRecord::new("E2", "Bob").with_manager("Ada"),
//! ];
//! let svg = render_chart(records, &ChartSettings::default(), &ChartOptions::new()).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod editor;
pub mod hierarchy;
pub mod layout;
pub mod levels;
pub mod renderer;
pub mod script;
pub mod store;

pub use editor::{EditorConfig, EditorError, EditorSession, Mutation};
pub use hierarchy::{load_records, EmployeeRecord, HierarchyBuilder, NodeId, RecordsError, TreeNode};
pub use layout::{ChartLayout, LayoutConfig, TreeLayoutEngine};
pub use levels::{ChartSettings, LevelCatalog, Palette, SettingsError};
pub use renderer::{render_outline, render_svg, RenderState, SvgConfig};
pub use script::{run_script, ScriptError};
pub use store::{HierarchyStore, InMemoryStore, Request, StoreError};

use thiserror::Error;
use tracing::debug;

use editor::save_changes;
use renderer::render_svg_with_levels;

/// Errors that can occur in the chart pipeline
#[derive(Debug, Error)]
pub enum ChartError {
    /// The record list could not be decoded
    #[error("records: {0}")]
    Records(#[from] RecordsError),

    #[error("settings: {0}")]
    Levels(#[from] SettingsError),

    #[error("script: {0}")]
    Script(#[from] ScriptError),

    #[error("{0}")]
    Editor(#[from] EditorError),

    #[error("failed to serialise output: {0}")]
    Output(#[from] serde_json::Error),
}

/// What the pipeline writes out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Svg,
    /// Indented text tree
    Outline,
    /// The save payload as JSON
    Changes,
}

/// Configuration for the complete pipeline
#[derive(Debug, Clone, Default)]
pub struct ChartOptions {
    pub editor: EditorConfig,
    pub svg: SvgConfig,
    pub format: OutputFormat,
    /// Edit script applied before output
    pub script: Option<String>,
    /// Centre the viewport on this node; SVG output then uses the viewport
    pub focus: Option<NodeId>,
}

impl ChartOptions {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_editor(mut self, config: EditorConfig) -> Self {
        self.editor = config;
        self
    }

    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_script(mut self, source: impl Into<String>) -> Self {
        self.script = Some(source.into());
        self
    }

    pub fn with_focus(mut self, id: impl Into<NodeId>) -> Self {
        self.focus = Some(id.into());
        self
    }
}

/// Build, optionally edit, and render a chart from a record list
///
/// The designated root comes from `options.editor` when set, otherwise from
/// the settings file. Script steps that change server state run against an
/// in-memory store seeded with the same records.
pub fn render_chart(
    records: Vec<EmployeeRecord>,
    settings: &ChartSettings,
    options: &ChartOptions,
) -> Result<String, ChartError> {
    let mut config = options.editor.clone();
    if config.root_name.is_none() {
        config.root_name = settings.root_name.clone();
    }
    let mut store = InMemoryStore::new(records.clone()).with_levels(settings.levels.clone());
    if let Some(root) = &config.root_name {
        store = store.with_root_name(root.clone());
    }
    let mut session = EditorSession::new(config, settings.levels.clone());
    session.load(records);

    if let Some(source) = &options.script {
        let report = run_script(&mut session, &mut store, source)?;
        debug!(commands = report.executed, "script applied");
    }

    let state = match &options.focus {
        Some(id) => {
            session.focus(Some(id))?;
            let duration = session.viewport().config().transition_ms;
            session.viewport_mut().advance(duration);
            RenderState::from_session(&session)
        }
        None => RenderState::new().with_selected(
            session
                .selection()
                .selected_ids()
                .iter()
                .chain(session.selection().selected_seat_ids())
                .cloned(),
        ),
    };

    let output = match options.format {
        OutputFormat::Svg => render_svg_with_levels(
            session.layout(),
            &state,
            &settings.palette,
            session.levels(),
            &options.svg,
        ),
        OutputFormat::Outline => render_outline(session.tree()),
        OutputFormat::Changes => serde_json::to_string_pretty(&save_changes(session.tree()))?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<EmployeeRecord> {
        vec![
            EmployeeRecord::new("E1", "Ada").manager(),
            EmployeeRecord::new("E2", "Bob").manager().with_manager("Ada"),
            EmployeeRecord::new("E3", "Cy").with_manager("Bob"),
        ]
    }

    #[test]
    fn test_render_svg_contains_every_node() {
        let svg = render_chart(records(), &ChartSettings::default(), &ChartOptions::new()).unwrap();
        assert!(svg.contains(r#"id="E1""#));
        assert!(svg.contains(r#"id="E2""#));
        assert!(svg.contains(r#"id="E3""#));
    }

    #[test]
    fn test_script_then_outline() {
        let options = ChartOptions::new()
            .with_format(OutputFormat::Outline)
            .with_script("move E3 -> E1");
        let outline = render_chart(records(), &ChartSettings::default(), &options).unwrap();
        assert_eq!(outline, "Ada (E1) [manager]\n  Bob (E2) [manager]\n  Cy (E3)\n");
    }

    #[test]
    fn test_changes_output() {
        let options = ChartOptions::new().with_format(OutputFormat::Changes);
        let json = render_chart(records(), &ChartSettings::default(), &options).unwrap();
        assert!(json.contains(r#""newManagerId": "E2""#));
        assert!(json.contains(r#""newManagerId": null"#));
    }

    #[test]
    fn test_script_error_surfaces() {
        let options = ChartOptions::new().with_script("move E1 -> E3");
        let err = render_chart(records(), &ChartSettings::default(), &options).unwrap_err();
        assert!(matches!(err, ChartError::Script(ScriptError::Command { .. })));
    }

    #[test]
    fn test_unknown_focus() {
        let options = ChartOptions::new().with_focus("nobody");
        let err = render_chart(records(), &ChartSettings::default(), &options).unwrap_err();
        assert!(matches!(err, ChartError::Editor(EditorError::NotFound { .. })));
    }

    #[test]
    fn test_focus_uses_viewport() {
        let options = ChartOptions::new().with_focus("E2");
        let svg = render_chart(records(), &ChartSettings::default(), &options).unwrap();
        assert!(svg.contains(r#"viewBox="0 0 1200 800""#));
    }
}
