//! Running a parsed script against an editor session

use tracing::debug;

use crate::editor::{EditorError, EditorSession, EntityKind, FinishAction, Mutation};
use crate::hierarchy::NodeId;
use crate::store::{HierarchyStore, Request};

use super::ast::{Command, Script, Spanned};
use super::error::ScriptError;
use super::grammar::parse;

/// What a script run did, one line per command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptReport {
    pub executed: usize,
    pub log: Vec<String>,
}

/// Parse and run `source`. Stops at the first rejected command.
pub fn run_script<S: HierarchyStore + ?Sized>(
    session: &mut EditorSession,
    store: &mut S,
    source: &str,
) -> Result<ScriptReport, ScriptError> {
    let script = parse(source).map_err(ScriptError::Parse)?;
    execute(session, store, &script)
}

/// Run an already parsed script
pub fn execute<S: HierarchyStore + ?Sized>(
    session: &mut EditorSession,
    store: &mut S,
    script: &Script,
) -> Result<ScriptReport, ScriptError> {
    let mut report = ScriptReport::default();
    for command in &script.commands {
        let line = run_command(session, store, &command.node).map_err(|source| {
            ScriptError::Command {
                command: command.node.name(),
                span: command.span.clone(),
                source,
            }
        })?;
        debug!(command = command.node.name(), "{line}");
        report.executed += 1;
        report.log.push(line);
    }
    Ok(report)
}

fn ids(refs: &[Spanned<NodeId>]) -> Vec<NodeId> {
    refs.iter().map(|r| r.node.clone()).collect()
}

fn run_command<S: HierarchyStore + ?Sized>(
    session: &mut EditorSession,
    store: &mut S,
    command: &Command,
) -> Result<String, EditorError> {
    let line = match command {
        Command::Move {
            node,
            target,
            with_children,
        } => {
            session.commit(&Mutation::Move {
                node: node.node.clone(),
                target: target.node.clone(),
                with_children: *with_children,
            })?;
            format!("moved {} under {}", node.node, target.node)
        }
        Command::Bulk { nodes, target } => {
            let outcome = session.commit(&Mutation::BulkMove {
                nodes: ids(nodes),
                target: target.node.clone(),
            })?;
            format!(
                "moved {} under {}, skipped {}",
                outcome.moved.len(),
                target.node,
                outcome.skipped.len()
            )
        }
        Command::Swap { manager1, manager2 } => {
            let request = Request::SwapManagers {
                manager1: manager1.node.clone(),
                manager2: manager2.node.clone(),
            };
            session.execute(store, request)?;
            format!("swapped teams of {} and {}", manager1.node, manager2.node)
        }
        Command::AssignTeam {
            old_manager,
            new_manager,
        } => {
            let request = Request::AssignTeam {
                old_manager: old_manager.node.clone(),
                new_manager: new_manager.node.clone(),
            };
            session.execute(store, request)?;
            format!("assigned team of {} to {}", old_manager.node, new_manager.node)
        }
        Command::AssignPerson { person, manager } => {
            let request = Request::AssignPerson {
                person: person.node.clone(),
                target_manager: manager.node.clone(),
            };
            session.execute(store, request)?;
            format!("assigned {} to {}", person.node, manager.node)
        }
        Command::Select(node) => {
            if !session.tree().contains(&node.node) {
                return Err(EditorError::not_found(EntityKind::Node, node.node.as_str()));
            }
            if !session.selection().is_selected(&node.node) {
                session.click(&node.node, true);
            }
            format!("selected {}", node.node)
        }
        Command::Clear => {
            session.clear_selection();
            "cleared selection".to_string()
        }
        Command::Undo => {
            if session.undo() {
                "undone".to_string()
            } else {
                "nothing to undo".to_string()
            }
        }
        Command::Redo => {
            if session.redo() {
                "redone".to_string()
            } else {
                "nothing to redo".to_string()
            }
        }
        Command::Save => {
            let request = session.save_request()?;
            match session.execute(store, request)? {
                FinishAction::Saved => "saved".to_string(),
                other => format!("save finished: {other:?}"),
            }
        }
        Command::Focus(node) => {
            let target = node.as_ref().map(|n| &n.node);
            session.focus(target)?;
            settle(session);
            match target {
                Some(id) => format!("focused {id}"),
                None => "focused root".to_string(),
            }
        }
        Command::ZoomIn => {
            session.zoom_in();
            settle(session);
            "zoomed in".to_string()
        }
        Command::ZoomOut => {
            session.zoom_out();
            settle(session);
            "zoomed out".to_string()
        }
        Command::Reset => {
            session.reset_view();
            settle(session);
            "reset view".to_string()
        }
    };
    Ok(line)
}

/// Scripts have no frame clock; finish the viewport transition at once
fn settle(session: &mut EditorSession) {
    let duration = session.viewport().config().transition_ms;
    session.viewport_mut().advance(duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use crate::hierarchy::EmployeeRecord;
    use crate::levels::LevelCatalog;
    use crate::store::InMemoryStore;

    fn records() -> Vec<EmployeeRecord> {
        vec![
            EmployeeRecord::new("R", "Root").manager(),
            EmployeeRecord::new("A", "Ann").manager().with_manager("Root"),
            EmployeeRecord::new("B", "Ben").with_manager("Ann"),
            EmployeeRecord::new("C", "Cat").with_manager("Ann"),
        ]
    }

    fn setup() -> (EditorSession, InMemoryStore) {
        let mut session = EditorSession::new(
            EditorConfig::new().with_root_name("Root"),
            LevelCatalog::new(),
        );
        session.load(records());
        (session, InMemoryStore::new(records()))
    }

    fn parent(session: &EditorSession, id: &str) -> Option<String> {
        session
            .tree()
            .parent_of(&NodeId::new(id))
            .map(|n| n.id.to_string())
    }

    #[test]
    fn test_moves_and_undo() {
        let (mut session, mut store) = setup();
        let report = run_script(&mut session, &mut store, "move C -> R\nundo\nredo").expect("runs");
        assert_eq!(report.executed, 3);
        assert_eq!(parent(&session, "C").as_deref(), Some("R"));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_rejected_step_stops_and_keeps_earlier() {
        let (mut session, mut store) = setup();
        let err = run_script(&mut session, &mut store, "move C -> R\nmove A -> B\nmove B -> R")
            .unwrap_err();
        match err {
            ScriptError::Command { command, span, source } => {
                assert_eq!(command, "move");
                assert_eq!(span, 12..23);
                assert!(matches!(source, EditorError::CycleViolation { .. }));
            }
            other => panic!("Expected command error, got {:?}", other),
        }
        assert_eq!(parent(&session, "C").as_deref(), Some("R"));
        assert_eq!(parent(&session, "B").as_deref(), Some("A"));
    }

    #[test]
    fn test_server_op_then_save() {
        let (mut session, mut store) = setup();
        run_script(&mut session, &mut store, "assign person B -> R\nsave").expect("runs");
        assert_eq!(store.manager_of("B").as_deref(), Some("R"));
        assert_eq!(parent(&session, "B").as_deref(), Some("R"));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_select_unknown_node() {
        let (mut session, mut store) = setup();
        let err = run_script(&mut session, &mut store, "select Z").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Command {
                source: EditorError::NotFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_focus_settles_viewport() {
        let (mut session, mut store) = setup();
        run_script(&mut session, &mut store, "focus A").expect("runs");
        assert!(!session.viewport().is_animating());
        assert!((session.viewport().transform().scale - 1.2).abs() < 1e-9);
    }
}
