//! Server-delegated operations against the in-memory store

use org_chart::editor::{EditorConfig, EditorError, EditorSession, EntityKind, FinishAction, NoticeKind};
use org_chart::store::{dispatch, NewSeat, Response};
use org_chart::{EmployeeRecord, HierarchyStore, InMemoryStore, LevelCatalog, NodeId, Request, StoreError};
use pretty_assertions::assert_eq;

fn records() -> Vec<EmployeeRecord> {
    vec![
        EmployeeRecord::new("R", "Root").manager(),
        EmployeeRecord::new("M1", "Mia").manager().with_manager("Root"),
        EmployeeRecord::new("a1", "Al").with_manager("Mia"),
        EmployeeRecord::new("M2", "Max").manager().with_manager("Root"),
    ]
}

fn setup() -> (EditorSession, InMemoryStore) {
    let mut session = EditorSession::new(
        EditorConfig::new().with_root_name("Root"),
        LevelCatalog::new(),
    );
    session.load(records());
    let store = InMemoryStore::new(records())
        .with_company("ACME")
        .with_seat_epoch(1_700_000_000);
    (session, store)
}

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

#[test]
fn test_server_rejects_cycle() {
    let (mut session, mut store) = setup();
    let err = session
        .execute(
            &mut store,
            Request::AssignPerson {
                person: id("M1"),
                target_manager: id("a1"),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EditorError::CycleViolation { .. }));
    assert!(!session.is_busy());
    assert_eq!(
        session.notices().latest().map(|n| n.kind),
        Some(NoticeKind::Transient)
    );
    assert_eq!(store.manager_of("M1").as_deref(), Some("R"));
}

#[test]
fn test_add_then_delete_seat() {
    let (mut session, mut store) = setup();
    let action = session
        .execute(&mut store, Request::AddSeat(NewSeat::under("M1", "ACME")))
        .expect("seat added");
    assert_eq!(action, FinishAction::Refetch);

    let seat = id("SEAT_1700000000_1");
    let parent = session.tree().parent_of(&seat).map(|p| p.id.clone());
    assert_eq!(parent, Some(id("M1")));
    assert_eq!(
        session.tree().find(&seat).map(|n| n.display_name().to_string()),
        Some("Open seat".to_string())
    );

    session.click(&seat, true);
    assert_eq!(session.selection().selected_seat_ids(), &[seat.clone()]);
    let request = session.delete_seats_request().expect("seat selected");
    session.execute(&mut store, request).expect("deleted");
    assert!(!session.tree().contains(&seat));
    assert!(store.record(seat.as_str()).is_none());
}

#[test]
fn test_add_seat_checks_directory() {
    let (_, mut store) = setup();
    let err = store.add_seat(&NewSeat::under("M1", "Globex")).unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Company,
            id: "Globex".to_string()
        }
    );
    let err = store.add_seat(&NewSeat::under("nobody", "ACME")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: EntityKind::Manager, .. }));
    let err = store.add_seat(&NewSeat::default()).unwrap_err();
    assert_eq!(err, StoreError::Invalid("managerId is required".to_string()));
}

#[test]
fn test_delete_rejects_non_seats_before_deleting() {
    let (_, mut store) = setup();
    let seat = store.add_seat(&NewSeat::under("M1", "ACME")).expect("added");
    let err = store
        .delete_seats(&[NodeId::new(seat.id.clone()), id("a1")])
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(store.record(&seat.id).is_some());
}

#[test]
fn test_swap_summary_counts() {
    let (_, mut store) = setup();
    let response = dispatch(
        &mut store,
        &Request::SwapManagers {
            manager1: id("M1"),
            manager2: id("M2"),
        },
    )
    .expect("swap");
    let Response::Swapped(summary) = response else {
        panic!("Expected a swap summary, got {:?}", response);
    };
    assert_eq!(summary.manager1_team_count, 1);
    assert_eq!(summary.manager2_team_count, 0);
    assert_eq!(summary.total_updated, 1);
    assert_eq!(store.manager_of("a1").as_deref(), Some("M2"));
}

#[test]
fn test_save_round_trip() {
    let (mut session, mut store) = setup();
    session
        .commit(&org_chart::Mutation::Move {
            node: id("a1"),
            target: id("M2"),
            with_children: true,
        })
        .expect("move");
    session.execute(&mut store, session.save_request().expect("payload")).expect("save");
    assert_eq!(store.manager_of("a1").as_deref(), Some("M2"));
    assert!(!session.history().can_undo());

    // A fresh session built from the store sees the saved tree
    let mut fresh = EditorSession::new(EditorConfig::new().with_root_name("Root"), LevelCatalog::new());
    fresh.refetch(&store).expect("list works");
    assert_eq!(fresh.tree().ids(), session.tree().ids());
    assert_eq!(
        fresh.tree().parent_of(&id("a1")).map(|p| p.id.clone()),
        Some(id("M2"))
    );
}

#[test]
fn test_outage_message_is_verbatim() {
    let (mut session, mut store) = setup();
    store.set_failure(Some("503 Service Unavailable"));
    let err = session.execute(&mut store, session.save_request().expect("payload")).unwrap_err();
    assert_eq!(err.to_string(), "503 Service Unavailable");
    assert_eq!(
        session.notices().latest().map(|n| (n.kind, n.message.clone())),
        Some((NoticeKind::Blocking, "503 Service Unavailable".to_string()))
    );
}
