//! The persistence collaborator
//!
//! [`HierarchyStore`] is the boundary the editor talks to for everything that
//! outlives a session: the employee list, the level catalog, saves, and the
//! server-delegated swap/assign/seat operations. [`InMemoryStore`] is a
//! reference backend that keeps records in memory and re-verifies every
//! manager link by walking the chain, independent of the client tree.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::editor::error::{EditorError, EntityKind};
use crate::editor::mutation::{
    AssignPersonSummary, AssignTeamSummary, ManagerChange, SwapSummary,
};
use crate::hierarchy::{EmployeeRecord, NodeId, SEAT_PREFIX};
use crate::levels::LevelCatalog;

/// Errors reported by a store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// The server found a loop while walking the manager chain
    #[error("assigning '{node}' to '{manager}' would create a reporting cycle")]
    Cycle { node: String, manager: String },

    #[error("invalid request: {0}")]
    Invalid(String),

    /// Transport or server failure, message passed through verbatim
    #[error("{0}")]
    Server(String),
}

impl StoreError {
    fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => EditorError::NotFound { entity, id },
            StoreError::Cycle { node, manager } => {
                EditorError::cycle(&NodeId::new(node), &NodeId::new(manager))
            }
            StoreError::Invalid(reason) => EditorError::Validation { reason },
            StoreError::Server(message) => EditorError::Persistence { message },
        }
    }
}

/// Fields of a seat to create
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSeat {
    pub manager_id: Option<String>,
    pub company_id: Option<String>,
    pub brand_id: Option<String>,
    pub location_id: Option<String>,
    pub department_id: Option<String>,
    pub show_in_chart: bool,
}

impl NewSeat {
    pub fn under(manager_id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            manager_id: Some(manager_id.into()),
            company_id: Some(company_id.into()),
            show_in_chart: true,
            ..Self::default()
        }
    }
}

/// A server-delegated operation
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Save(Vec<ManagerChange>),
    SwapManagers {
        manager1: NodeId,
        manager2: NodeId,
    },
    AssignTeam {
        old_manager: NodeId,
        new_manager: NodeId,
    },
    AssignPerson {
        person: NodeId,
        target_manager: NodeId,
    },
    AddSeat(NewSeat),
    DeleteSeats(Vec<NodeId>),
}

impl Request {
    /// Short name for logs and notices
    pub fn name(&self) -> &'static str {
        match self {
            Request::Save(_) => "save",
            Request::SwapManagers { .. } => "swap managers",
            Request::AssignTeam { .. } => "assign team",
            Request::AssignPerson { .. } => "assign person",
            Request::AddSeat(_) => "add seat",
            Request::DeleteSeats(_) => "delete seats",
        }
    }
}

/// A successful store reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Response {
    Saved { updated: usize },
    Swapped(SwapSummary),
    TeamAssigned(AssignTeamSummary),
    PersonAssigned(AssignPersonSummary),
    SeatAdded { id: String },
    #[serde(rename_all = "camelCase")]
    SeatsDeleted { deleted_count: usize },
}

/// The external persistence interface
pub trait HierarchyStore {
    fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError>;

    fn list_levels(&self) -> Result<LevelCatalog, StoreError> {
        Ok(LevelCatalog::new())
    }

    fn save_hierarchy(&mut self, changes: &[ManagerChange]) -> Result<usize, StoreError>;

    fn swap_managers(
        &mut self,
        manager1: &NodeId,
        manager2: &NodeId,
    ) -> Result<SwapSummary, StoreError>;

    fn assign_team(
        &mut self,
        old_manager: &NodeId,
        new_manager: &NodeId,
    ) -> Result<AssignTeamSummary, StoreError>;

    fn assign_person(
        &mut self,
        person: &NodeId,
        target_manager: &NodeId,
    ) -> Result<AssignPersonSummary, StoreError>;

    fn add_seat(&mut self, seat: &NewSeat) -> Result<EmployeeRecord, StoreError>;

    fn delete_seats(&mut self, ids: &[NodeId]) -> Result<usize, StoreError>;
}

/// Send one request to a store
pub fn dispatch<S: HierarchyStore + ?Sized>(
    store: &mut S,
    request: &Request,
) -> Result<Response, StoreError> {
    let result = match request {
        Request::Save(changes) => store
            .save_hierarchy(changes)
            .map(|updated| Response::Saved { updated }),
        Request::SwapManagers { manager1, manager2 } => {
            store.swap_managers(manager1, manager2).map(Response::Swapped)
        }
        Request::AssignTeam {
            old_manager,
            new_manager,
        } => store
            .assign_team(old_manager, new_manager)
            .map(Response::TeamAssigned),
        Request::AssignPerson {
            person,
            target_manager,
        } => store
            .assign_person(person, target_manager)
            .map(Response::PersonAssigned),
        Request::AddSeat(seat) => store
            .add_seat(seat)
            .map(|record| Response::SeatAdded { id: record.id }),
        Request::DeleteSeats(ids) => store
            .delete_seats(ids)
            .map(|deleted_count| Response::SeatsDeleted { deleted_count }),
    };
    if let Err(err) = &result {
        warn!(request = request.name(), error = %err, "store request failed");
    }
    result
}

/// Display name given to newly created seats
pub const SEAT_DISPLAY_NAME: &str = "Open seat";

/// Reference store holding records in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<EmployeeRecord>,
    levels: LevelCatalog,
    companies: HashSet<String>,
    brands: HashSet<String>,
    locations: HashSet<String>,
    departments: HashSet<String>,
    /// Display name of the top-of-chart person, whose own manager link is ignored
    root_name: Option<String>,
    seat_epoch: u64,
    seat_counter: u64,
    /// When set, every mutating call fails with this message
    failure: Option<String>,
}

impl InMemoryStore {
    /// Build a store over `records`, registering the departments, locations
    /// and brands they mention
    pub fn new(records: Vec<EmployeeRecord>) -> Self {
        let mut store = Self {
            seat_epoch: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            ..Self::default()
        };
        for record in &records {
            store.departments.extend(record.department.clone());
            store.locations.extend(record.location.clone());
            store.brands.extend(record.brand.clone());
        }
        store.records = records;
        store
    }

    pub fn with_levels(mut self, levels: LevelCatalog) -> Self {
        self.levels = levels;
        self
    }

    /// Designate the top-of-chart person the same way the tree builder does
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn with_company(mut self, id: impl Into<String>) -> Self {
        self.companies.insert(id.into());
        self
    }

    pub fn with_brand(mut self, id: impl Into<String>) -> Self {
        self.brands.insert(id.into());
        self
    }

    /// Fix the timestamp part of generated seat ids
    pub fn with_seat_epoch(mut self, epoch: u64) -> Self {
        self.seat_epoch = epoch;
        self
    }

    /// Make every mutating call fail with `message`, or succeed again with `None`
    pub fn set_failure(&mut self, message: Option<&str>) {
        self.failure = message.map(str::to_string);
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&EmployeeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Current manager id of `id`, resolved by display name. The designated
    /// root has none.
    pub fn manager_of(&self, id: &str) -> Option<String> {
        if self.is_designated_root(id) {
            return None;
        }
        let record = self.record(id)?;
        let name = record.manager_name()?;
        self.records
            .iter()
            .find(|r| r.display_name == name && r.id != id)
            .map(|r| r.id.clone())
    }

    fn is_designated_root(&self, id: &str) -> bool {
        let Some(root) = self.root_name.as_deref() else {
            return false;
        };
        self.records
            .iter()
            .find(|r| r.display_name == root)
            .is_some_and(|r| r.id == id)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Server(message.clone())),
            None => Ok(()),
        }
    }

    fn require(&self, id: &NodeId, entity: EntityKind) -> Result<&EmployeeRecord, StoreError> {
        self.record(id.as_str())
            .ok_or_else(|| StoreError::not_found(entity, id.as_str()))
    }

    fn direct_reports(&self, manager: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.id != manager && self.manager_of(&r.id).as_deref() == Some(manager))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Verify and apply a batch of `(person, manager)` links.
    ///
    /// Each person's chain is walked upward with the batch applied; revisiting
    /// any id rejects the batch before a single record is written.
    fn commit_links(&mut self, links: &[(String, Option<String>)]) -> Result<usize, StoreError> {
        let overrides: HashMap<&str, Option<&str>> = links
            .iter()
            .map(|(person, manager)| (person.as_str(), manager.as_deref()))
            .collect();

        for (person, manager) in links {
            let Some(manager) = manager else { continue };
            let mut visited = HashSet::new();
            let mut cursor = Some(person.clone());
            while let Some(id) = cursor {
                if !visited.insert(id.clone()) {
                    return Err(StoreError::Cycle {
                        node: person.clone(),
                        manager: manager.clone(),
                    });
                }
                cursor = match overrides.get(id.as_str()) {
                    Some(next) => next.map(str::to_string),
                    None => self.manager_of(&id),
                };
            }
        }

        let names: HashMap<String, String> = links
            .iter()
            .filter_map(|(_, manager)| manager.as_ref())
            .filter_map(|id| self.record(id).map(|r| (id.clone(), r.display_name.clone())))
            .collect();
        for (person, manager) in links {
            if let Some(record) = self.records.iter_mut().find(|r| &r.id == person) {
                record.manager_name = manager.as_ref().and_then(|id| names.get(id).cloned());
            }
        }
        debug!(count = links.len(), "committed manager links");
        Ok(links.len())
    }

    fn next_seat_id(&mut self) -> String {
        loop {
            self.seat_counter += 1;
            let id = format!("{SEAT_PREFIX}{}_{}", self.seat_epoch, self.seat_counter);
            if self.record(&id).is_none() {
                return id;
            }
        }
    }
}

impl HierarchyStore for InMemoryStore {
    fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn list_levels(&self) -> Result<LevelCatalog, StoreError> {
        Ok(self.levels.clone())
    }

    fn save_hierarchy(&mut self, changes: &[ManagerChange]) -> Result<usize, StoreError> {
        self.check_available()?;
        let mut links = Vec::with_capacity(changes.len());
        for change in changes {
            self.require(&change.id, EntityKind::Person)?;
            if let Some(manager) = &change.new_manager_id {
                self.require(manager, EntityKind::Manager)?;
            }
            links.push((
                change.id.0.clone(),
                change.new_manager_id.as_ref().map(|m| m.0.clone()),
            ));
        }
        self.commit_links(&links)
    }

    fn swap_managers(
        &mut self,
        manager1: &NodeId,
        manager2: &NodeId,
    ) -> Result<SwapSummary, StoreError> {
        self.check_available()?;
        if manager1 == manager2 {
            return Err(StoreError::Invalid(
                "cannot swap a manager with themselves".into(),
            ));
        }
        let name1 = self.require(manager1, EntityKind::Manager)?.display_name.clone();
        let name2 = self.require(manager2, EntityKind::Manager)?.display_name.clone();
        let (m1, m2) = (manager1.0.clone(), manager2.0.clone());

        let team1: Vec<_> = self.direct_reports(&m1).into_iter().filter(|id| id != &m2).collect();
        let team2: Vec<_> = self.direct_reports(&m2).into_iter().filter(|id| id != &m1).collect();
        let mut links: Vec<(String, Option<String>)> = vec![];
        links.extend(team1.iter().map(|id| (id.clone(), Some(m2.clone()))));
        links.extend(team2.iter().map(|id| (id.clone(), Some(m1.clone()))));

        let parent1 = self.manager_of(&m1);
        let parent2 = self.manager_of(&m2);
        if parent2.as_deref() == Some(m1.as_str()) {
            links.push((m2.clone(), parent1));
            links.push((m1.clone(), Some(m2.clone())));
        } else if parent1.as_deref() == Some(m2.as_str()) {
            links.push((m1.clone(), parent2));
            links.push((m2.clone(), Some(m1.clone())));
        }

        let total_updated = self.commit_links(&links)?;
        Ok(SwapSummary {
            manager1_name: name1,
            manager2_name: name2,
            manager1_team_count: team1.len(),
            manager2_team_count: team2.len(),
            total_updated,
        })
    }

    fn assign_team(
        &mut self,
        old_manager: &NodeId,
        new_manager: &NodeId,
    ) -> Result<AssignTeamSummary, StoreError> {
        self.check_available()?;
        if old_manager == new_manager {
            return Err(StoreError::Invalid(
                "old and new manager must be different people".into(),
            ));
        }
        let old_name = self.require(old_manager, EntityKind::Manager)?.display_name.clone();
        let new_name = self.require(new_manager, EntityKind::Manager)?.display_name.clone();
        let team: Vec<_> = self
            .direct_reports(old_manager.as_str())
            .into_iter()
            .filter(|id| id != new_manager.as_str())
            .collect();
        let links: Vec<_> = team
            .iter()
            .map(|id| (id.clone(), Some(new_manager.0.clone())))
            .collect();
        let updated_count = self.commit_links(&links)?;
        Ok(AssignTeamSummary {
            old_manager_name: old_name,
            new_manager_name: new_name,
            team_count: team.len(),
            updated_count,
        })
    }

    fn assign_person(
        &mut self,
        person: &NodeId,
        target_manager: &NodeId,
    ) -> Result<AssignPersonSummary, StoreError> {
        self.check_available()?;
        if person == target_manager {
            return Err(StoreError::Invalid(
                "a person cannot report to themselves".into(),
            ));
        }
        let person_name = self.require(person, EntityKind::Person)?.display_name.clone();
        let target_manager_name = self
            .require(target_manager, EntityKind::Manager)?
            .display_name
            .clone();
        self.commit_links(&[(person.0.clone(), Some(target_manager.0.clone()))])?;
        Ok(AssignPersonSummary {
            person_name,
            target_manager_name,
        })
    }

    fn add_seat(&mut self, seat: &NewSeat) -> Result<EmployeeRecord, StoreError> {
        self.check_available()?;
        let manager_id = seat
            .manager_id
            .as_deref()
            .ok_or_else(|| StoreError::Invalid("managerId is required".into()))?;
        let company_id = seat
            .company_id
            .as_deref()
            .ok_or_else(|| StoreError::Invalid("companyId is required".into()))?;
        let manager_name = self
            .record(manager_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Manager, manager_id))?
            .display_name
            .clone();
        if !self.companies.contains(company_id) {
            return Err(StoreError::not_found(EntityKind::Company, company_id));
        }
        let optional = [
            (&seat.brand_id, &self.brands, EntityKind::Brand),
            (&seat.location_id, &self.locations, EntityKind::Location),
            (&seat.department_id, &self.departments, EntityKind::Department),
        ];
        for (id, known, entity) in optional {
            if let Some(id) = id {
                if !known.contains(id) {
                    return Err(StoreError::not_found(entity, id.as_str()));
                }
            }
        }

        let mut record = EmployeeRecord::new(self.next_seat_id(), SEAT_DISPLAY_NAME)
            .with_manager(manager_name);
        record.hide_from_chart = !seat.show_in_chart;
        record.brand = seat.brand_id.clone();
        record.location = seat.location_id.clone();
        record.department = seat.department_id.clone();
        debug!(id = %record.id, manager = manager_id, "added seat");
        self.records.push(record.clone());
        Ok(record)
    }

    fn delete_seats(&mut self, ids: &[NodeId]) -> Result<usize, StoreError> {
        self.check_available()?;
        if ids.is_empty() {
            return Err(StoreError::Invalid("no seats given".into()));
        }
        for id in ids {
            if !id.is_seat() {
                return Err(StoreError::Invalid(format!("'{id}' is not a seat")));
            }
            self.require(id, EntityKind::Seat)?;
        }
        let before = self.records.len();
        self.records
            .retain(|r| !ids.iter().any(|id| id.as_str() == r.id));
        Ok(before - self.records.len())
    }
}
