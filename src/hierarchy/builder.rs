//! Build the reporting tree from flat employee records
//!
//! Records link to their manager by display name. Names are resolved to
//! record indices exactly once here; everything downstream works on ids.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::node::TreeNode;
use super::record::EmployeeRecord;

/// Something suspicious found while building, reported but not fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Several records share an id; the first one is kept
    DuplicateId { id: String, dropped: usize },
    /// Several records share a display name; children resolve to the first one
    DuplicateName { name: String, ids: Vec<String> },
    /// Manager names loop without reaching the root; the first record of the
    /// loop was attached to the root instead
    ManagerCycle { ids: Vec<String> },
}

/// The built tree together with everything noticed along the way
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub root: TreeNode,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Manager(usize),
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnPath,
    Reaches,
}

/// Converts employee records into a rooted tree
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    /// Display name of the designated top-of-chart person
    root_name: Option<String>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    /// Build the tree, logging any warnings. `None` for an empty input.
    pub fn build(&self, records: &[EmployeeRecord]) -> Option<TreeNode> {
        let report = self.build_report(records)?;
        for warning in &report.warnings {
            match warning {
                BuildWarning::DuplicateId { id, dropped } => {
                    warn!(id = %id, dropped, "duplicate record id, keeping the first record");
                }
                BuildWarning::DuplicateName { name, ids } => {
                    warn!(name = %name, ids = ?ids, "duplicate display name, children resolve to the first record");
                }
                BuildWarning::ManagerCycle { ids } => {
                    warn!(ids = ?ids, "manager names form a loop, attaching it to the root");
                }
            }
        }
        Some(report.root)
    }

    /// Build the tree and return the warnings instead of logging them
    pub fn build_report(&self, records: &[EmployeeRecord]) -> Option<BuildReport> {
        if records.is_empty() {
            return None;
        }

        let (records, mut warnings) = dedupe_ids(records);
        let records = records.as_ref();
        let (by_name, name_warnings) = index_names(records);
        warnings.extend(name_warnings);

        let designated = self
            .root_name
            .as_deref()
            .and_then(|name| by_name.get(name).map(|indices| indices[0]));

        let included: Vec<usize> = (0..records.len())
            .filter(|&i| Some(i) == designated || !records[i].is_excluded())
            .collect();
        if included.is_empty() {
            return None;
        }

        let mut root = designated;
        let mut links: Vec<Option<Link>> = vec![None; records.len()];
        for &i in &included {
            if Some(i) == root {
                continue;
            }
            let manager = records[i]
                .manager_name()
                .and_then(|name| by_name.get(name))
                .map(|indices| indices[0])
                .filter(|&j| j != i && (Some(j) == designated || !records[j].is_excluded()));
            links[i] = match manager {
                Some(j) => Some(Link::Manager(j)),
                None if root.is_none() => {
                    root = Some(i);
                    None
                }
                None => Some(Link::Root),
            };
        }

        // Every record resolved to a manager: fall back to the first included one.
        let root = root.unwrap_or(included[0]);
        links[root] = None;

        warnings.extend(break_cycles(records, &included, root, &mut links));

        let mut children: Vec<Vec<usize>> = vec![vec![]; records.len()];
        for &i in &included {
            match links[i] {
                Some(Link::Manager(j)) => children[j].push(i),
                Some(Link::Root) => children[root].push(i),
                None => {}
            }
        }

        debug!(
            root = %records[root].id,
            nodes = included.len(),
            "built hierarchy"
        );

        Some(BuildReport {
            root: assemble(records, &children, root),
            warnings,
        })
    }
}

fn dedupe_ids(records: &[EmployeeRecord]) -> (Cow<'_, [EmployeeRecord]>, Vec<BuildWarning>) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut dropped: Vec<(&str, usize)> = vec![];
    for record in records {
        if !seen.insert(record.id.as_str()) {
            match dropped.iter_mut().find(|(id, _)| *id == record.id) {
                Some((_, count)) => *count += 1,
                None => dropped.push((record.id.as_str(), 1)),
            }
        }
    }
    if dropped.is_empty() {
        return (Cow::Borrowed(records), vec![]);
    }

    let mut kept: HashSet<&str> = HashSet::with_capacity(records.len());
    let unique = records
        .iter()
        .filter(|record| kept.insert(record.id.as_str()))
        .cloned()
        .collect();
    let warnings = dropped
        .into_iter()
        .map(|(id, dropped)| BuildWarning::DuplicateId {
            id: id.to_string(),
            dropped,
        })
        .collect();
    (Cow::Owned(unique), warnings)
}

fn index_names(records: &[EmployeeRecord]) -> (HashMap<&str, Vec<usize>>, Vec<BuildWarning>) {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut order: Vec<&str> = vec![];
    for (i, record) in records.iter().enumerate() {
        let entry = by_name.entry(record.display_name.as_str()).or_default();
        if entry.is_empty() {
            order.push(record.display_name.as_str());
        }
        entry.push(i);
    }

    let warnings = order
        .into_iter()
        .filter_map(|name| {
            let indices = &by_name[name];
            (indices.len() > 1).then(|| BuildWarning::DuplicateName {
                name: name.to_string(),
                ids: indices.iter().map(|&i| records[i].id.clone()).collect(),
            })
        })
        .collect();

    (by_name, warnings)
}

/// Re-point one member of every manager loop to the root so each record reaches it
fn break_cycles(
    records: &[EmployeeRecord],
    included: &[usize],
    root: usize,
    links: &mut [Option<Link>],
) -> Vec<BuildWarning> {
    let mut warnings = vec![];
    let mut state = vec![Visit::Unvisited; records.len()];
    state[root] = Visit::Reaches;

    for &start in included {
        let mut path = vec![];
        let mut current = start;
        loop {
            match state[current] {
                Visit::Reaches => break,
                Visit::OnPath => {
                    let begin = path
                        .iter()
                        .position(|&i| i == current)
                        .unwrap_or_default();
                    let cycle = &path[begin..];
                    let entry = cycle.iter().copied().min().unwrap_or(current);
                    links[entry] = Some(Link::Root);
                    warnings.push(BuildWarning::ManagerCycle {
                        ids: cycle.iter().map(|&i| records[i].id.clone()).collect(),
                    });
                    break;
                }
                Visit::Unvisited => {
                    state[current] = Visit::OnPath;
                    path.push(current);
                    current = match links[current] {
                        Some(Link::Manager(j)) => j,
                        Some(Link::Root) | None => root,
                    };
                }
            }
        }
        for i in path {
            state[i] = Visit::Reaches;
        }
    }

    warnings
}

fn assemble(records: &[EmployeeRecord], children: &[Vec<usize>], index: usize) -> TreeNode {
    let mut node = TreeNode::from_record(records[index].clone());
    node.children = children[index]
        .iter()
        .map(|&child| assemble(records, children, child))
        .collect();
    node
}
