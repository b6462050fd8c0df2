//! Flat employee records as delivered by the list endpoint

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::node::SEAT_PREFIX;

/// Errors that can occur when loading employee records
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("failed to read records file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse records JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse records TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One employee as returned by `listEmployees`
///
/// `manager_name` links to another record's `display_name`, not to its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub hide_from_chart: bool,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl EmployeeRecord {
    /// Create a visible individual contributor with no manager
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            manager_name: None,
            is_manager: false,
            hide_from_chart: false,
            department: None,
            location: None,
            brand: None,
            level: None,
        }
    }

    /// Set the manager by display name
    pub fn with_manager(mut self, manager_name: impl Into<String>) -> Self {
        self.manager_name = Some(manager_name.into());
        self
    }

    /// Flag the record as a manager
    pub fn manager(mut self) -> Self {
        self.is_manager = true;
        self
    }

    /// Flag the record as hidden from the chart
    pub fn hidden(mut self) -> Self {
        self.hide_from_chart = true;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// The manager name, treating blank strings as absent. Matching against
    /// display names is exact, so surrounding whitespace is kept.
    pub fn manager_name(&self) -> Option<&str> {
        self.manager_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Hidden individual contributors are dropped from the tree entirely
    pub fn is_excluded(&self) -> bool {
        self.hide_from_chart && !self.is_manager
    }

    /// Hidden managers stay in the tree as greyed pass-through nodes
    pub fn is_hidden_manager(&self) -> bool {
        self.hide_from_chart && self.is_manager
    }

    pub fn is_seat(&self) -> bool {
        self.id.starts_with(SEAT_PREFIX)
    }
}

#[derive(Deserialize)]
struct TomlRecords {
    #[serde(default)]
    employees: Vec<EmployeeRecord>,
}

/// Load records from a `.json` array or a `.toml` file with `[[employees]]` tables
pub fn load_records(path: &Path) -> Result<Vec<EmployeeRecord>, RecordsError> {
    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        records_from_toml(&content)
    } else {
        records_from_json(&content)
    }
}

pub fn records_from_json(content: &str) -> Result<Vec<EmployeeRecord>, RecordsError> {
    Ok(serde_json::from_str(content)?)
}

pub fn records_from_toml(content: &str) -> Result<Vec<EmployeeRecord>, RecordsError> {
    let parsed: TomlRecords = toml::from_str(content)?;
    Ok(parsed.employees)
}

/// Aggregate totals computed from the flat list, not from the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HierarchyStats {
    pub total: usize,
    pub visible: usize,
    pub hidden_managers: usize,
    pub hidden_contributors: usize,
    pub seats: usize,
}

impl HierarchyStats {
    pub fn from_records(records: &[EmployeeRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            if record.is_seat() {
                stats.seats += 1;
            }
            if record.is_hidden_manager() {
                stats.hidden_managers += 1;
            } else if record.is_excluded() {
                stats.hidden_contributors += 1;
            } else {
                stats.visible += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_json() {
        let json = r#"[
            {"id": "E1", "displayName": "Ada", "isManager": true},
            {"id": "E2", "displayName": "Bob", "managerName": "Ada", "level": "Engineer"}
        ]"#;
        let records = records_from_json(json).expect("Should parse");
        assert_eq!(records.len(), 2);
        assert!(records[0].is_manager);
        assert_eq!(records[1].manager_name(), Some("Ada"));
        assert_eq!(records[1].level.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_parse_toml_employees() {
        let toml_str = r#"
[[employees]]
id = "E1"
displayName = "Ada"

[[employees]]
id = "E2"
displayName = "Bob"
managerName = "Ada"
hideFromChart = true
"#;
        let records = records_from_toml(toml_str).expect("Should parse");
        assert_eq!(records.len(), 2);
        assert!(records[1].is_excluded());
    }

    #[test]
    fn test_blank_manager_name_is_absent() {
        let record = EmployeeRecord::new("E1", "Ada").with_manager("   ");
        assert_eq!(record.manager_name(), None);
    }

    #[test]
    fn test_padded_manager_name_is_kept_verbatim() {
        let record = EmployeeRecord::new("E2", "Bob").with_manager(" Ada");
        assert_eq!(record.manager_name(), Some(" Ada"));
    }

    #[test]
    fn test_stats_count_hidden_records() {
        let records = vec![
            EmployeeRecord::new("E1", "Ada").manager(),
            EmployeeRecord::new("E2", "Bob").manager().hidden(),
            EmployeeRecord::new("E3", "Cy").hidden(),
            EmployeeRecord::new("SEAT_1_1", "Open seat"),
        ];
        let stats = HierarchyStats::from_records(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.visible, 2);
        assert_eq!(stats.hidden_managers, 1);
        assert_eq!(stats.hidden_contributors, 1);
        assert_eq!(stats.seats, 1);
    }
}
