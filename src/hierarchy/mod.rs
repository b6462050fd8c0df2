//! Hierarchy data model: employee records, the reporting tree, and the builder
//! that turns the former into the latter.

pub mod builder;
pub mod node;
pub mod record;

pub use builder::{BuildReport, BuildWarning, HierarchyBuilder};
pub use node::{NodeId, NodeKind, TreeNode, SEAT_PREFIX};
pub use record::{
    load_records, records_from_json, records_from_toml, EmployeeRecord, HierarchyStats,
    RecordsError,
};
