//! Layout engine for computing node positions and link routes
//!
//! This module takes a reporting tree and computes its chart layout,
//! producing a `ChartLayout` with positioned nodes and routed links.

pub mod config;
pub mod engine;
pub mod routing;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{compute, TreeLayoutEngine};
pub use routing::{route_all, route_link, route_with_overrides};
pub use types::*;
