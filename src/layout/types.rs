//! Core types for the layout engine

use std::collections::{HashMap, HashSet};

use crate::hierarchy::{NodeId, NodeKind};

/// A 2D point in the untransformed chart coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box of the given size centred on a point
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// A positioned node. `x`/`y` is the centre of its box.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: NodeId,
    /// Derived back-reference, for traversal only
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: NodeKind,
    pub is_manager: bool,
    pub is_hidden_manager: bool,
    pub label: String,
    pub level: Option<String>,
    /// Placed in a vertical roster column under its parent
    pub stacked: bool,
    pub child_count: usize,
    /// How many of this node's children are leaves
    pub leaf_children: usize,
}

impl NodeLayout {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds_at(self.position())
    }

    pub fn bounds_at(&self, center: Point) -> BoundingBox {
        BoundingBox::centered(center, self.width, self.height)
    }

    pub fn is_seat(&self) -> bool {
        self.kind == NodeKind::Seat
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }
}

/// How a link is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRoute {
    /// Vertical, horizontal, vertical
    Elbow,
    /// Down the parent's side, then across into a stacked child
    Side,
}

/// A routed parent → child link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub from: NodeId,
    pub to: NodeId,
    pub route: LinkRoute,
    pub path: Vec<Point>,
}

/// The complete result of a layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// Nodes in pre-order, children in sorted order
    pub nodes: Vec<NodeLayout>,
    pub links: Vec<LinkLayout>,
    /// Box containing every node
    pub bounds: BoundingBox,
    index: HashMap<NodeId, usize>,
}

impl ChartLayout {
    pub(crate) fn new(nodes: Vec<NodeLayout>, links: Vec<LinkLayout>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
        let bounds = nodes
            .iter()
            .map(NodeLayout::bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();
        Self {
            nodes,
            links,
            bounds,
            index,
        }
    }

    pub fn root(&self) -> Option<&NodeLayout> {
        self.nodes.first()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeLayout> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn position_of(&self, id: &NodeId) -> Option<Point> {
        self.node(id).map(NodeLayout::position)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest node centre to `point` within `threshold`, skipping `exclude`
    pub fn nearest_node(
        &self,
        point: Point,
        exclude: &HashSet<NodeId>,
        threshold: f64,
    ) -> Option<&NodeLayout> {
        self.nodes
            .iter()
            .filter(|node| !exclude.contains(&node.id))
            .map(|node| (node, node.position().distance(point)))
            .filter(|(_, distance)| *distance <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }
}
