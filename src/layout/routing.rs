//! Link routing between a parent and its children

use std::collections::HashMap;

use crate::hierarchy::NodeId;

use super::config::LayoutConfig;
use super::types::*;

/// Horizontal offsets below this are drawn as a straight drop
const ALIGN_EPSILON: f64 = 0.5;

/// Bottom-centre anchor of a box centred at `center`
pub fn bottom_anchor(node: &NodeLayout, center: Point) -> Point {
    Point::new(center.x, center.y + node.height / 2.0)
}

/// Top-centre anchor of a box centred at `center`
pub fn top_anchor(node: &NodeLayout, center: Point) -> Point {
    Point::new(center.x, center.y - node.height / 2.0)
}

/// Orthogonal elbow: down, across at the midpoint, down again
pub fn route_elbow(from: Point, to: Point) -> Vec<Point> {
    if (to.x - from.x).abs() < ALIGN_EPSILON {
        return vec![from, to];
    }
    let mid_y = (from.y + to.y) / 2.0;
    vec![from, Point::new(from.x, mid_y), Point::new(to.x, mid_y), to]
}

/// True if the child box overlaps the parent's column horizontally
fn shares_column(parent: &NodeLayout, parent_pos: Point, child_pos: Point) -> bool {
    (child_pos.x - parent_pos.x).abs() < parent.width
}

/// Route one parent → child link with both nodes at the given centres
pub fn route_link(
    parent: &NodeLayout,
    parent_pos: Point,
    child: &NodeLayout,
    child_pos: Point,
    config: &LayoutConfig,
) -> LinkLayout {
    let side_x = parent_pos.x - parent.width / 2.0 + config.side_link_offset;
    let child_left = child_pos.x - child.width / 2.0;
    let use_side = child.is_leaf()
        && parent.leaf_children > 1
        && shares_column(parent, parent_pos, child_pos)
        && side_x < child_left;

    let (route, path) = if use_side {
        let start = Point::new(side_x, parent_pos.y + parent.height / 2.0);
        (
            LinkRoute::Side,
            vec![
                start,
                Point::new(side_x, child_pos.y),
                Point::new(child_left, child_pos.y),
            ],
        )
    } else {
        (
            LinkRoute::Elbow,
            route_elbow(bottom_anchor(parent, parent_pos), top_anchor(child, child_pos)),
        )
    };

    LinkLayout {
        from: parent.id.clone(),
        to: child.id.clone(),
        route,
        path,
    }
}

/// Route every parent → child link of a layout
pub fn route_all(nodes: &[NodeLayout], config: &LayoutConfig) -> Vec<LinkLayout> {
    route_with_overrides(nodes, &HashMap::new(), config, |_| true)
}

/// Route the links (filtered by `keep`) using overridden centres where given
pub fn route_with_overrides<F>(
    nodes: &[NodeLayout],
    overrides: &HashMap<NodeId, Point>,
    config: &LayoutConfig,
    keep: F,
) -> Vec<LinkLayout>
where
    F: Fn(&NodeLayout) -> bool,
{
    let by_id: HashMap<&NodeId, &NodeLayout> = nodes.iter().map(|n| (&n.id, n)).collect();
    let position = |node: &NodeLayout| overrides.get(&node.id).copied().unwrap_or(node.position());

    nodes
        .iter()
        .filter_map(|child| {
            let parent: &NodeLayout = by_id.get(child.parent.as_ref()?)?;
            if !keep(child) {
                return None;
            }
            Some(route_link(
                parent,
                position(parent),
                child,
                position(child),
                config,
            ))
        })
        .collect()
}
