//! Layout computation engine
//!
//! Top-down tidy layout. Each subtree is measured bottom-up into a contour
//! (the left/right extent of its boxes per row, relative to the subtree root);
//! siblings are packed left to right as close as their contours allow, and the
//! parent is centred over its first and last child. Children that are all
//! leaves are not fanned out but stacked in a single roster column.
//!
//! Layout is total: nothing is kept between calls, the result depends only on
//! the tree shape, the level order and the config.

use crate::hierarchy::TreeNode;
use crate::levels::LevelCatalog;

use super::config::LayoutConfig;
use super::routing::route_all;
use super::types::*;

/// Horizontal extent (left, right) of one row of a subtree
type Row = (f64, f64);

/// Scratch record for one node during a layout pass
struct Work<'a> {
    node: &'a TreeNode,
    parent: Option<usize>,
    depth: usize,
    children: Vec<usize>,
    stacked: bool,
    rel_x: f64,
    rel_y: f64,
}

/// Lays out trees with a fixed config and level order
#[derive(Debug, Clone, Default)]
pub struct TreeLayoutEngine {
    pub config: LayoutConfig,
    pub levels: LevelCatalog,
}

impl TreeLayoutEngine {
    pub fn new(config: LayoutConfig, levels: LevelCatalog) -> Self {
        Self { config, levels }
    }

    pub fn layout(&self, root: &TreeNode) -> ChartLayout {
        compute(root, &self.levels, &self.config)
    }
}

/// Compute positions for every node of `root` and route all links
pub fn compute(root: &TreeNode, levels: &LevelCatalog, config: &LayoutConfig) -> ChartLayout {
    let mut arena = Vec::with_capacity(root.count());
    collect(root, None, 0, levels, &mut arena);
    measure(&mut arena, 0, config);

    let (width, height) = config.node_size;
    let mut nodes: Vec<NodeLayout> = Vec::with_capacity(arena.len());
    for work in &arena {
        let (x, y) = match work.parent {
            Some(parent) => (nodes[parent].x + work.rel_x, nodes[parent].y + work.rel_y),
            None => (0.0, 0.0),
        };
        nodes.push(NodeLayout {
            id: work.node.id.clone(),
            parent: work.parent.map(|p| arena[p].node.id.clone()),
            depth: work.depth,
            x,
            y,
            width,
            height,
            kind: work.node.kind(),
            is_manager: work.node.is_manager(),
            is_hidden_manager: work.node.is_hidden_manager,
            label: work.node.display_name().to_string(),
            level: work.node.data.level.clone(),
            stacked: work.parent.is_some_and(|p| arena[p].stacked),
            child_count: work.children.len(),
            leaf_children: work
                .children
                .iter()
                .filter(|&&c| arena[c].children.is_empty())
                .count(),
        });
    }

    let links = route_all(&nodes, config);
    ChartLayout::new(nodes, links)
}

/// Flatten the tree in pre-order with children sorted by level
fn collect<'a>(
    node: &'a TreeNode,
    parent: Option<usize>,
    depth: usize,
    levels: &LevelCatalog,
    arena: &mut Vec<Work<'a>>,
) -> usize {
    let index = arena.len();
    arena.push(Work {
        node,
        parent,
        depth,
        children: vec![],
        stacked: false,
        rel_x: 0.0,
        rel_y: 0.0,
    });

    let mut sorted: Vec<&TreeNode> = node.children.iter().collect();
    sorted.sort_by_key(|child| levels.order_of(child.data.level.as_deref()));

    let children = sorted
        .into_iter()
        .map(|child| collect(child, Some(index), depth + 1, levels, arena))
        .collect();
    arena[index].children = children;
    index
}

/// Place the children of `index` relative to it and return the subtree contour
fn measure(arena: &mut [Work<'_>], index: usize, config: &LayoutConfig) -> Vec<Row> {
    let half = config.node_size.0 / 2.0;
    let mut contour = vec![(-half, half)];

    let children = arena[index].children.clone();
    if children.is_empty() {
        return contour;
    }

    if children.iter().all(|&c| arena[c].children.is_empty()) {
        arena[index].stacked = true;
        for (i, &child) in children.iter().enumerate() {
            arena[child].rel_x = config.stack_offset_x;
            arena[child].rel_y = config.level_gap + i as f64 * config.stack_spacing;
        }
        let span = (children.len() - 1) as f64 * config.stack_spacing;
        let rows = 1 + (span / config.level_gap).ceil() as usize;
        let column = (config.stack_offset_x - half, config.stack_offset_x + half);
        contour.extend(std::iter::repeat(column).take(rows));
        return contour;
    }

    let mut merged: Vec<Row> = vec![];
    let mut offsets = Vec::with_capacity(children.len());
    for &child in &children {
        let rows = measure(arena, child, config);
        let shift = if merged.is_empty() {
            0.0
        } else {
            merged
                .iter()
                .zip(rows.iter())
                .enumerate()
                .map(|(row, (&(_, right), &(left, _)))| {
                    // Row 0 holds the siblings themselves, deeper rows are cousins.
                    let gap = if row == 0 {
                        config.sibling_gap
                    } else {
                        config.subtree_gap
                    };
                    right + gap - left
                })
                .fold(f64::NEG_INFINITY, f64::max)
        };

        for (row, &(left, right)) in rows.iter().enumerate() {
            let (left, right) = (left + shift, right + shift);
            match merged.get_mut(row) {
                Some(extent) => {
                    extent.0 = extent.0.min(left);
                    extent.1 = extent.1.max(right);
                }
                None => merged.push((left, right)),
            }
        }
        offsets.push(shift);
    }

    let mid = (offsets[0] + offsets[offsets.len() - 1]) / 2.0;
    for (&child, offset) in children.iter().zip(&offsets) {
        arena[child].rel_x = offset - mid;
        arena[child].rel_y = config.level_gap;
    }
    contour.extend(merged.into_iter().map(|(left, right)| (left - mid, right - mid)));
    contour
}
