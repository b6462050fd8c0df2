//! Configuration for the layout engine

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Size of every node box (width, height)
    pub node_size: (f64, f64),

    /// Horizontal gap between boxes of siblings
    pub sibling_gap: f64,

    /// Horizontal gap between boxes that do not share a parent
    pub subtree_gap: f64,

    /// Vertical distance between the centres of consecutive depths
    pub level_gap: f64,

    /// Horizontal offset of a stacked roster column from its parent's centre
    pub stack_offset_x: f64,

    /// Vertical distance between boxes in a stacked roster column
    pub stack_spacing: f64,

    /// Distance from the parent's left edge at which side links drop down
    pub side_link_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: (160.0, 56.0),
            sibling_gap: 20.0,
            subtree_gap: 48.0,
            level_gap: 120.0,
            stack_offset_x: 40.0,
            stack_spacing: 72.0,
            side_link_offset: 16.0,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node box size
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_size = (width, height);
        self
    }

    /// Set sibling and non-sibling gaps
    pub fn with_gaps(mut self, sibling: f64, subtree: f64) -> Self {
        self.sibling_gap = sibling;
        self.subtree_gap = subtree;
        self
    }

    /// Set the depth-to-depth gap
    pub fn with_level_gap(mut self, gap: f64) -> Self {
        self.level_gap = gap;
        self
    }

    /// Set the stacked column geometry
    pub fn with_stack(mut self, offset_x: f64, spacing: f64) -> Self {
        self.stack_offset_x = offset_x;
        self.stack_spacing = spacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.node_size, (160.0, 56.0));
        assert_eq!(config.sibling_gap, 20.0);
        assert_eq!(config.subtree_gap, 48.0);
        assert_eq!(config.level_gap, 120.0);
        assert!(config.side_link_offset < config.stack_offset_x);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_node_size(100.0, 40.0)
            .with_gaps(10.0, 30.0)
            .with_stack(24.0, 50.0);

        assert_eq!(config.node_size, (100.0, 40.0));
        assert_eq!(config.sibling_gap, 10.0);
        assert_eq!(config.subtree_gap, 30.0);
        assert_eq!(config.stack_offset_x, 24.0);
        assert_eq!(config.stack_spacing, 50.0);
    }
}
