//! Drawing options for chart SVG output

/// How a chart is drawn. Colours come from the palette; this covers geometry
/// and markup shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Margin around the chart bounds when no viewport size is given
    pub margin: f64,
    /// Emit the `<?xml ...?>` declaration
    pub xml_declaration: bool,
    /// One element per line, indented
    pub indent: bool,
    /// Prepended to every class name, e.g. `oc-` gives `oc-node`
    pub class_prefix: String,
    pub corner_radius: f64,
    /// Label size in px
    pub font_size: f64,
    pub link_width: f64,
    /// Outline width of selected boxes and the drop candidate
    pub highlight_width: f64,
    /// Opacity of the shadow left at a dragged node's origin
    pub ghost_opacity: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            margin: 40.0,
            xml_declaration: true,
            indent: true,
            class_prefix: "oc-".to_string(),
            corner_radius: 6.0,
            font_size: 13.0,
            link_width: 1.5,
            highlight_width: 2.5,
            ghost_opacity: 0.5,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact markup for embedding in another document
    pub fn inline() -> Self {
        Self {
            xml_declaration: false,
            indent: false,
            ..Self::default()
        }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_link_width(mut self, width: f64) -> Self {
        self.link_width = width;
        self
    }

    /// Clamped to `0.0..=1.0`
    pub fn with_ghost_opacity(mut self, opacity: f64) -> Self {
        self.ghost_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_drops_declaration_and_indent() {
        let config = SvgConfig::inline();
        assert!(!config.xml_declaration);
        assert!(!config.indent);
        assert_eq!(config.class_prefix, "oc-");
    }

    #[test]
    fn test_ghost_opacity_is_clamped() {
        assert_eq!(SvgConfig::new().with_ghost_opacity(3.0).ghost_opacity, 1.0);
        assert_eq!(SvgConfig::new().with_ghost_opacity(-1.0).ghost_opacity, 0.0);
    }
}
