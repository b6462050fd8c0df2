//! SVG generation from a chart layout

use std::collections::{HashMap, HashSet};

use crate::editor::{EditorSession, Transform};
use crate::hierarchy::NodeId;
use crate::layout::{route_with_overrides, BoundingBox, ChartLayout, LinkLayout, NodeLayout, Point};
use crate::levels::{LevelCatalog, Palette};

use super::SvgConfig;

/// Editor state that changes how the chart is drawn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    /// Applied to the root group
    pub transform: Transform,
    /// Screen size; `None` fits the viewBox to the chart bounds
    pub viewport: Option<(f64, f64)>,
    pub selected: HashSet<NodeId>,
    /// Live drop candidate during a drag
    pub candidate: Option<NodeId>,
    /// Dragged nodes, drawn at these centres instead of their layout position
    pub positions: HashMap<NodeId, Point>,
    /// Links rerouted for the dragged positions
    pub links: Option<Vec<LinkLayout>>,
    /// Shadow left at the origin of a single-node drag
    pub ghost: Option<(NodeId, Point)>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture what the session currently shows on screen
    pub fn from_session(session: &EditorSession) -> Self {
        let mut state = Self {
            transform: session.viewport().transform(),
            viewport: Some(session.viewport().config().size),
            selected: session
                .selection()
                .selected_ids()
                .iter()
                .chain(session.selection().selected_seat_ids())
                .cloned()
                .collect(),
            ..Self::default()
        };
        if let Some(drag) = session.drag().session() {
            state.positions = drag
                .members
                .iter()
                .filter_map(|id| drag.position_of(id).map(|p| (id.clone(), p)))
                .collect();
            state.candidate = drag.candidate.clone();
            state.links = Some(route_with_overrides(
                &session.layout().nodes,
                &state.positions,
                session.layout_config(),
                |_| true,
            ));
            if !drag.is_multi() {
                state.ghost = drag
                    .origins
                    .get(&drag.anchor)
                    .map(|origin| (drag.anchor.clone(), *origin));
            }
        }
        state
    }

    pub fn with_selected(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.selected.extend(ids);
        self
    }

    pub fn with_candidate(mut self, id: NodeId) -> Self {
        self.candidate = Some(id);
        self
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    links: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            links: vec![],
            indent: 2,
        }
    }

    /// Add CSS custom properties from a palette, in token order
    pub fn add_palette(&mut self, palette: &Palette) {
        let mut tokens: Vec<_> = palette.colors.iter().collect();
        tokens.sort();
        let mut css = String::from(":root {\n");
        for (token, value) in tokens {
            css.push_str(&format!("      --{}: {};\n", token, value));
        }
        css.push_str("    }");
        self.styles.push(css);

        let p = self.prefix();
        let font = self.config.font_size;
        self.styles.push(format!(
            ".{p}label {{ font: {font}px sans-serif; fill: var(--node-text); }}"
        ));
        self.styles.push(format!(
            ".{p}hidden .{p}label {{ fill: var(--hidden-text); }}"
        ));
        self.styles.push(format!(
            ".{p}seat .{p}box {{ stroke-dasharray: 4 3; }}"
        ));
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone()
    }

    fn indent_str(&self) -> String {
        if self.config.indent {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &'static str {
        if self.config.indent {
            "\n"
        } else {
            ""
        }
    }

    /// Add a node box with its label
    pub fn add_node(&mut self, node: &NodeLayout, bounds: BoundingBox, classes: &[String], styles: &str) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}node", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        let nl = self.newline();
        let inner = if self.config.indent {
            "  ".repeat(self.indent + 1)
        } else {
            String::new()
        };
        let center = bounds.center();

        self.elements.push(format!(
            r#"{indent}<g id="{id}" class="{class_list}">{nl}{inner}<rect class="{prefix}box" x="{x}" y="{y}" width="{w}" height="{h}" rx="{rx}"{styles}/>{nl}{inner}<text class="{prefix}label" x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle">{label}</text>{nl}{indent}</g>"#,
            indent = self.indent_str(),
            id = escape_xml(node.id.as_str()),
            x = bounds.x,
            y = bounds.y,
            w = bounds.width,
            h = bounds.height,
            rx = self.config.corner_radius,
            cx = center.x,
            cy = center.y,
            label = escape_xml(&node.label),
        ));
    }

    /// Add the non-interactive shadow of a dragged node
    pub fn add_ghost(&mut self, bounds: BoundingBox) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<rect class="{}ghost" x="{}" y="{}" width="{}" height="{}" rx="{}" fill="var(--ghost-fill)" opacity="{}" pointer-events="none"/>"#,
            self.indent_str(),
            prefix,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            self.config.corner_radius,
            self.config.ghost_opacity,
        ));
    }

    /// Add a path for a link
    pub fn add_link_path(&mut self, link: &LinkLayout, classes: &[String], styles: &str) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}link", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        self.links.push(format!(
            r#"{}<path class="{}" data-from="{}" data-to="{}" d="{}" fill="none"{}/>"#,
            self.indent_str(),
            class_list,
            escape_xml(link.from.as_str()),
            escape_xml(link.to.as_str()),
            path_to_d(&link.path),
            styles
        ));
    }

    /// Build the final SVG string. Links are drawn under the nodes.
    pub fn build(self, viewbox: BoundingBox, transform: Transform) -> String {
        let nl = self.newline();
        let prefix = self.prefix();

        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.xml_declaration {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            viewbox.x, viewbox.y, viewbox.width, viewbox.height
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"  <g class="{}chart" transform="translate({} {}) scale({})">"#,
            prefix, transform.x, transform.y, transform.scale
        ));
        svg.push_str(nl);
        for link in &self.links {
            svg.push_str(link);
            svg.push_str(nl);
        }
        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }
        svg.push_str("  </g>");
        svg.push_str(nl);

        svg.push_str("</svg>");

        svg
    }
}

/// Render a layout to an SVG string with the default level colours
pub fn render_svg(
    layout: &ChartLayout,
    state: &RenderState,
    palette: &Palette,
    config: &SvgConfig,
) -> String {
    render_svg_with_levels(layout, state, palette, &LevelCatalog::new(), config)
}

/// Render a layout to an SVG string, filling boxes by level colour
pub fn render_svg_with_levels(
    layout: &ChartLayout,
    state: &RenderState,
    palette: &Palette,
    levels: &LevelCatalog,
    config: &SvgConfig,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_palette(palette);

    let active: HashSet<&NodeId> = state.selected.iter().chain(state.candidate.iter()).collect();
    let links = state.links.as_deref().unwrap_or(&layout.links);
    for link in links {
        let is_active = (active.contains(&link.from) && active.contains(&link.to))
            || state.positions.contains_key(&link.to);
        let (classes, stroke) = if is_active {
            (vec![format!("{}active", builder.prefix())], "link-active")
        } else {
            (vec![], "link")
        };
        let styles = format!(
            r#" stroke="{}" stroke-width="{}""#,
            palette.resolve_or_default(stroke),
            config.link_width
        );
        builder.add_link_path(link, &classes, &styles);
    }

    if let Some((id, origin)) = &state.ghost {
        if let Some(node) = layout.node(id) {
            builder.add_ghost(node.bounds_at(*origin));
        }
    }

    // Dragged nodes go last so they sit on top
    let (dragged, still): (Vec<&NodeLayout>, Vec<&NodeLayout>) = layout
        .nodes
        .iter()
        .partition(|node| state.positions.contains_key(&node.id));
    for node in still.into_iter().chain(dragged) {
        render_node(node, state, palette, levels, &mut builder);
    }

    let viewbox = match state.viewport {
        Some((width, height)) => BoundingBox::new(0.0, 0.0, width, height),
        None => {
            let padding = config.margin;
            let b = layout.bounds;
            BoundingBox::new(
                b.x - padding,
                b.y - padding,
                b.width + 2.0 * padding,
                b.height + 2.0 * padding,
            )
        }
    };
    builder.build(viewbox, state.transform)
}

fn render_node(
    node: &NodeLayout,
    state: &RenderState,
    palette: &Palette,
    levels: &LevelCatalog,
    builder: &mut SvgBuilder,
) {
    let prefix = builder.prefix();
    let center = state
        .positions
        .get(&node.id)
        .copied()
        .unwrap_or(node.position());
    let selected = state.selected.contains(&node.id);
    let candidate = state.candidate.as_ref() == Some(&node.id);

    let mut classes = vec![];
    let (mut fill, mut stroke) = if node.is_seat() {
        classes.push(format!("{prefix}seat"));
        ("seat-fill".to_string(), "seat-stroke")
    } else if node.is_hidden_manager {
        classes.push(format!("{prefix}hidden"));
        ("hidden-fill".to_string(), "hidden-stroke")
    } else {
        let fill = levels
            .color_token(node.level.as_deref())
            .unwrap_or("node-fill")
            .to_string();
        (fill, "node-stroke")
    };
    if node.is_manager {
        classes.push(format!("{prefix}manager"));
    }
    if selected {
        classes.push(format!("{prefix}selected"));
        if node.is_seat() {
            stroke = "seat-selected-stroke";
        } else {
            fill = "selected-fill".to_string();
            stroke = "selected-stroke";
        }
    }
    if candidate {
        classes.push(format!("{prefix}candidate"));
        stroke = "candidate-stroke";
    }
    let stroke_width = if selected || candidate {
        builder.config.highlight_width
    } else {
        1.0
    };

    let styles = format!(
        r#" fill="{}" stroke="{}" stroke-width="{}""#,
        palette.resolve_or_default(&fill),
        palette.resolve_or_default(stroke),
        stroke_width
    );
    builder.add_node(node, node.bounds_at(center), &classes, &styles);
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut d = format!("M{} {}", path[0].x, path[0].y);
    for point in &path[1..] {
        d.push_str(&format!(" L{} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{EmployeeRecord, TreeNode};
    use crate::layout::{compute, LayoutConfig};

    fn layout() -> ChartLayout {
        let tree = TreeNode::from_record(EmployeeRecord::new("R", "Root & Co").manager())
            .with_children(vec![
                TreeNode::from_record(EmployeeRecord::new("H", "Hidden").manager().hidden())
                    .with_children(vec![TreeNode::leaf("B")]),
                TreeNode::leaf("SEAT_1_1"),
            ]);
        compute(&tree, &LevelCatalog::new(), &LayoutConfig::default())
    }

    #[test]
    fn test_path_to_d() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let d = path_to_d(&path);
        assert_eq!(d, "M0 0 L100 0 L100 100");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_render_static_chart() {
        let svg = render_svg(&layout(), &RenderState::new(), &Palette::default(), &SvgConfig::default());

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"id="R""#));
        assert!(svg.contains("Root &amp; Co"));
        assert!(svg.contains("oc-hidden"));
        assert!(svg.contains("oc-seat"));
        assert!(svg.contains(r#"transform="translate(0 0) scale(1)""#));
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(!svg.contains("oc-selected"));
    }

    #[test]
    fn test_render_selection_and_candidate() {
        let state = RenderState::new()
            .with_selected([NodeId::new("B")])
            .with_candidate(NodeId::new("R"));
        let svg = render_svg(&layout(), &state, &Palette::default(), &SvgConfig::default());

        assert!(svg.contains(r#"class="oc-node oc-selected""#));
        assert!(svg.contains(r#"class="oc-node oc-manager oc-candidate""#));
    }

    #[test]
    fn test_session_seat_selection_restyles() {
        use crate::editor::EditorConfig;

        let mut session = EditorSession::new(EditorConfig::default(), LevelCatalog::new());
        session.load(vec![
            EmployeeRecord::new("R", "Root").manager(),
            EmployeeRecord::new("SEAT_1_1", "Open seat").with_manager("Root"),
        ]);
        let seat = NodeId::new("SEAT_1_1");
        session.click(&seat, true);

        let state = RenderState::from_session(&session);
        assert!(state.selected.contains(&seat));
        let svg = render_svg(session.layout(), &state, &Palette::default(), &SvgConfig::default());
        assert!(svg.contains("oc-seat oc-selected"));
    }

    #[test]
    fn test_inline_config_shapes_markup() {
        let state = RenderState::new().with_selected([NodeId::new("B")]);
        let config = SvgConfig::inline()
            .with_class_prefix("chart-")
            .with_link_width(3.0)
            .with_corner_radius(0.0);
        let svg = render_svg(&layout(), &state, &Palette::default(), &config);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="chart-node chart-selected""#));
        assert!(svg.contains(r#"stroke-width="3""#));
        assert!(svg.contains(r#"stroke-width="2.5""#));
        assert!(svg.contains(r#"rx="0""#));
    }

    #[test]
    fn test_viewport_sets_viewbox() {
        let state = RenderState {
            viewport: Some((800.0, 600.0)),
            transform: Transform {
                scale: 0.5,
                x: 10.0,
                y: 20.0,
            },
            ..RenderState::default()
        };
        let svg = render_svg(&layout(), &state, &Palette::default(), &SvgConfig::default());
        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
        assert!(svg.contains(r#"transform="translate(10 20) scale(0.5)""#));
    }
}
