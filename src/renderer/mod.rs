//! Renderers for chart output
//!
//! `svg` draws a `ChartLayout` with the editor's selection and drag state.
//! `outline` prints the tree as indented text.

pub mod config;
pub mod outline;
pub mod svg;

pub use config::SvgConfig;
pub use outline::render_outline;
pub use svg::{render_svg, render_svg_with_levels, RenderState, SvgBuilder};
