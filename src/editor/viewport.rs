//! Zoom/pan state of one mounted editor
//!
//! The controller owns a single affine transform (uniform scale + translate)
//! from chart space to screen space. Programmatic changes are eased over a
//! fixed duration; drag-time and pan updates are applied immediately.

use crate::hierarchy::NodeId;
use crate::layout::{ChartLayout, Point};

use super::error::{EditorError, EntityKind};

/// `screen = chart * scale + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.scale + self.x, point.y * self.scale + self.y)
    }

    /// Map a screen point back into chart space
    pub fn invert(&self, point: Point) -> Point {
        Point::new((point.x - self.x) / self.scale, (point.y - self.y) / self.scale)
    }

    fn lerp(from: Transform, to: Transform, t: f64) -> Transform {
        Transform {
            scale: from.scale + (to.scale - from.scale) * t,
            x: from.x + (to.x - from.x) * t,
            y: from.y + (to.y - from.y) * t,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Configuration for the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// Viewport size in screen pixels (width, height)
    pub size: (f64, f64),
    pub min_scale: f64,
    pub max_scale: f64,
    /// Factor applied by one zoom-in step
    pub zoom_step: f64,
    /// Scale used by `reset`
    pub reset_scale: f64,
    /// Scale used by `focus`
    pub focus_scale: f64,
    pub transition_ms: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            size: (1200.0, 800.0),
            min_scale: 0.2,
            max_scale: 3.0,
            zoom_step: 1.25,
            reset_scale: 0.6,
            focus_scale: 1.2,
            transition_ms: 500.0,
        }
    }
}

impl ViewportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_transition_ms(mut self, ms: f64) -> Self {
        self.transition_ms = ms;
        self
    }

    fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// An eased move from one transform to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Transform,
    pub to: Transform,
    pub duration_ms: f64,
    pub elapsed_ms: f64,
}

impl Transition {
    /// Cubic in-out easing of the current progress
    pub fn sample(&self) -> Transform {
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        };
        let eased = if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        };
        Transform::lerp(self.from, self.to, eased)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// Owns the transform of one editor instance
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    transform: Transform,
    transition: Option<Transition>,
    panning_suppressed: bool,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            transform: Transform::identity(),
            transition: None,
            panning_suppressed: false,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// The transform currently on screen
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Where the transform ends up once any transition finishes
    pub fn target(&self) -> Transform {
        self.transition.map(|t| t.to).unwrap_or(self.transform)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.config.zoom_step);
    }

    /// Fit the whole chart at the reset scale, centred
    pub fn reset(&mut self, layout: &ChartLayout) {
        let center = layout.bounds.center();
        let target = self.centered_on(center, self.config.reset_scale);
        self.transition_to(target);
    }

    /// Centre `node` (or the root when `None`) at the focus scale
    pub fn focus(&mut self, layout: &ChartLayout, node: Option<&NodeId>) -> Result<(), EditorError> {
        let position = match node {
            Some(id) => layout
                .position_of(id)
                .ok_or_else(|| EditorError::not_found(EntityKind::Node, id.as_str()))?,
            None => layout.root().map(|root| root.position()).unwrap_or_default(),
        };
        let target = self.centered_on(position, self.config.focus_scale);
        self.transition_to(target);
        Ok(())
    }

    /// Apply a transform without easing, cancelling any running transition
    pub fn set_immediate(&mut self, transform: Transform) {
        self.transition = None;
        self.transform = Transform {
            scale: self.config.clamp(transform.scale),
            ..transform
        };
    }

    /// Pan by a screen-space delta. Ignored while a drag suppresses panning.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if self.panning_suppressed {
            return false;
        }
        let current = self.transform;
        self.set_immediate(Transform {
            x: current.x + dx,
            y: current.y + dy,
            ..current
        });
        true
    }

    pub fn suppress_panning(&mut self, suppressed: bool) {
        self.panning_suppressed = suppressed;
    }

    pub fn is_panning_suppressed(&self) -> bool {
        self.panning_suppressed
    }

    /// Advance the running transition by `dt_ms` and return the new transform
    pub fn advance(&mut self, dt_ms: f64) -> Transform {
        if let Some(mut transition) = self.transition.take() {
            transition.elapsed_ms += dt_ms;
            self.transform = transition.sample();
            if !transition.is_finished() {
                self.transition = Some(transition);
            }
        }
        self.transform
    }

    /// Map a screen point into chart space using the on-screen transform
    pub fn to_chart(&self, screen: Point) -> Point {
        self.transform.invert(screen)
    }

    fn zoom_by(&mut self, factor: f64) {
        let base = self.target();
        let (width, height) = self.config.size;
        let screen_center = Point::new(width / 2.0, height / 2.0);
        let anchor = base.invert(screen_center);
        let scale = self.config.clamp(base.scale * factor);
        let target = Transform {
            scale,
            x: screen_center.x - anchor.x * scale,
            y: screen_center.y - anchor.y * scale,
        };
        self.transition_to(target);
    }

    fn centered_on(&self, point: Point, scale: f64) -> Transform {
        let scale = self.config.clamp(scale);
        let (width, height) = self.config.size;
        Transform {
            scale,
            x: width / 2.0 - point.x * scale,
            y: height / 2.0 - point.y * scale,
        }
    }

    fn transition_to(&mut self, target: Transform) {
        self.transition = Some(Transition {
            from: self.transform,
            to: target,
            duration_ms: self.config.transition_ms,
            elapsed_ms: 0.0,
        });
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
