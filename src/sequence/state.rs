//! Layout state and viewport geometry for sequence policies

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::SequenceConfig;

/// A 2D point in the diagram coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Opaque pan/zoom transform carried alongside node positions. Policies
/// pass it through unchanged so the caller's viewport does not jump between
/// steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

/// The output of one solve and the seed candidate for the next: node id →
/// position, plus the viewport transform the user had at that point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub positions: IndexMap<String, Point>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, id: impl Into<String>, x: f64, y: f64) -> Self {
        self.positions.insert(id.into(), Point::new(x, y));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }
}

/// The visible coordinate rectangle used to keep generated or jittered
/// positions on-screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ViewportBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Swap min/max per axis where needed so min ≤ max holds.
    pub fn normalized(self) -> Self {
        Self {
            min_x: self.min_x.min(self.max_x),
            max_x: self.min_x.max(self.max_x),
            min_y: self.min_y.min(self.max_y),
            max_y: self.min_y.max(self.max_y),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }
}

/// Resolve the viewport bounds a policy should confine its hints to.
///
/// Explicit finite bounds win (normalized so min ≤ max per axis). Otherwise
/// the bounding box of the prior positions is expanded by
/// `max(min padding, ratio × larger dimension)`. With no prior positions the
/// configured default box applies.
pub fn resolve_viewport(
    explicit: Option<ViewportBounds>,
    prior: Option<&LayoutState>,
    config: &SequenceConfig,
) -> ViewportBounds {
    if let Some(bounds) = explicit {
        if bounds.is_finite() {
            return bounds.normalized();
        }
    }

    let positions = match prior {
        Some(state) if !state.is_empty() => &state.positions,
        _ => return config.default_viewport,
    };

    let mut bounds = ViewportBounds::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );
    for point in positions.values() {
        bounds.min_x = bounds.min_x.min(point.x);
        bounds.min_y = bounds.min_y.min(point.y);
        bounds.max_x = bounds.max_x.max(point.x);
        bounds.max_y = bounds.max_y.max(point.y);
    }

    let padding = config
        .viewport_padding_min
        .max(config.viewport_padding_ratio * bounds.width().max(bounds.height()));
    ViewportBounds::new(
        bounds.min_x - padding,
        bounds.min_y - padding,
        bounds.max_x + padding,
        bounds.max_y + padding,
    )
}
