use std::collections::BTreeMap;

use serde::Serialize;

/// Canonical visual center of one category.
#[derive(Debug, Clone, Serialize)]
pub struct AnchorLayout {
    pub x: f32,
    pub y: f32,
    pub color_index: usize,
    pub angle: f32,
}

impl AnchorLayout {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Final position assigned to one company for one layout pass.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementLayout {
    pub x: f32,
    pub y: f32,
    /// Surviving category memberships, in the company's own order.
    pub categories: Vec<String>,
    pub color_index: usize,
    /// True when the spiral search was exhausted and the unadjusted base
    /// point was returned; such placements may overlap others.
    pub fallback: bool,
}

impl PlacementLayout {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One smoothed boundary vertex with its entry and exit control points.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegionPoint {
    pub x: f32,
    pub y: f32,
    pub entry: (f32, f32),
    pub exit: (f32, f32),
}

/// Closed organic curve grouping a category's anchor and members.
#[derive(Debug, Clone, Serialize)]
pub struct RegionLayout {
    pub boundary: Vec<RegionPoint>,
    pub centroid: (f32, f32),
}

/// One layout pass's complete output, in untransformed canvas space.
/// BTreeMap keys keep downstream iteration deterministic.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub anchors: BTreeMap<String, AnchorLayout>,
    pub placements: BTreeMap<String, PlacementLayout>,
    pub regions: BTreeMap<String, RegionLayout>,
    pub width: f32,
    pub height: f32,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty() && self.placements.is_empty()
    }
}
