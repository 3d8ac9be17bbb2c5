use std::collections::BTreeMap;

use crate::config::{LayoutConfig, SpiralConfig};
use crate::ir::Company;

use super::geometry::distance;
use super::{AnchorLayout, PlacementLayout};

/// Pass-scoped record of claimed positions. Created empty for each layout
/// pass, appended to as companies are placed, and dropped with the pass;
/// never shared across passes.
#[derive(Debug, Default)]
pub struct Occupancy {
    claimed: Vec<(f32, f32)>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, point: (f32, f32), margin: f32) -> bool {
        self.claimed
            .iter()
            .all(|claimed| distance(*claimed, point) >= margin)
    }

    pub fn claim(&mut self, point: (f32, f32)) {
        self.claimed.push(point);
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Archimedean spiral probe outward from `base`: the angle advances by a
/// fixed step and the radius grows by `radial_step / 2π` per probe, so the
/// radius gains one `radial_step` per full turn. Returns the claimed point,
/// or `(base, true)` when the bound is exhausted — a deliberate best-effort
/// degradation, not a failure.
fn find_available_position(
    occupancy: &mut Occupancy,
    base: (f32, f32),
    start_radius: f32,
    start_angle: f32,
    spiral: &SpiralConfig,
) -> ((f32, f32), bool) {
    let mut radius = start_radius;
    let mut angle = start_angle;

    while radius < spiral.max_radius {
        let candidate = (base.0 + radius * angle.cos(), base.1 + radius * angle.sin());
        if occupancy.is_free(candidate, spiral.margin) {
            occupancy.claim(candidate);
            return (candidate, false);
        }
        angle += spiral.angle_step;
        radius += spiral.radial_step / std::f32::consts::TAU;
    }

    ((base.0, base.1), true)
}

/// Places companies in input order — the spiral search is order-dependent,
/// so input order is part of the contract. Membership is restricted to
/// categories present in the anchor map; companies with no surviving
/// category are dropped from the pass.
pub(super) fn place_companies(
    companies: &[Company],
    anchors: &BTreeMap<String, AnchorLayout>,
    occupancy: &mut Occupancy,
    config: &LayoutConfig,
) -> BTreeMap<String, PlacementLayout> {
    let mut placements = BTreeMap::new();
    let (center_x, center_y) = config.canvas_center();

    for company in companies {
        let surviving: Vec<String> = company
            .categories
            .iter()
            .filter(|name| anchors.contains_key(*name))
            .cloned()
            .collect();
        if surviving.is_empty() {
            continue;
        }

        let (base, start_radius, start_angle) = if surviving.len() == 1 {
            let anchor = &anchors[&surviving[0]];
            (
                anchor.position(),
                config.spiral.single_category_start_radius,
                anchor.angle,
            )
        } else {
            let mut sum = (0.0f32, 0.0f32);
            for name in &surviving {
                let anchor = &anchors[name];
                sum.0 += anchor.x;
                sum.1 += anchor.y;
            }
            let mean = (sum.0 / surviving.len() as f32, sum.1 / surviving.len() as f32);
            let angle = (mean.1 - center_y).atan2(mean.0 - center_x);
            (mean, 0.0, angle)
        };

        let (position, fallback) =
            find_available_position(occupancy, base, start_radius, start_angle, &config.spiral);

        let color_index = anchors[&surviving[0]].color_index;
        placements.insert(
            company.id.clone(),
            PlacementLayout {
                x: position.0,
                y: position.1,
                categories: surviving,
                color_index,
                fallback,
            },
        );
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::anchors::place_anchors;
    use crate::theme::Palette;

    fn company(id: &str, categories: &[&str]) -> Company {
        Company {
            id: id.to_string(),
            name: id.to_string(),
            categories: categories.iter().map(|name| name.to_string()).collect(),
            logo: None,
        }
    }

    fn anchors_for(names: &[&str]) -> BTreeMap<String, AnchorLayout> {
        let visible: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        place_anchors(&visible, &Palette::categorical(), &LayoutConfig::default())
    }

    #[test]
    fn company_without_anchored_category_is_dropped() {
        let anchors = anchors_for(&["Tech"]);
        let companies = vec![company("1", &["Finance"])];
        let mut occupancy = Occupancy::new();
        let placements =
            place_companies(&companies, &anchors, &mut occupancy, &LayoutConfig::default());
        assert!(placements.is_empty());
        assert!(occupancy.is_empty());
    }

    #[test]
    fn placements_keep_minimum_separation() {
        let anchors = anchors_for(&["Tech"]);
        let companies: Vec<Company> = (0..8)
            .map(|i| company(&format!("c{i}"), &["Tech"]))
            .collect();
        let mut occupancy = Occupancy::new();
        let config = LayoutConfig::default();
        let placements = place_companies(&companies, &anchors, &mut occupancy, &config);
        assert_eq!(placements.len(), 8);
        let points: Vec<(f32, f32)> = placements.values().map(|p| p.position()).collect();
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert!(
                    distance(points[i], points[j]) >= config.spiral.margin - 1e-3,
                    "placements {i} and {j} are too close"
                );
            }
        }
        assert!(placements.values().all(|p| !p.fallback));
    }

    #[test]
    fn exhausted_search_falls_back_to_base_point() {
        let anchors = anchors_for(&["Tech"]);
        let mut config = LayoutConfig::default();
        // A bound below the start radius leaves no probes at all.
        config.spiral.max_radius = 10.0;
        let companies = vec![company("1", &["Tech"]), company("2", &["Tech"])];
        let mut occupancy = Occupancy::new();
        let placements = place_companies(&companies, &anchors, &mut occupancy, &config);
        let anchor = &anchors["Tech"];
        for placement in placements.values() {
            assert!(placement.fallback);
            assert_eq!(placement.position(), anchor.position());
        }
    }

    #[test]
    fn crowded_anchor_collapses_onto_one_fallback_point() {
        // Known edge case pending product-level confirmation: when the
        // spiral bound is exhausted for many companies crowded near one
        // anchor, they all land on the same base point.
        let anchors = anchors_for(&["Tech"]);
        let mut config = LayoutConfig::default();
        config.spiral.max_radius = 40.0;
        let companies: Vec<Company> = (0..12)
            .map(|i| company(&format!("c{i}"), &["Tech"]))
            .collect();
        let mut occupancy = Occupancy::new();
        let placements = place_companies(&companies, &anchors, &mut occupancy, &config);
        let fallbacks: Vec<&PlacementLayout> =
            placements.values().filter(|p| p.fallback).collect();
        assert!(fallbacks.len() > 1);
        let first = fallbacks[0].position();
        assert!(fallbacks.iter().all(|p| p.position() == first));
    }

    #[test]
    fn multi_category_company_starts_from_anchor_mean() {
        let anchors = anchors_for(&["Tech", "Finance"]);
        let companies = vec![company("1", &["Tech", "Finance"])];
        let mut occupancy = Occupancy::new();
        let placements =
            place_companies(&companies, &anchors, &mut occupancy, &LayoutConfig::default());
        let placement = &placements["1"];
        let tech = anchors["Tech"].position();
        let finance = anchors["Finance"].position();
        let mean = ((tech.0 + finance.0) / 2.0, (tech.1 + finance.1) / 2.0);
        // First probe has radius zero, so an empty occupancy claims the mean.
        assert_eq!(placement.position(), mean);
        assert_eq!(placement.color_index, anchors["Tech"].color_index);
    }

    #[test]
    fn earlier_placement_is_never_mutated_by_later_ones() {
        let anchors = anchors_for(&["Tech"]);
        let config = LayoutConfig::default();
        let mut occupancy = Occupancy::new();
        let first = place_companies(
            &[company("1", &["Tech"])],
            &anchors,
            &mut occupancy,
            &config,
        );
        let before = first["1"].position();
        let _ = place_companies(
            &[company("2", &["Tech"]), company("3", &["Tech"])],
            &anchors,
            &mut occupancy,
            &config,
        );
        assert_eq!(first["1"].position(), before);
        assert_eq!(occupancy.len(), 3);
    }
}
