mod anchors;
mod geometry;
mod placement;
mod region;
pub(crate) mod types;

pub use placement::Occupancy;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::Company;
use crate::theme::Palette;

/// One full layout pass: anchors, collision-avoiding placements, organic
/// regions. Everything is recomputed wholesale from the inputs — a
/// visibility toggle or data refresh reruns the whole pass; nothing is
/// patched incrementally. All output coordinates are untransformed canvas
/// space; the viewport transform is applied at draw time only.
pub fn compute_layout(
    companies: &[Company],
    visible: &[String],
    palette: &Palette,
    config: &LayoutConfig,
) -> Scene {
    let anchors = anchors::place_anchors(visible, palette, config);

    let mut occupancy = Occupancy::new();
    let placements = placement::place_companies(companies, &anchors, &mut occupancy, config);

    let mut regions = std::collections::BTreeMap::new();
    for (name, anchor) in &anchors {
        let members: Vec<(f32, f32)> = placements
            .values()
            .filter(|placement| placement.categories.iter().any(|cat| cat == name))
            .map(|placement| placement.position())
            .collect();
        if let Some(region) = region::build_region(anchor, &members, &config.region) {
            regions.insert(name.clone(), region);
        }
    }

    Scene {
        anchors,
        placements,
        regions,
        width: config.canvas_width,
        height: config.canvas_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Palette;

    fn company(id: &str, categories: &[&str]) -> Company {
        Company {
            id: id.to_string(),
            name: id.to_string(),
            categories: categories.iter().map(|name| name.to_string()).collect(),
            logo: None,
        }
    }

    #[test]
    fn empty_visible_set_produces_empty_scene() {
        let companies = vec![company("1", &["Tech"])];
        let scene = compute_layout(
            &companies,
            &[],
            &Palette::categorical(),
            &LayoutConfig::default(),
        );
        assert!(scene.anchors.is_empty());
        assert!(scene.placements.is_empty());
        assert!(scene.regions.is_empty());
    }

    #[test]
    fn regions_exist_only_for_categories_with_members() {
        let visible = vec!["Tech".to_string(), "Finance".to_string()];
        let companies = vec![company("1", &["Tech"]), company("2", &["Tech"])];
        let scene = compute_layout(
            &companies,
            &visible,
            &Palette::categorical(),
            &LayoutConfig::default(),
        );
        assert!(scene.regions.contains_key("Tech"));
        assert!(!scene.regions.contains_key("Finance"));
    }

    #[test]
    fn layout_is_deterministic_for_identical_input() {
        let visible = vec!["Tech".to_string(), "Finance".to_string()];
        let companies = vec![
            company("1", &["Tech"]),
            company("2", &["Tech", "Finance"]),
            company("3", &["Finance"]),
        ];
        let palette = Palette::categorical();
        let config = LayoutConfig::default();
        let first = compute_layout(&companies, &visible, &palette, &config);
        let second = compute_layout(&companies, &visible, &palette, &config);
        for (id, placement) in &first.placements {
            let other = &second.placements[id];
            assert_eq!(placement.position(), other.position());
            assert_eq!(placement.color_index, other.color_index);
        }
    }
}
