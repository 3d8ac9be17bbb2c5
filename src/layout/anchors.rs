use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::theme::Palette;

use super::AnchorLayout;

/// Places each visible category on a circle around the canvas center: anchor
/// `i` of `N` sits at angle `i * 2π/N - π/2`, so the first category is at the
/// top and the rest follow clockwise. Color indices follow list order and
/// wrap through the palette.
pub(super) fn place_anchors(
    visible: &[String],
    palette: &Palette,
    config: &LayoutConfig,
) -> BTreeMap<String, AnchorLayout> {
    let mut anchors = BTreeMap::new();
    if visible.is_empty() {
        return anchors;
    }

    let (center_x, center_y) = config.canvas_center();
    let radius = config.anchor_radius();
    let angle_step = std::f32::consts::TAU / visible.len() as f32;

    for (index, name) in visible.iter().enumerate() {
        let angle = index as f32 * angle_step - std::f32::consts::FRAC_PI_2;
        anchors.insert(
            name.clone(),
            AnchorLayout {
                x: center_x + radius * angle.cos(),
                y: center_y + radius * angle.sin(),
                color_index: index % palette.len().max(1),
                angle,
            },
        );
    }

    anchors
}
