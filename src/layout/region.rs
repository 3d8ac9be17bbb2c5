use crate::config::RegionConfig;

use super::geometry::{convex_hull, distance, turn_angle};
use super::{AnchorLayout, RegionLayout, RegionPoint};

/// Synthesizes the closed organic curve for one category from its anchor and
/// member positions: inflate with synthetic ring points, take the convex
/// hull, simplify it, then smooth the survivors into a rounded loop.
/// Returns None when the category has no members or too few distinct points.
pub(super) fn build_region(
    anchor: &AnchorLayout,
    members: &[(f32, f32)],
    config: &RegionConfig,
) -> Option<RegionLayout> {
    if members.is_empty() {
        return None;
    }

    let mut points = expansion_points(anchor, members, config);
    points.extend_from_slice(members);
    points.push(anchor.position());

    let hull = convex_hull(&points)?;
    let simplified = simplify_hull(&hull, config);
    if simplified.len() < config.min_boundary_points {
        return None;
    }

    let centroid = centroid_of(&simplified);
    Some(RegionLayout {
        boundary: smooth_boundary(&simplified, config.tension),
        centroid,
    })
}

/// Synthetic samples that puff the hull outward: a fixed ring around the
/// anchor, plus a ring around each member whose point count grows and whose
/// radius shrinks with the member's distance from the anchor. The boundary
/// bulges near the category center and tapers further out.
fn expansion_points(
    anchor: &AnchorLayout,
    members: &[(f32, f32)],
    config: &RegionConfig,
) -> Vec<(f32, f32)> {
    let mut points = Vec::new();
    let anchor_pos = anchor.position();

    for i in 0..config.anchor_ring_points {
        let angle = (i as f32 / config.anchor_ring_points as f32) * std::f32::consts::TAU;
        points.push((
            anchor_pos.0 + angle.cos() * config.anchor_ring_radius,
            anchor_pos.1 + angle.sin() * config.anchor_ring_radius,
        ));
    }

    for member in members {
        let base_angle = (member.1 - anchor_pos.1).atan2(member.0 - anchor_pos.0);
        let dist = distance(*member, anchor_pos);
        let count = ((config.anchor_ring_points as f32 * dist / config.anchor_ring_radius) as usize)
            .max(3);
        let radius_scale = (1.0 - dist / (config.anchor_ring_radius * 2.0)).max(0.7);
        for i in 0..count {
            let angle = base_angle + (i as f32 / count as f32) * std::f32::consts::TAU;
            points.push((
                member.0 + angle.cos() * config.member_ring_radius * radius_scale,
                member.1 + angle.sin() * config.member_ring_radius * radius_scale,
            ));
        }
    }

    points
}

/// Walks hull vertices in order, dropping any that sit too close to the last
/// kept vertex or that turn too shallowly; near-duplicate and near-collinear
/// points disappear. When too few survive, vertices are padded back from the
/// original hull order.
fn simplify_hull(hull: &[(f32, f32)], config: &RegionConfig) -> Vec<(f32, f32)> {
    let n = hull.len();
    let mut kept: Vec<(f32, f32)> = Vec::new();

    for (i, &point) in hull.iter().enumerate() {
        let Some(&last) = kept.last() else {
            kept.push(point);
            continue;
        };
        let prev = hull[(i + n - 1) % n];
        let next = hull[(i + 1) % n];
        let angle = turn_angle(prev, point, next).abs();
        if distance(point, last) >= config.min_vertex_distance && angle >= config.min_turn_angle {
            kept.push(point);
        }
    }

    while kept.len() < config.min_boundary_points && kept.len() < n {
        kept.push(hull[kept.len()]);
    }
    kept
}

fn centroid_of(points: &[(f32, f32)]) -> (f32, f32) {
    let n = points.len().max(1) as f32;
    let sum = points
        .iter()
        .fold((0.0f32, 0.0f32), |acc, p| (acc.0 + p.0, acc.1 + p.1));
    (sum.0 / n, sum.1 / n)
}

/// Cardinal-style smoothing: each vertex gets a tangent of half the
/// prev-to-next chord, scaled by the tension, yielding one entry and one
/// exit control point. The renderer joins the midpoint of consecutive exit
/// and entry controls with quadratic segments.
fn smooth_boundary(points: &[(f32, f32)], tension: f32) -> Vec<RegionPoint> {
    let n = points.len();
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let dx = (next.0 - prev.0) / 2.0;
            let dy = (next.1 - prev.1) / 2.0;
            RegionPoint {
                x,
                y,
                entry: (x - dx * tension, y - dy * tension),
                exit: (x + dx * tension, y + dy * tension),
            }
        })
        .collect()
}
