use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::ir::Company;
use crate::layout::{RegionLayout, Scene};
use crate::theme::{Palette, Theme};
use crate::viewport::Viewport;

/// Renders the scene as SVG. The viewport transform wraps the whole scene
/// group, so stored geometry stays untransformed. Logo hrefs are passed per
/// company id; companies without one get an initial-letter placeholder disc.
pub fn render_svg_with_logos(
    scene: &Scene,
    companies: &[Company],
    theme: &Theme,
    palette: &Palette,
    viewport: &Viewport,
    logos: &BTreeMap<String, String>,
) -> String {
    let mut svg = String::new();
    let width = scene.width.max(1.0);
    let height = scene.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(
        "<filter id=\"glow\"><feGaussianBlur stdDeviation=\"3\" result=\"coloredBlur\"/><feMerge><feMergeNode in=\"coloredBlur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
    );
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<g transform=\"translate({:.2},{:.2}) scale({:.4})\">",
        viewport.translate_x, viewport.translate_y, viewport.scale
    ));

    for (category, region) in &scene.regions {
        let Some(anchor) = scene.anchors.get(category) else {
            continue;
        };
        let color = palette.color(anchor.color_index);
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{color}\" fill-opacity=\"{}\" stroke=\"{color}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\" filter=\"url(#glow)\"/>",
            region_path(region),
            theme.region_fill_opacity,
            theme.region_stroke_width,
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{color}\">{}</text>",
            region.centroid.0,
            region.centroid.1 - 20.0,
            theme.font_family,
            theme.region_label_font_size,
            escape_xml(category)
        ));
    }

    let by_id: HashMap<&str, &Company> = companies
        .iter()
        .map(|company| (company.id.as_str(), company))
        .collect();
    let radius = theme.logo_size / 2.0;

    for (id, placement) in &scene.placements {
        let color = palette.color(placement.color_index);
        let name = by_id
            .get(id.as_str())
            .map(|company| company.name.as_str())
            .unwrap_or(id.as_str());

        svg.push_str("<g>");
        svg.push_str(&format!("<title>{}</title>", escape_xml(name)));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius}\" fill=\"{}\" stroke=\"{color}\" stroke-width=\"{}\" filter=\"url(#glow)\"/>",
            placement.x, placement.y, theme.node_fill, theme.node_stroke_width
        ));
        match logos.get(id) {
            Some(href) => {
                let clip_id = format!("logo-clip-{id}");
                svg.push_str(&format!(
                    "<clipPath id=\"{clip_id}\"><circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"/></clipPath>",
                    placement.x,
                    placement.y,
                    radius - 2.0
                ));
                svg.push_str(&format!(
                    "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{clip_id})\"/>",
                    escape_xml(href),
                    placement.x - radius,
                    placement.y - radius,
                    theme.logo_size,
                    theme.logo_size
                ));
            }
            None => {
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{color}\"/>",
                    placement.x,
                    placement.y,
                    radius - 2.0
                ));
                let initial = name.chars().next().unwrap_or('?').to_uppercase();
                svg.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"#FFFFFF\">{}</text>",
                    placement.x,
                    placement.y + radius * 0.3,
                    theme.font_family,
                    radius,
                    escape_xml(&initial.to_string())
                ));
            }
        }
        svg.push_str("</g>");
    }

    svg.push_str("</g>");
    svg.push_str("</svg>");
    svg
}

/// Renders with each company's raw logo reference as-is. The exporter
/// substitutes inlined data URIs through [`render_svg_with_logos`] instead.
pub fn render_svg(
    scene: &Scene,
    companies: &[Company],
    theme: &Theme,
    palette: &Palette,
    viewport: &Viewport,
) -> String {
    let logos: BTreeMap<String, String> = companies
        .iter()
        .filter_map(|company| {
            company
                .logo
                .clone()
                .map(|logo| (company.id.clone(), logo))
        })
        .collect();
    render_svg_with_logos(scene, companies, theme, palette, viewport, &logos)
}

/// One closed rounded loop: each segment is a quadratic curve through the
/// midpoint of the previous vertex's exit control and the next vertex's
/// entry control.
fn region_path(region: &RegionLayout) -> String {
    let points = &region.boundary;
    if points.is_empty() {
        return String::new();
    }
    let mut d = format!("M {:.2},{:.2}", points[0].x, points[0].y);
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let point = &points[i];
        let cx = (prev.exit.0 + point.entry.0) / 2.0;
        let cy = (prev.exit.1 + point.entry.1) / 2.0;
        d.push_str(&format!(" Q {cx:.2},{cy:.2} {:.2},{:.2}", point.x, point.y));
    }
    let last = &points[points.len() - 1];
    let first = &points[0];
    let cx = (last.exit.0 + first.entry.0) / 2.0;
    let cy = (last.exit.1 + first.entry.1) / 2.0;
    d.push_str(&format!(" Q {cx:.2},{cy:.2} {:.2},{:.2} Z", first.x, first.y));
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;

    fn company(id: &str, name: &str, categories: &[&str], logo: Option<&str>) -> Company {
        Company {
            id: id.to_string(),
            name: name.to_string(),
            categories: categories.iter().map(|cat| cat.to_string()).collect(),
            logo: logo.map(|l| l.to_string()),
        }
    }

    fn render_basic(viewport: &Viewport) -> String {
        let visible = vec!["Tech".to_string()];
        let companies = vec![
            company("1", "Acme", &["Tech"], None),
            company("2", "Globex", &["Tech"], Some("logo.png")),
        ];
        let palette = Palette::categorical();
        let config = LayoutConfig::default();
        let scene = compute_layout(&companies, &visible, &palette, &config);
        render_svg(&scene, &companies, &Theme::light(), &palette, viewport)
    }

    #[test]
    fn render_svg_contains_regions_and_companies() {
        let svg = render_basic(&Viewport::default());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Tech"));
        assert!(svg.contains("<title>Acme</title>"));
        assert!(svg.contains("logo.png"));
        assert!(svg.contains("translate(0.00,0.00) scale(1.0000)"));
    }

    #[test]
    fn viewport_transform_wraps_scene_group() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.pan(crate::viewport::PanDirection::Right);
        let svg = render_basic(&viewport);
        assert!(svg.contains("translate(50.00,0.00) scale(1.2000)"));
    }

    #[test]
    fn region_path_is_closed_and_quadratic() {
        let visible = vec!["Tech".to_string()];
        let companies = vec![
            company("1", "Acme", &["Tech"], None),
            company("2", "Globex", &["Tech"], None),
            company("3", "Initech", &["Tech"], None),
        ];
        let palette = Palette::categorical();
        let scene = compute_layout(&companies, &visible, &palette, &LayoutConfig::default());
        let region = scene.regions.get("Tech").unwrap();
        let d = region_path(region);
        assert!(d.starts_with("M "));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches("Q ").count(), region.boundary.len());
    }

    #[test]
    fn escapes_markup_in_names() {
        let visible = vec!["R&D".to_string()];
        let companies = vec![company("1", "<Acme>", &["R&D"], None)];
        let palette = Palette::categorical();
        let scene = compute_layout(&companies, &visible, &palette, &LayoutConfig::default());
        let svg = render_svg(
            &scene,
            &companies,
            &Theme::light(),
            &palette,
            &Viewport::default(),
        );
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("&lt;Acme&gt;"));
    }
}
