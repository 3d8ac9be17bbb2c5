use crate::theme::{Palette, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spiral-search parameters for collision-avoiding company placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralConfig {
    /// Minimum separation between any two claimed positions.
    pub margin: f32,
    /// Start radius for companies anchored to a single category.
    pub single_category_start_radius: f32,
    /// Angle increment per probe, in radians.
    pub angle_step: f32,
    /// Radius gained per full turn; the per-probe gain is `radial_step / 2π`.
    pub radial_step: f32,
    /// Search bound. Exhausting it falls back to the unadjusted base point.
    pub max_radius: f32,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            margin: 60.0,
            single_category_start_radius: 30.0,
            angle_step: 0.5,
            radial_step: 10.0,
            max_radius: 200.0,
        }
    }
}

/// Region synthesis parameters: expansion ring sizes, hull simplification
/// thresholds, and curve tension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Points sampled on the ring around the category anchor.
    pub anchor_ring_points: usize,
    /// Radius of the ring around the category anchor.
    pub anchor_ring_radius: f32,
    /// Base radius of the ring around each member; scaled down with distance.
    pub member_ring_radius: f32,
    /// Simplification: drop hull vertices closer than this to the last kept one.
    pub min_vertex_distance: f32,
    /// Simplification: drop hull vertices turning less than this, in radians.
    pub min_turn_angle: f32,
    /// Tangent scale for the smoothed boundary control points.
    pub tension: f32,
    /// A closed organic curve needs at least this many control vertices.
    pub min_boundary_points: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            anchor_ring_points: 6,
            anchor_ring_radius: 180.0,
            member_ring_radius: 100.0,
            min_vertex_distance: 40.0,
            min_turn_angle: std::f32::consts::FRAC_PI_6,
            tension: 0.15,
            min_boundary_points: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Logical canvas size; geometry is computed in this untransformed space.
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Anchor circle radius as a fraction of `min(canvas_width, canvas_height)`.
    pub anchor_radius_ratio: f32,
    pub spiral: SpiralConfig,
    pub region: RegionConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 800.0,
            anchor_radius_ratio: 0.3,
            spiral: SpiralConfig::default(),
            region: RegionConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn canvas_center(&self) -> (f32, f32) {
        (self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    pub fn anchor_radius(&self) -> f32 {
        self.canvas_width.min(self.canvas_height) * self.anchor_radius_ratio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Paged-document page size (A4 landscape).
    pub page_width_mm: f32,
    pub page_height_mm: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            page_width_mm: 297.0,
            page_height_mm: 210.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub palette: Palette,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            palette: Palette::categorical(),
            layout: LayoutConfig::default(),
            render,
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    palette: Option<Vec<String>>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
    export: Option<ExportConfig>,
    theme: Option<Theme>,
}

/// Loads a JSON config file; absent path or absent sections keep defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(colors) = parsed.palette {
        config.palette = Palette::from_colors(colors);
    }
    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(export) = parsed.export {
        config.export = export;
    }
    if let Some(theme) = parsed.theme {
        config.theme = theme;
    }

    Ok(config)
}
