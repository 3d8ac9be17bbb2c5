use serde::{Deserialize, Serialize};

/// Categorical palette with modulo wraparound. Indexing never fails: the
/// color for index `i` is `colors[i % colors.len()]`, so identical inputs
/// always reproduce identical colors across visibility toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Twelve-color pastel categorical set.
    pub fn categorical() -> Self {
        Self {
            colors: [
                "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
                "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
        }
    }

    pub fn from_colors(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Self::categorical();
        }
        Self { colors }
    }

    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub region_label_font_size: f32,
    pub text_color: String,
    pub background: String,
    pub region_fill_opacity: f32,
    pub region_stroke_width: f32,
    pub node_fill: String,
    pub node_stroke_width: f32,
    pub logo_size: f32,
    pub watermark_text: String,
    pub watermark_font_family: String,
    pub watermark_font_size: f32,
    pub watermark_color: String,
    pub watermark_opacity: f32,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            region_label_font_size: 20.0,
            text_color: "#374151".to_string(),
            background: "#FFFFFF".to_string(),
            region_fill_opacity: 0.12,
            region_stroke_width: 2.0,
            node_fill: "#FFFFFF".to_string(),
            node_stroke_width: 2.0,
            logo_size: 50.0,
            watermark_text: "MapMaker".to_string(),
            watermark_font_family: "Arial".to_string(),
            watermark_font_size: 48.0,
            watermark_color: "#000000".to_string(),
            watermark_opacity: 0.15,
        }
    }
}
