use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use resvg::tiny_skia::Pixmap;
use thiserror::Error;

pub use resvg::tiny_skia;
pub use usvg::fontdb;

use crate::config::{ExportConfig, RenderConfig};
use crate::ir::Company;
use crate::layout::Scene;
use crate::render::render_svg_with_logos;
use crate::theme::{Palette, Theme};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

/// Terminal failure of one export attempt. A failing stage aborts the whole
/// attempt; no partial artifact is written and the in-memory layout state is
/// untouched.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,
    #[error("failed to parse scene SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("failed to allocate a {0}x{1} raster surface")]
    Surface(u32, u32),
    #[error("failed to encode raster image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to build document: {0}")]
    Document(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rasterizes the assembled scene, stamps the watermark, and writes an image
/// or paged document. Exports are serialized: a request made while one is
/// pending is rejected with [`ExportError::Busy`] rather than interleaved.
#[derive(Debug)]
pub struct Exporter {
    render: RenderConfig,
    export: ExportConfig,
    busy: bool,
}

impl Exporter {
    pub fn new(render: RenderConfig, export: ExportConfig) -> Self {
        Self {
            render,
            export,
            busy: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn export(
        &mut self,
        scene: &Scene,
        companies: &[Company],
        theme: &Theme,
        palette: &Palette,
        format: ExportFormat,
        output: &Path,
    ) -> Result<(), ExportError> {
        if self.busy {
            return Err(ExportError::Busy);
        }
        self.busy = true;
        let result = self.run(scene, companies, theme, palette, format, output);
        self.busy = false;
        result
    }

    fn run(
        &self,
        scene: &Scene,
        companies: &[Company],
        theme: &Theme,
        palette: &Palette,
        format: ExportFormat,
        output: &Path,
    ) -> Result<(), ExportError> {
        let pixmap = render_to_pixmap(scene, companies, theme, palette, &self.render)?;
        match format {
            ExportFormat::Png => {
                pixmap
                    .save_png(output)
                    .map_err(|err| ExportError::Document(err.to_string()))?;
            }
            ExportFormat::Jpeg => {
                self.write_jpeg(&pixmap, output)?;
            }
            ExportFormat::Pdf => {
                self.write_pdf(&pixmap, output)?;
            }
        }
        Ok(())
    }

    fn write_jpeg(&self, pixmap: &Pixmap, output: &Path) -> Result<(), ExportError> {
        let rgb = image::RgbImage::from_raw(
            pixmap.width(),
            pixmap.height(),
            pixmap_rgb_bytes(pixmap),
        )
        .ok_or(ExportError::Surface(pixmap.width(), pixmap.height()))?;
        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, self.export.jpeg_quality);
        rgb.write_with_encoder(encoder)?;
        Ok(())
    }

    /// Fits the raster onto a fixed-size page: centered, scaled to preserve
    /// aspect ratio, letterboxed rather than cropped.
    fn write_pdf(&self, pixmap: &Pixmap, output: &Path) -> Result<(), ExportError> {
        use printpdf::{ImageTransform, Mm, PdfDocument};

        let page_width = self.export.page_width_mm;
        let page_height = self.export.page_height_mm;
        let aspect = pixmap.width() as f32 / pixmap.height() as f32;
        let mut image_width = page_width;
        let mut image_height = page_width / aspect;
        if image_height > page_height {
            image_height = page_height;
            image_width = page_height * aspect;
        }
        let offset_x = (page_width - image_width) / 2.0;
        let offset_y = (page_height - image_height) / 2.0;
        let dpi = pixmap.width() as f32 * 25.4 / image_width;

        let rgb = printpdf::image_crate::RgbImage::from_raw(
            pixmap.width(),
            pixmap.height(),
            pixmap_rgb_bytes(pixmap),
        )
        .ok_or(ExportError::Surface(pixmap.width(), pixmap.height()))?;
        let dynamic = printpdf::image_crate::DynamicImage::ImageRgb8(rgb);

        let (doc, page, layer) = PdfDocument::new(
            "mapping",
            Mm(page_width.into()),
            Mm(page_height.into()),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic);
        pdf_image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(offset_x.into())),
                translate_y: Some(Mm(offset_y.into())),
                dpi: Some(dpi.into()),
                ..Default::default()
            },
        );

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        doc.save(&mut writer)
            .map_err(|err| ExportError::Document(err.to_string()))?;
        Ok(())
    }
}

/// Renders the untransformed scene at the fixed logical size, composites it
/// on a white surface, and stamps the watermark over it. Logo references are
/// inlined first so the raster is self-contained.
pub fn render_to_pixmap(
    scene: &Scene,
    companies: &[Company],
    theme: &Theme,
    palette: &Palette,
    render: &RenderConfig,
) -> Result<Pixmap, ExportError> {
    let logos = resolve_logos(companies);
    let svg = render_svg_with_logos(
        scene,
        companies,
        theme,
        palette,
        &Viewport::default(),
        &logos,
    );

    let width = render.width.max(1.0) as u32;
    let height = render.height.max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface(width, height))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);

    let options = usvg_options();
    let tree = usvg::Tree::from_str(&svg, &options)?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    stamp_watermark(&mut pixmap, theme)?;
    Ok(pixmap)
}

/// Draws the watermark label over an already-rendered surface: centered,
/// rotated -45 degrees, at the theme's watermark opacity.
pub fn stamp_watermark(pixmap: &mut Pixmap, theme: &Theme) -> Result<(), ExportError> {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let cx = width / 2.0;
    let cy = height / 2.0;
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><text x=\"{cx}\" y=\"{cy}\" transform=\"rotate(-45 {cx} {cy})\" text-anchor=\"middle\" dy=\"0.35em\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" fill-opacity=\"{}\">{}</text></svg>",
        theme.watermark_font_family,
        theme.watermark_font_size,
        theme.watermark_color,
        theme.watermark_opacity,
        theme.watermark_text,
    );

    let options = usvg_options();
    let tree = usvg::Tree::from_str(&svg, &options)?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );
    Ok(())
}

fn usvg_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    options.fontdb = Arc::new(db);
    options
}

/// Resolves every logo reference to a self-contained data URI. A reference
/// that cannot be fetched is simply skipped, leaving that logo blank rather
/// than aborting the export.
pub fn resolve_logos(companies: &[Company]) -> BTreeMap<String, String> {
    let mut resolved = BTreeMap::new();
    for company in companies {
        let Some(reference) = company.logo.as_deref() else {
            continue;
        };
        if let Ok(data_uri) = fetch_logo(reference) {
            resolved.insert(company.id.clone(), data_uri);
        }
    }
    resolved
}

fn fetch_logo(reference: &str) -> anyhow::Result<String> {
    if reference.starts_with("data:") {
        return Ok(reference.to_string());
    }
    let (bytes, mime) = if reference.starts_with("http://") || reference.starts_with("https://") {
        let response = reqwest::blocking::get(reference)?.error_for_status()?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes()?.to_vec();
        (bytes, mime)
    } else {
        (std::fs::read(reference)?, None)
    };
    let mime = mime.unwrap_or_else(|| guess_mime(reference).to_string());
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&bytes)))
}

fn guess_mime(reference: &str) -> &'static str {
    let lower = reference.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

/// Un-premultiplies the raster into plain RGB rows; the surface is already
/// composited on white so alpha can be dropped.
fn pixmap_rgb_bytes(pixmap: &Pixmap) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        bytes.push(color.red());
        bytes.push(color.green());
        bytes.push(color.blue());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;

    fn company(id: &str, categories: &[&str], logo: Option<&str>) -> Company {
        Company {
            id: id.to_string(),
            name: id.to_string(),
            categories: categories.iter().map(|cat| cat.to_string()).collect(),
            logo: logo.map(|l| l.to_string()),
        }
    }

    #[test]
    fn unresolvable_logo_is_left_blank() {
        let companies = vec![
            company("1", &["Tech"], Some("/nonexistent/logo.png")),
            company("2", &["Tech"], None),
        ];
        let resolved = resolve_logos(&companies);
        assert!(resolved.is_empty());
    }

    #[test]
    fn data_uri_logo_passes_through() {
        let companies = vec![company("1", &["Tech"], Some("data:image/png;base64,AAAA"))];
        let resolved = resolve_logos(&companies);
        assert_eq!(resolved["1"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn local_logo_is_inlined_as_data_uri() {
        let path = std::env::temp_dir().join("mapmaker_logo_fixture.png");
        std::fs::write(&path, [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
        let companies = vec![company("1", &["Tech"], path.to_str())];
        let resolved = resolve_logos(&companies);
        std::fs::remove_file(&path).ok();
        let uri = &resolved["1"];
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(uri.trim_start_matches("data:image/png;base64,"), "iVBORw==");
    }

    #[test]
    fn render_to_pixmap_composites_on_white() {
        let visible = vec!["Tech".to_string()];
        let companies = vec![company("1", &["Tech"], None)];
        let palette = Palette::categorical();
        let scene = compute_layout(&companies, &visible, &palette, &LayoutConfig::default());
        let pixmap = render_to_pixmap(
            &scene,
            &companies,
            &Theme::light(),
            &palette,
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(pixmap.width(), 1200);
        assert_eq!(pixmap.height(), 800);
        // Corner pixel is outside every region: opaque background.
        let corner = pixmap.pixel(2, 2).unwrap();
        assert_eq!(corner.alpha(), 255);
    }

    #[test]
    fn second_export_is_rejected_while_busy() {
        let mut exporter = Exporter::new(RenderConfig::default(), ExportConfig::default());
        exporter.busy = true;
        let scene = compute_layout(
            &[],
            &[],
            &Palette::categorical(),
            &LayoutConfig::default(),
        );
        let result = exporter.export(
            &scene,
            &[],
            &Theme::light(),
            &Palette::categorical(),
            ExportFormat::Png,
            Path::new("/tmp/mapmaker_busy.png"),
        );
        assert!(matches!(result, Err(ExportError::Busy)));
    }

    #[test]
    fn export_clears_busy_after_failure() {
        let mut exporter = Exporter::new(RenderConfig::default(), ExportConfig::default());
        let scene = compute_layout(
            &[],
            &[],
            &Palette::categorical(),
            &LayoutConfig::default(),
        );
        let result = exporter.export(
            &scene,
            &[],
            &Theme::light(),
            &Palette::categorical(),
            ExportFormat::Png,
            Path::new("/nonexistent-dir/out.png"),
        );
        assert!(result.is_err());
        assert!(!exporter.is_busy());
    }
}
