use crate::config::load_config;
use crate::ir::{category_universe, normalize_companies, Dataset};
use crate::layout::compute_layout;
use crate::layout_dump::write_scene_dump;
use crate::render::{render_svg, write_output_svg};
use crate::viewport::{PanDirection, Viewport};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mapmaker", version, about = "Euler-style market map renderer")]
pub struct Args {
    /// Input dataset (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/jpeg/pdf). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Hide a category (repeatable)
    #[arg(long = "hide")]
    pub hide: Vec<String>,

    /// Zoom in this many steps before drawing
    #[arg(long = "zoom-in", default_value_t = 0)]
    pub zoom_in: u32,

    /// Zoom out this many steps before drawing
    #[arg(long = "zoom-out", default_value_t = 0)]
    pub zoom_out: u32,

    /// Pan the view by one step: up, down, left or right (repeatable)
    #[arg(long = "pan")]
    pub pan: Vec<String>,

    /// Write the computed scene geometry as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
    Pdf,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let dataset: Dataset = serde_json::from_str(&input)?;
    let companies = normalize_companies(&dataset.companies);
    let universe = category_universe(&dataset.categories, &companies);
    let visible = visible_categories(&universe, &args.hide);

    let mut viewport = Viewport::default();
    for _ in 0..args.zoom_in {
        viewport.zoom_in();
    }
    for _ in 0..args.zoom_out {
        viewport.zoom_out();
    }
    for token in &args.pan {
        let direction = PanDirection::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("unknown pan direction: {token}"))?;
        viewport.pan(direction);
    }

    let scene = compute_layout(&companies, &visible, &config.palette, &config.layout);

    if let Some(path) = args.dump_layout.as_deref() {
        write_scene_dump(path, &scene)?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&scene, &companies, &config.theme, &config.palette, &viewport);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        #[cfg(feature = "export")]
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Pdf => {
            use crate::export::{ExportFormat, Exporter};
            let format = match args.output_format {
                OutputFormat::Png => ExportFormat::Png,
                OutputFormat::Jpeg => ExportFormat::Jpeg,
                _ => ExportFormat::Pdf,
            };
            let output = ensure_output(&args.output, args.output_format)?;
            let mut exporter = Exporter::new(config.render.clone(), config.export.clone());
            exporter.export(
                &scene,
                &companies,
                &config.theme,
                &config.palette,
                format,
                &output,
            )?;
        }
        #[cfg(not(feature = "export"))]
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Pdf => {
            anyhow::bail!("raster/document export requires the 'export' feature");
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn visible_categories(universe: &[String], hidden: &[String]) -> Vec<String> {
    universe
        .iter()
        .filter(|name| !hidden.iter().any(|hidden| hidden == *name))
        .cloned()
        .collect()
}

#[cfg(feature = "export")]
fn ensure_output(output: &Option<PathBuf>, format: OutputFormat) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "output path required for {:?} output",
        format
    ))
}
