use crate::layout::Scene;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub width: f32,
    pub height: f32,
    pub anchors: Vec<AnchorDump>,
    pub placements: Vec<PlacementDump>,
    pub regions: Vec<RegionDump>,
}

#[derive(Debug, Serialize)]
pub struct AnchorDump {
    pub category: String,
    pub x: f32,
    pub y: f32,
    pub color_index: usize,
    pub angle: f32,
}

#[derive(Debug, Serialize)]
pub struct PlacementDump {
    pub company: String,
    pub x: f32,
    pub y: f32,
    pub categories: Vec<String>,
    pub color_index: usize,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct RegionDump {
    pub category: String,
    pub centroid: [f32; 2],
    pub boundary: Vec<[f32; 2]>,
}

impl SceneDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let anchors = scene
            .anchors
            .iter()
            .map(|(category, anchor)| AnchorDump {
                category: category.clone(),
                x: anchor.x,
                y: anchor.y,
                color_index: anchor.color_index,
                angle: anchor.angle,
            })
            .collect();

        let placements = scene
            .placements
            .iter()
            .map(|(company, placement)| PlacementDump {
                company: company.clone(),
                x: placement.x,
                y: placement.y,
                categories: placement.categories.clone(),
                color_index: placement.color_index,
                fallback: placement.fallback,
            })
            .collect();

        let regions = scene
            .regions
            .iter()
            .map(|(category, region)| RegionDump {
                category: category.clone(),
                centroid: [region.centroid.0, region.centroid.1],
                boundary: region
                    .boundary
                    .iter()
                    .map(|point| [point.x, point.y])
                    .collect(),
            })
            .collect();

        SceneDump {
            width: scene.width,
            height: scene.height,
            anchors,
            placements,
            regions,
        }
    }
}

pub fn write_scene_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
