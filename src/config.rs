use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layer::RefFrame;
use crate::session::CascadeConfig;

/// How the reference geometry for overlay filtering is derived from the
/// searched coarse zone. The source system disagreed with itself here, so the
/// choice is configuration rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Intersect directly with the zone geometry.
    Direct,
    /// Circular buffer of `radius` (frame units) around the zone centroid.
    Centroid { radius: f64 },
    /// The zone's bounding rectangle padded by `radius` on every side.
    Geometry { radius: f64 },
}

impl Default for BufferPolicy {
    fn default() -> Self {
        BufferPolicy::Direct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_degenerate_pad")]
    pub degenerate_pad: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { margin: default_margin(), degenerate_pad: default_degenerate_pad() }
    }
}

fn default_margin() -> f64 { 0.05 }
fn default_degenerate_pad() -> f64 { 1000.0 }

fn default_source_frame() -> RefFrame { RefFrame::WGS84 }
fn default_display_frame() -> RefFrame { RefFrame::WEB_MERCATOR }

/// One layer's shapefile bundle: a folder holding the `.shp` and its
/// sidecars, the identifier field, and source-to-canonical column renames
/// (e.g. `"GEOID20" -> "BLOCK_ID"`, `"hh19" -> "HH19"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSource {
    pub path: PathBuf,
    pub id_field: String,
    #[serde(default)]
    pub rename: HashMap<String, String>,
    #[serde(default = "default_source_frame")]
    pub source_frame: RefFrame,
}

/// Dashboard configuration, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub coarse: LayerSource,
    pub fine: LayerSource,
    pub micro: LayerSource,
    /// Canonical attribute columns carried onto fine and micro layers, in
    /// table order.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub buffer: BufferPolicy,
    /// Clip filtered geometries to the reference geometry.
    #[serde(default)]
    pub clip: bool,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default = "default_display_frame")]
    pub display_frame: RefFrame,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn cascade_config(&self) -> CascadeConfig {
        CascadeConfig {
            buffer: self.buffer,
            clip: self.clip,
            viewport_margin: self.viewport.margin,
            degenerate_pad: self.viewport.degenerate_pad,
            attr_names: self.attributes.iter().map(|s| Arc::from(s.as_str())).collect(),
        }
    }
}
