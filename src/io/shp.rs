use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use geo::BoundingRect;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Polygon, PolygonRing, Reader, Shape};
use tracing::debug;

use crate::config::LayerSource;
use crate::layer::{GeometryRecord, RefFrame, ZoneId};

use super::proj::reproject;

/// Locate the `.shp` inside a bundle folder (sidecar files live next to it).
/// First match wins.
pub fn find_shapefile_in_folder(dir: &Path) -> Result<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading bundle folder {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp")))
        .collect();
    entries.sort();
    match entries.into_iter().next() {
        Some(path) => Ok(path),
        None => bail!("no shapefile found in folder: {}", dir.display()),
    }
}

/// Load one layer's records: read the bundle, convert polygon shapes, drop
/// null and zero-bbox geometries, pick up the id field and the requested
/// attribute columns (through the source's rename map), and reproject into
/// the display frame.
pub fn load_layer(
    source: &LayerSource,
    attributes: &[String],
    display: RefFrame,
) -> Result<Vec<GeometryRecord>> {
    let path = find_shapefile_in_folder(&source.path)?;
    let mut reader = Reader::from_path(&path)
        .with_context(|| format!("opening shapefile {}", path.display()))?;

    // Canonical attribute name -> field name in this file.
    let field_names: Vec<(Arc<str>, String)> = attributes
        .iter()
        .map(|canonical| {
            let field = source
                .rename
                .iter()
                .find(|(_, canon)| canon.as_str() == canonical)
                .map(|(src, _)| src.clone())
                .unwrap_or_else(|| canonical.clone());
            (Arc::from(canonical.as_str()), field)
        })
        .collect();

    let mut out = Vec::new();
    let mut dropped = 0_usize;
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("reading shape and record")?;
        let geom = match shape {
            Shape::Polygon(p) => polygon_to_geo(&p),
            _ => continue,
        };
        if is_degenerate(&geom) {
            dropped += 1;
            continue;
        }

        let Some(id) = id_value(&record, &source.id_field) else {
            dropped += 1;
            continue;
        };

        let mut attrs = AHashMap::with_capacity(field_names.len());
        for (canonical, field) in &field_names {
            attrs.insert(canonical.clone(), record.get(field).and_then(numeric_value));
        }

        let geom = reproject(&geom, source.source_frame, display)?;
        out.push(GeometryRecord { id, geom, attrs });
    }

    debug!(
        path = %path.display(),
        loaded = out.len(),
        dropped,
        "layer loaded"
    );
    Ok(out)
}

/// Null/empty geometry and the all-zero bounding box both mean "no usable
/// geometry" in the source data.
fn is_degenerate(geom: &geo::MultiPolygon<f64>) -> bool {
    match geom.bounding_rect() {
        None => true,
        Some(rect) => {
            rect.min().x == 0.0 && rect.min().y == 0.0 && rect.max().x == 0.0 && rect.max().y == 0.0
        }
    }
}

/// Convert a shapefile polygon to `geo::MultiPolygon`. Shapefiles store rings
/// flat, each outer ring followed by its holes.
pub fn polygon_to_geo(p: &Polygon) -> geo::MultiPolygon<f64> {
    fn to_linestring(points: &[shapefile::Point]) -> geo::LineString<f64> {
        let mut coords: Vec<geo::Coord<f64>> =
            points.iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
            if first != last {
                coords.push(first);
            }
        }
        geo::LineString(coords)
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in p.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.take() {
                    polys.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(to_linestring(points));
            }
            PolygonRing::Inner(points) => holes.push(to_linestring(points)),
        }
    }
    if let Some(ext) = exterior {
        polys.push(geo::Polygon::new(ext, holes));
    }

    geo::MultiPolygon(polys)
}

/// Identifier field as a normalized string: integral numerics lose their
/// decimal point, text is trimmed. Missing values yield `None` so the record
/// can be dropped.
fn id_value(record: &Record, field: &str) -> Option<ZoneId> {
    match record.get(field)? {
        FieldValue::Character(Some(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| ZoneId::from(trimmed))
        }
        FieldValue::Numeric(Some(n)) => Some(normalize_numeric_id(*n)),
        FieldValue::Integer(n) => Some(ZoneId::from(i64::from(*n))),
        FieldValue::Double(n) => Some(normalize_numeric_id(*n)),
        FieldValue::Float(Some(n)) => Some(normalize_numeric_id(f64::from(*n))),
        _ => None,
    }
}

fn normalize_numeric_id(n: f64) -> ZoneId {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        ZoneId::from(n as i64)
    } else {
        ZoneId::from(n.to_string().as_str())
    }
}

/// Numeric attribute value; non-numeric fields and missing values both read
/// as null so aggregation can tell "no data" from zero.
fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(n) => *n,
        FieldValue::Integer(n) => Some(f64::from(*n)),
        FieldValue::Double(n) => Some(*n),
        FieldValue::Float(n) => n.map(f64::from),
        FieldValue::Currency(n) => Some(*n),
        _ => None,
    }
}
