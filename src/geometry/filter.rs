use geo::{BooleanOps, BoundingRect, LineString, MultiPolygon, Point, Polygon};

use crate::error::ZonescopeError;
use crate::layer::{GeometryRecord, RefFrame};

use super::PlanarSet;

/// Records whose geometry shares at least one point with `reference`.
/// `index` must be built over `candidates` in the same order.
pub fn filter_intersecting(
    candidates: &[GeometryRecord],
    index: &PlanarSet,
    reference: &MultiPolygon<f64>,
    ref_frame: RefFrame,
) -> Result<Vec<GeometryRecord>, ZonescopeError> {
    let hits = index.intersecting(reference, ref_frame)?;
    Ok(hits.into_iter().map(|i| candidates[i].clone()).collect())
}

/// Union of a list of geometries; empty input yields the empty geometry.
pub fn union_all<'a, I>(geoms: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    geoms.into_iter().fold(MultiPolygon::new(Vec::new()), |acc, geom| {
        if acc.0.is_empty() {
            geom.clone()
        } else if geom.0.is_empty() {
            acc
        } else {
            acc.union(geom)
        }
    })
}

/// Circular buffer around a point, approximated with a fixed segment count.
/// Non-positive radii yield the empty geometry.
pub fn buffer_point(center: Point<f64>, radius: f64) -> MultiPolygon<f64> {
    const SEGMENTS: usize = 64;
    if radius <= 0.0 || !radius.is_finite() {
        return MultiPolygon::new(Vec::new());
    }
    let coords: Vec<(f64, f64)> = (0..=SEGMENTS)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i % SEGMENTS) as f64 / SEGMENTS as f64;
            (center.x() + radius * theta.cos(), center.y() + radius * theta.sin())
        })
        .collect();
    MultiPolygon(vec![Polygon::new(LineString::from(coords), Vec::new())])
}

/// Bounding rectangle of `geom` expanded by `pad` on every side, as a
/// geometry. Stands in for a true polygon offset when a buffer around a full
/// geometry is requested; the superset is sound because candidates are still
/// exact-intersected against it.
pub fn padded_bounds(geom: &MultiPolygon<f64>, pad: f64) -> MultiPolygon<f64> {
    let Some(rect) = geom.bounding_rect() else {
        return MultiPolygon::new(Vec::new());
    };
    let expanded = geo::Rect::new(
        (rect.min().x - pad, rect.min().y - pad),
        (rect.max().x + pad, rect.max().y + pad),
    );
    MultiPolygon(vec![expanded.to_polygon()])
}

/// Replace each record's geometry with its intersection with `reference`,
/// dropping records left with no area (boundary-only touches).
pub fn clip_records(records: &mut Vec<GeometryRecord>, reference: &MultiPolygon<f64>) {
    for record in records.iter_mut() {
        record.geom = record.geom.intersection(reference);
    }
    records.retain(|record| !record.geom.0.is_empty());
}
