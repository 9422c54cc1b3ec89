use std::sync::Arc;

use geo::LineString;

use super::record::{GeometryRecord, ZoneId};

/// One single-ring polygon extracted from a parent record. This is the unit
/// the rendering surface addresses with selection indices; semantic identity
/// stays with the parent id, so several sub-polygons may share one.
#[derive(Debug, Clone)]
pub struct SubPolygon {
    /// Closed exterior ring of one constituent polygon.
    pub ring: LineString<f64>,
    pub parent: ZoneId,
    /// Attribute values aligned with the attribute-name list passed to
    /// [`decompose`]. Absent attributes stay `None`.
    pub attrs: Vec<Option<f64>>,
}

/// Flatten records into independently addressable sub-polygons, one per
/// constituent polygon part, each tagged with its parent id.
///
/// Output order is the selection-index space: records in input order, parts in
/// geometry order. Selection indices captured by the renderer are positional
/// references into this exact sequence, which is why decomposition must run
/// before any indices exist. Records with empty geometry are skipped.
pub fn decompose(records: &[GeometryRecord], attr_names: &[Arc<str>]) -> Vec<SubPolygon> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if record.geom.0.is_empty() {
            continue;
        }
        let attrs: Vec<Option<f64>> = attr_names
            .iter()
            .map(|name| record.attrs.get(name).copied().flatten())
            .collect();
        for part in &record.geom.0 {
            let mut ring = part.exterior().clone();
            ring.close();
            out.push(SubPolygon {
                ring,
                parent: record.id.clone(),
                attrs: attrs.clone(),
            });
        }
    }
    out
}
