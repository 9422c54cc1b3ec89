mod filter;

pub use filter::{buffer_point, clip_records, filter_intersecting, padded_bounds, union_all};

use geo::{BoundingRect, Intersects, MultiPolygon, Rect};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::ZonescopeError;
use crate::layer::{GeometryRecord, RefFrame};

#[derive(Debug, Clone)]
pub struct IndexedBox {
    idx: usize, // Index of corresponding MultiPolygon in geoms
    bbox: Rect<f64>,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// A frame-tagged geometry collection with an r-tree over per-geometry
/// bounding boxes, used to prefilter candidates before exact intersection
/// tests.
#[derive(Debug, Clone)]
pub struct PlanarSet {
    pub frame: RefFrame,
    pub geoms: Vec<MultiPolygon<f64>>,
    rtree: RTree<IndexedBox>,
}

impl PlanarSet {
    /// Construct a PlanarSet from a vector of MultiPolygons. Empty geometries
    /// are kept positionally but never enter the index (they intersect
    /// nothing).
    pub fn new(frame: RefFrame, geoms: Vec<MultiPolygon<f64>>) -> Self {
        let boxes = geoms
            .iter()
            .enumerate()
            .filter_map(|(idx, geom)| geom.bounding_rect().map(|bbox| IndexedBox { idx, bbox }))
            .collect();
        Self { frame, geoms, rtree: RTree::bulk_load(boxes) }
    }

    pub fn from_records(frame: RefFrame, records: &[GeometryRecord]) -> Self {
        Self::new(frame, records.iter().map(|r| r.geom.clone()).collect())
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Indices of member geometries sharing at least one point with
    /// `reference`, in ascending (collection) order. Boundary-only touches
    /// count as intersecting. An empty reference yields an empty result.
    pub fn intersecting(
        &self,
        reference: &MultiPolygon<f64>,
        ref_frame: RefFrame,
    ) -> Result<Vec<usize>, ZonescopeError> {
        if ref_frame != self.frame {
            return Err(ZonescopeError::ReferenceFrameMismatch {
                expected: self.frame.0,
                found: ref_frame.0,
            });
        }
        let Some(rect) = reference.bounding_rect() else {
            return Ok(Vec::new());
        };
        let search = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut hits: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&search)
            .filter(|cand| self.geoms[cand.idx].intersects(reference))
            .map(|cand| cand.idx)
            .collect();
        hits.sort_unstable();
        Ok(hits)
    }
}
