use smallvec::SmallVec;

use crate::layer::{SubPolygon, ZoneId};

/// Ordered set of sub-polygon indices within one layer's current view.
///
/// Renderer events can race a search: indices committed against a pre-search
/// view may be out of range for the freshly loaded one. Those are dropped
/// silently when applied, never surfaced as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    indices: Vec<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline] pub fn indices(&self) -> &[usize] { &self.indices }

    #[inline] pub fn is_empty(&self) -> bool { self.indices.is_empty() }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Replace the selection with `requested`, validated against a view of
    /// `view_len` items: out-of-range indices are dropped, duplicates removed,
    /// first-seen order kept.
    pub fn apply(&mut self, requested: &[usize], view_len: usize) {
        self.indices.clear();
        for &idx in requested {
            if idx < view_len && !self.indices.contains(&idx) {
                self.indices.push(idx);
            }
        }
    }

    /// Distinct parent identifiers of the indexed sub-polygons, in first-seen
    /// order. This is the unit of semantic identity: several sub-polygons of
    /// one multi-part zone resolve to a single id.
    pub fn parent_ids(&self, view: &[SubPolygon]) -> SmallVec<[ZoneId; 8]> {
        let mut ids: SmallVec<[ZoneId; 8]> = SmallVec::new();
        for &idx in &self.indices {
            let parent = &view[idx].parent;
            if !ids.contains(parent) {
                ids.push(parent.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use geo::LineString;

    use super::*;

    fn sub(parent: &str) -> SubPolygon {
        SubPolygon {
            ring: LineString::from(vec![(0., 0.), (1., 0.), (0., 1.), (0., 0.)]),
            parent: parent.into(),
            attrs: Vec::new(),
        }
    }

    #[test]
    fn apply_drops_stale_indices() {
        let mut sel = SelectionSet::new();
        sel.apply(&[0, 4, 2, 9], 3);
        assert_eq!(sel.indices(), &[0, 2]);
    }

    #[test]
    fn apply_dedups_preserving_order() {
        let mut sel = SelectionSet::new();
        sel.apply(&[2, 0, 2, 1, 0], 3);
        assert_eq!(sel.indices(), &[2, 0, 1]);
    }

    #[test]
    fn all_stale_degrades_to_empty() {
        let mut sel = SelectionSet::new();
        sel.apply(&[5, 6], 3);
        assert!(sel.is_empty());
    }

    #[test]
    fn parent_ids_collapse_multipart_duplicates() {
        let view = vec![sub("7"), sub("7"), sub("9")];
        let mut sel = SelectionSet::new();
        sel.apply(&[0, 1, 2], view.len());
        let ids = sel.parent_ids(&view);
        assert_eq!(ids.as_slice(), &[ZoneId::from("7"), ZoneId::from("9")]);
    }
}
