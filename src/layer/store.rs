use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::PlanarSet;

use super::record::{GeometryRecord, RefFrame};
use super::subpoly::{decompose, SubPolygon};

/// The three hierarchical layers, largest to smallest granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Coarse,
    Fine,
    Micro,
}

/// One logical layer: the full-precision records used for spatial predicates
/// plus the decomposed sub-polygon view the renderer indexes into.
#[derive(Debug, Clone)]
pub struct Layer {
    pub kind: LayerKind,
    pub records: Vec<GeometryRecord>,
    pub view: Vec<SubPolygon>,
    pub index: PlanarSet,
}

impl Layer {
    pub fn empty(kind: LayerKind, frame: RefFrame) -> Self {
        Self {
            kind,
            records: Vec::new(),
            view: Vec::new(),
            index: PlanarSet::new(frame, Vec::new()),
        }
    }

    /// Build a layer from filtered records: index the geometries and derive
    /// the sub-polygon view in one pass.
    pub fn from_records(
        kind: LayerKind,
        frame: RefFrame,
        records: Vec<GeometryRecord>,
        attr_names: &[Arc<str>],
    ) -> Self {
        let index = PlanarSet::from_records(frame, &records);
        let view = decompose(&records, attr_names);
        Self { kind, records, view, index }
    }
}

/// Holds the current state of all three layers plus the side-by-side
/// highlight overlay. Replaced wholesale on every search so no observer can
/// see one layer from a new search next to another from the old one.
#[derive(Debug, Clone)]
pub struct LayerStore {
    pub coarse: Layer,
    pub fine: Layer,
    pub micro: Layer,
    /// Extra coarse zones decomposed for display only; never filters anything.
    pub highlight: Layer,
}

impl LayerStore {
    pub fn empty(frame: RefFrame) -> Self {
        Self {
            coarse: Layer::empty(LayerKind::Coarse, frame),
            fine: Layer::empty(LayerKind::Fine, frame),
            micro: Layer::empty(LayerKind::Micro, frame),
            highlight: Layer::empty(LayerKind::Coarse, frame),
        }
    }

    pub fn get(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Coarse => &self.coarse,
            LayerKind::Fine => &self.fine,
            LayerKind::Micro => &self.micro,
        }
    }

    pub fn get_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::Coarse => &mut self.coarse,
            LayerKind::Fine => &mut self.fine,
            LayerKind::Micro => &mut self.micro,
        }
    }
}
