mod record;
mod store;
mod subpoly;

pub use record::{GeometryRecord, RefFrame, ZoneId};
pub use store::{Layer, LayerKind, LayerStore};
pub use subpoly::{decompose, SubPolygon};
