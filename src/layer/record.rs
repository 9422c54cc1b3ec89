use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Stable key for a zone in any layer.
/// Keeps the original identifier text (with leading zeros) but avoids
/// repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub Arc<str>);

impl ZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<i64> for ZoneId {
    fn from(n: i64) -> Self {
        Self(Arc::from(n.to_string().as_str()))
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ZoneId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ZoneId(Arc::from(String::deserialize(deserializer)?.as_str())))
    }
}

/// Planar reference frame tag (EPSG code). Geometry collections must agree on
/// their frame before any spatial predicate runs against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefFrame(pub u32);

impl RefFrame {
    pub const WGS84: RefFrame = RefFrame(4326);
    pub const WEB_MERCATOR: RefFrame = RefFrame(3857);
}

/// One zone as loaded from its source collection: a (possibly multi-part)
/// polygon, its identifier, and a set of nullable numeric attributes.
///
/// Immutable once loaded; filtering clones records into new vectors rather
/// than mutating in place.
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub id: ZoneId,
    pub geom: MultiPolygon<f64>,
    /// Attribute name -> value. `None` means "no data", which downstream
    /// aggregation must distinguish from zero.
    pub attrs: AHashMap<Arc<str>, Option<f64>>,
}

impl GeometryRecord {
    pub fn new(id: ZoneId, geom: MultiPolygon<f64>) -> Self {
        Self { id, geom, attrs: AHashMap::new() }
    }

    pub fn with_attr(mut self, name: &str, value: Option<f64>) -> Self {
        self.attrs.insert(Arc::from(name), value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).copied().flatten()
    }
}
