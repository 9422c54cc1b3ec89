#![doc = "Zonescope public API"]
pub mod cli;
pub mod commands;
pub mod config;
mod error;
mod geometry;
pub mod io;
mod layer;
mod session;

#[doc(inline)]
pub use error::ZonescopeError;

#[doc(inline)]
pub use layer::{decompose, GeometryRecord, Layer, LayerKind, LayerStore, RefFrame, SubPolygon, ZoneId};

#[doc(inline)]
pub use geometry::{buffer_point, filter_intersecting, union_all, PlanarSet};

#[doc(inline)]
pub use session::{
    summarize, summarize_with_total, CascadeConfig, Event, PanelId, Row, SelectionSet, Session,
    SessionState, Viewport, ViewportSync, TOTAL_ROW_ID,
};

#[doc(inline)]
pub use config::{BufferPolicy, DashboardConfig, LayerSource, ViewportConfig};
