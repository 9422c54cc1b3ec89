use std::sync::Arc;

use ahash::AHashMap;
use geo::{BoundingRect, Centroid, MultiPolygon};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::BufferPolicy;
use crate::error::ZonescopeError;
use crate::geometry::{
    buffer_point, clip_records, filter_intersecting, padded_bounds, union_all, PlanarSet,
};
use crate::layer::{GeometryRecord, Layer, LayerKind, LayerStore, RefFrame, ZoneId};

use super::aggregate::{summarize_with_total, Row};
use super::selection::SelectionSet;
use super::viewport::{expand_bounds, PanelId, ViewportSync};

/// Where the selection cascade currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No coarse-zone search active.
    Idle,
    /// Coarse zone resolved, fine and micro layers populated, no selection.
    Loaded,
    /// Non-empty fine-zone selection; micro layer re-derived from its union.
    Filtered,
}

/// User-facing events the controller consumes. Modeling these explicitly
/// avoids re-deriving "what changed" by diffing before/after values.
#[derive(Debug, Clone)]
pub enum Event {
    SearchRequested { query: String, extra: Vec<String> },
    SelectionChanged { layer: LayerKind, indices: Vec<usize> },
    ZoomSyncRequested { source: PanelId, targets: Vec<PanelId> },
}

/// Cascade behavior knobs, normally derived from [`crate::config::DashboardConfig`].
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    pub buffer: BufferPolicy,
    /// Clip filtered geometries to the reference instead of keeping them whole.
    pub clip: bool,
    /// Viewport margin as a fraction of each axis extent.
    pub viewport_margin: f64,
    /// Absolute pad applied when the searched zone's box is degenerate.
    pub degenerate_pad: f64,
    /// Attribute columns carried onto fine and micro sub-polygons, in table order.
    pub attr_names: Vec<Arc<str>>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            buffer: BufferPolicy::Direct,
            clip: false,
            viewport_margin: 0.05,
            degenerate_pad: 1000.0,
            attr_names: Vec::new(),
        }
    }
}

/// Full geometry collection for one layer, indexed once at load.
#[derive(Debug, Clone)]
struct Pool {
    records: Vec<GeometryRecord>,
    index: PlanarSet,
}

impl Pool {
    fn new(frame: RefFrame, records: Vec<GeometryRecord>) -> Self {
        let index = PlanarSet::from_records(frame, &records);
        Self { records, index }
    }
}

/// One dashboard session: owns the layer store, selections, viewports, and
/// aggregate tables, and advances them in response to events. Single-threaded
/// and run-to-completion; a new search supersedes the previous one by
/// replacing the store wholesale.
#[derive(Debug)]
pub struct Session {
    config: CascadeConfig,
    frame: RefFrame,

    // Full source collections, untouched after construction.
    coarse_all: Pool,
    fine_all: Pool,
    micro_all: Pool,
    coarse_by_id: AHashMap<ZoneId, SmallVec<[usize; 2]>>,

    state: SessionState,
    current: Option<ZoneId>,
    store: LayerStore,
    /// Post-search micro candidates; selection cascades re-filter against this
    /// pool, never against the full collection.
    micro_pool: Pool,

    fine_selection: SelectionSet,
    micro_selection: SelectionSet,
    viewports: ViewportSync,

    fine_rows: Vec<Row>,
    micro_rows: Vec<Row>,
}

impl Session {
    pub fn new(
        config: CascadeConfig,
        frame: RefFrame,
        coarse: Vec<GeometryRecord>,
        fine: Vec<GeometryRecord>,
        micro: Vec<GeometryRecord>,
    ) -> Self {
        let mut coarse_by_id: AHashMap<ZoneId, SmallVec<[usize; 2]>> = AHashMap::new();
        for (idx, record) in coarse.iter().enumerate() {
            coarse_by_id.entry(record.id.clone()).or_default().push(idx);
        }
        let width = config.attr_names.len();
        Self {
            config,
            frame,
            coarse_all: Pool::new(frame, coarse),
            fine_all: Pool::new(frame, fine),
            micro_all: Pool::new(frame, micro),
            coarse_by_id,
            state: SessionState::Idle,
            current: None,
            store: LayerStore::empty(frame),
            micro_pool: Pool::new(frame, Vec::new()),
            fine_selection: SelectionSet::new(),
            micro_selection: SelectionSet::new(),
            viewports: ViewportSync::new(),
            fine_rows: summarize_with_total(&[], &[], width),
            micro_rows: summarize_with_total(&[], &[], width),
        }
    }

    #[inline] pub fn state(&self) -> SessionState { self.state }

    #[inline] pub fn store(&self) -> &LayerStore { &self.store }

    /// Identifier of the currently searched coarse zone, if any.
    #[inline] pub fn current_zone(&self) -> Option<&ZoneId> { self.current.as_ref() }

    /// Current fine-zone table, always ending in the total row.
    #[inline] pub fn fine_table(&self) -> &[Row] { &self.fine_rows }

    /// Current micro-unit table, always ending in the total row.
    #[inline] pub fn micro_table(&self) -> &[Row] { &self.micro_rows }

    #[inline] pub fn viewports(&self) -> &ViewportSync { &self.viewports }

    #[inline] pub fn viewports_mut(&mut self) -> &mut ViewportSync { &mut self.viewports }

    pub fn handle(&mut self, event: Event) -> Result<(), ZonescopeError> {
        match event {
            Event::SearchRequested { query, extra } => self.search(&query, &extra),
            Event::SelectionChanged { layer, indices } => {
                self.select(layer, &indices);
                Ok(())
            }
            Event::ZoomSyncRequested { source, targets } => {
                self.viewports.copy_once(source, &targets);
                Ok(())
            }
        }
    }

    /// Resolve a coarse zone by identifier and repopulate all layers.
    ///
    /// The new store is assembled off to the side and swapped in atomically:
    /// a failed precondition mid-way leaves the prior state fully intact, and
    /// no observer ever sees one layer from a new search next to another from
    /// the old one.
    pub fn search(&mut self, query: &str, extra: &[String]) -> Result<(), ZonescopeError> {
        let id = parse_zone_id(query)?;

        let Some(rows) = self.coarse_by_id.get(&id) else {
            info!(id = %id, "coarse zone not found, clearing layers");
            self.reset_to_idle();
            return Err(ZonescopeError::NotFound(id));
        };

        let matches: Vec<GeometryRecord> =
            rows.iter().map(|&i| self.coarse_all.records[i].clone()).collect();
        let coarse_union = union_all(matches.iter().map(|r| &r.geom));
        let reference = self.reference_geometry(&coarse_union);

        let mut fine = filter_intersecting(
            &self.fine_all.records,
            &self.fine_all.index,
            &reference,
            self.frame,
        )?;
        let mut micro = filter_intersecting(
            &self.micro_all.records,
            &self.micro_all.index,
            &reference,
            self.frame,
        )?;
        if self.config.clip {
            clip_records(&mut fine, &reference);
            clip_records(&mut micro, &reference);
        }

        let highlight = self.highlight_records(extra, &id);

        let attrs = &self.config.attr_names;
        let store = LayerStore {
            coarse: Layer::from_records(LayerKind::Coarse, self.frame, matches, &[]),
            fine: Layer::from_records(LayerKind::Fine, self.frame, fine, attrs),
            micro: Layer::from_records(LayerKind::Micro, self.frame, micro, attrs),
            highlight: Layer::from_records(LayerKind::Coarse, self.frame, highlight, &[]),
        };

        info!(
            id = %id,
            fine = store.fine.view.len(),
            micro = store.micro.view.len(),
            "search resolved"
        );

        if let Some(rect) = coarse_union.bounding_rect() {
            let viewport =
                expand_bounds(rect, self.config.viewport_margin, self.config.degenerate_pad);
            self.viewports.set_bounds(PanelId::Primary, viewport);
            // Every search starts all panels on the same view.
            self.viewports.copy_once(
                PanelId::Primary,
                &[PanelId::Fine, PanelId::Combined, PanelId::Micro],
            );
        }

        self.micro_pool = Pool::new(self.frame, store.micro.records.clone());
        self.store = store;
        self.current = Some(id);
        self.fine_selection.clear();
        self.micro_selection.clear();
        self.refresh_tables();
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Apply a committed selection-index change on one layer.
    ///
    /// Fine-zone selections cascade into the micro layer; micro selections
    /// only drive aggregation. That asymmetry is deliberate. Coarse-layer
    /// selections and any event arriving while idle are ignored as stale.
    pub fn select(&mut self, layer: LayerKind, indices: &[usize]) {
        if self.state == SessionState::Idle {
            debug!(?layer, "selection ignored: no search active");
            return;
        }
        match layer {
            LayerKind::Coarse => {}
            LayerKind::Fine => self.select_fine(indices),
            LayerKind::Micro => {
                self.micro_selection.apply(indices, self.store.micro.view.len());
                self.refresh_tables();
            }
        }
    }

    fn select_fine(&mut self, indices: &[usize]) {
        self.fine_selection.apply(indices, self.store.fine.view.len());

        if self.fine_selection.is_empty() {
            // Clearing restores the full post-search candidate pool.
            self.store.micro = Layer::from_records(
                LayerKind::Micro,
                self.frame,
                self.micro_pool.records.clone(),
                &self.config.attr_names,
            );
            self.micro_selection.clear();
            self.refresh_tables();
            self.state = SessionState::Loaded;
            return;
        }

        let parents = self.fine_selection.parent_ids(&self.store.fine.view);
        let union = union_all(
            self.store
                .fine
                .records
                .iter()
                .filter(|r| parents.contains(&r.id))
                .map(|r| &r.geom),
        );
        debug!(zones = parents.len(), "cascading fine selection into micro layer");

        // Frames agree by construction; an empty union simply filters to nothing.
        let micro = filter_intersecting(
            &self.micro_pool.records,
            &self.micro_pool.index,
            &union,
            self.frame,
        )
        .unwrap_or_default();
        self.store.micro =
            Layer::from_records(LayerKind::Micro, self.frame, micro, &self.config.attr_names);
        self.micro_selection.clear();
        self.refresh_tables();
        self.state = SessionState::Filtered;
    }

    fn reference_geometry(&self, coarse_union: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self.config.buffer {
            BufferPolicy::Direct => coarse_union.clone(),
            BufferPolicy::Centroid { radius } => coarse_union
                .centroid()
                .map(|c| buffer_point(c, radius))
                .unwrap_or_else(|| MultiPolygon::new(Vec::new())),
            BufferPolicy::Geometry { radius } => padded_bounds(coarse_union, radius),
        }
    }

    /// Extra coarse zones for side-by-side highlighting. Unknown or
    /// unparsable extras are skipped, and the searched zone itself is not
    /// duplicated into the overlay.
    fn highlight_records(&self, extra: &[String], searched: &ZoneId) -> Vec<GeometryRecord> {
        let mut out = Vec::new();
        for raw in extra {
            let Ok(id) = parse_zone_id(raw) else {
                debug!(raw = %raw, "skipping unparsable highlight id");
                continue;
            };
            if id == *searched {
                continue;
            }
            if let Some(rows) = self.coarse_by_id.get(&id) {
                out.extend(rows.iter().map(|&i| self.coarse_all.records[i].clone()));
            }
        }
        out
    }

    fn refresh_tables(&mut self) {
        let width = self.config.attr_names.len();
        self.fine_rows =
            summarize_with_total(&self.store.fine.view, self.fine_selection.indices(), width);
        self.micro_rows =
            summarize_with_total(&self.store.micro.view, self.micro_selection.indices(), width);
    }

    fn reset_to_idle(&mut self) {
        self.store = LayerStore::empty(self.frame);
        self.micro_pool = Pool::new(self.frame, Vec::new());
        self.current = None;
        self.fine_selection.clear();
        self.micro_selection.clear();
        self.refresh_tables();
        self.state = SessionState::Idle;
    }
}

fn parse_zone_id(query: &str) -> Result<ZoneId, ZonescopeError> {
    let trimmed = query.trim();
    trimmed
        .parse::<i64>()
        .map(ZoneId::from)
        .map_err(|_| ZonescopeError::InvalidInput(query.to_string()))
}
