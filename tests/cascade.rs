// End-to-end cascade scenario on synthetic square fixtures: search a coarse
// zone, select fine zones, watch the micro layer re-filter, clear, and check
// the failure paths stay recoverable.

use std::sync::Arc;

use geo::{polygon, MultiPolygon, Rect};
use zonescope::{
    CascadeConfig, Event, GeometryRecord, LayerKind, PanelId, Session, SessionState, ZoneId,
    ZonescopeError, RefFrame, TOTAL_ROW_ID,
};

const FRAME: RefFrame = RefFrame::WEB_MERCATOR;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> geo::Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
        (x: x0, y: y0),
    ]
}

fn zone(id: &str, parts: Vec<geo::Polygon<f64>>) -> GeometryRecord {
    GeometryRecord::new(id.into(), MultiPolygon(parts))
}

fn fixture() -> Session {
    let coarse = vec![
        zone("5", vec![square(0., 0., 100., 100.)]),
        zone("6", vec![square(200., 0., 300., 100.)]),
    ];
    // Zone 7 is multi-part; its two parts become view indices 0 and 1.
    let fine = vec![
        zone("7", vec![square(0., 0., 40., 50.), square(0., 50., 40., 100.)]),
        zone("9", vec![square(60., 0., 100., 100.)]),
        zone("8", vec![square(40., 0., 60., 100.)]),
        zone("11", vec![square(500., 500., 600., 600.)]),
    ];
    let micro = vec![
        zone("m1", vec![square(5., 5., 15., 15.)]).with_attr("HH", Some(10.0)),
        zone("m2", vec![square(65., 5., 75., 15.)]).with_attr("HH", None),
        zone("m3", vec![square(45., 45., 55., 55.)]).with_attr("HH", Some(99.0)),
        zone("m4", vec![square(5., 55., 15., 65.)]).with_attr("HH", Some(20.0)),
        zone("m5", vec![square(1000., 1000., 1010., 1010.)]).with_attr("HH", Some(1000.0)),
    ];

    let config = CascadeConfig { attr_names: vec![Arc::from("HH")], ..CascadeConfig::default() };
    Session::new(config, FRAME, coarse, fine, micro)
}

fn parents(session: &Session, kind: LayerKind) -> Vec<String> {
    session.store().get(kind).view.iter().map(|s| s.parent.to_string()).collect()
}

#[test]
fn search_populates_layers_and_viewport() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();

    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(session.current_zone(), Some(&ZoneId::from("5")));

    // Fine zone 11 is out of range; zone 7 decomposes into two sub-polygons.
    assert_eq!(parents(&session, LayerKind::Fine), vec!["7", "7", "9", "8"]);
    assert_eq!(parents(&session, LayerKind::Micro), vec!["m1", "m2", "m3", "m4"]);

    // Coarse bbox expanded by 5% per axis, applied to every panel.
    let expected = Rect::new((-5., -5.), (105., 105.));
    for panel in PanelId::ALL {
        assert_eq!(session.viewports().bounds(panel), expected);
    }
}

#[test]
fn fine_selection_cascades_into_micro_layer() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();

    // Indices 0 and 2 resolve to parent ids 7 and 9.
    session
        .handle(Event::SelectionChanged { layer: LayerKind::Fine, indices: vec![0, 2] })
        .unwrap();
    assert_eq!(session.state(), SessionState::Filtered);

    // Micro layer is the post-search pool intersected with union(7, 9):
    // m3 sits in zone 8 and drops out, m5 was never in the pool.
    assert_eq!(parents(&session, LayerKind::Micro), vec!["m1", "m2", "m4"]);

    // Containment: always a subset of the post-search pool.
    for parent in parents(&session, LayerKind::Micro) {
        assert!(["m1", "m2", "m3", "m4"].contains(&parent.as_str()));
    }
}

#[test]
fn micro_selection_aggregates_without_cascading() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();
    session.select(LayerKind::Fine, &[0, 2]);

    let fine_before = parents(&session, LayerKind::Fine);
    session.select(LayerKind::Micro, &[0, 1, 2]);

    // Other layers untouched, fine selection still in force.
    assert_eq!(parents(&session, LayerKind::Fine), fine_before);
    assert_eq!(session.state(), SessionState::Filtered);

    // HH values [10, null, 20] sum to 30 over the numeric subset.
    let table = session.micro_table();
    let total = table.last().unwrap();
    assert_eq!(total.id, TOTAL_ROW_ID.into());
    assert_eq!(total.values, vec![Some(30.0)]);
    assert_eq!(table.len(), 4);
    assert_eq!(table[1].values, vec![None]);
}

#[test]
fn clearing_selection_restores_candidate_pool() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();
    session.select(LayerKind::Fine, &[0, 2]);
    assert_eq!(parents(&session, LayerKind::Micro).len(), 3);

    session.select(LayerKind::Fine, &[]);
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(parents(&session, LayerKind::Micro), vec!["m1", "m2", "m3", "m4"]);

    // Empty selection keeps the running total row, zeroed.
    let total = session.fine_table().last().unwrap();
    assert_eq!(total.values, vec![Some(0.0)]);
}

#[test]
fn stale_indices_are_clamped_not_fatal() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();

    // Index 99 comes from a pre-search view; only the valid ones apply.
    session.select(LayerKind::Fine, &[2, 99]);
    assert_eq!(session.state(), SessionState::Filtered);
    assert_eq!(parents(&session, LayerKind::Micro), vec!["m2"]);

    // An all-stale selection degrades to a clear.
    session.select(LayerKind::Fine, &[50, 51]);
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(parents(&session, LayerKind::Micro).len(), 4);
}

#[test]
fn not_found_clears_layers_without_panicking() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();

    let err = session.search("999999", &[]).unwrap_err();
    assert_eq!(err, ZonescopeError::NotFound(ZoneId::from("999999")));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.current_zone().is_none());
    assert!(session.store().fine.view.is_empty());
    assert!(session.store().micro.view.is_empty());
}

#[test]
fn invalid_input_leaves_state_untouched() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();
    let fine_before = parents(&session, LayerKind::Fine);

    let err = session.search("not-a-number", &[]).unwrap_err();
    assert!(matches!(err, ZonescopeError::InvalidInput(_)));
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(parents(&session, LayerKind::Fine), fine_before);
}

#[test]
fn selection_before_any_search_is_ignored() {
    let mut session = fixture();
    session.select(LayerKind::Fine, &[0, 1]);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.store().micro.view.is_empty());
}

#[test]
fn extra_ids_populate_highlight_overlay_only() {
    let mut session = fixture();
    session
        .handle(Event::SearchRequested {
            query: "5".into(),
            extra: vec!["6".into(), "bogus".into(), "5".into()],
        })
        .unwrap();

    let highlight: Vec<String> =
        session.store().highlight.view.iter().map(|s| s.parent.to_string()).collect();
    assert_eq!(highlight, vec!["6"]);
    // The overlay never affects filtering.
    assert_eq!(parents(&session, LayerKind::Micro), vec!["m1", "m2", "m3", "m4"]);
}

#[test]
fn zoom_sync_is_one_shot() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();

    session.viewports_mut().set_bounds(PanelId::Primary, Rect::new((0., 0.), (100., 100.)));
    session
        .handle(Event::ZoomSyncRequested {
            source: PanelId::Primary,
            targets: vec![PanelId::Fine, PanelId::Combined],
        })
        .unwrap();
    assert_eq!(session.viewports().bounds(PanelId::Fine), Rect::new((0., 0.), (100., 100.)));
    assert_eq!(session.viewports().bounds(PanelId::Combined), Rect::new((0., 0.), (100., 100.)));

    // Panning the source afterwards leaves the synced panels alone.
    session.viewports_mut().set_bounds(PanelId::Primary, Rect::new((10., 10.), (50., 50.)));
    assert_eq!(session.viewports().bounds(PanelId::Fine), Rect::new((0., 0.), (100., 100.)));
}

#[test]
fn new_search_supersedes_selection_state() {
    let mut session = fixture();
    session.search("5", &[]).unwrap();
    session.select(LayerKind::Fine, &[0, 2]);
    assert_eq!(session.state(), SessionState::Filtered);

    session.search("6", &[]).unwrap();
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(session.current_zone(), Some(&ZoneId::from("6")));
    // Zone 6 overlaps nothing; layers are present but empty.
    assert!(parents(&session, LayerKind::Fine).is_empty());
    assert!(parents(&session, LayerKind::Micro).is_empty());
}
