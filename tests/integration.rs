//! End-to-end tests exercising the cache, renderer, layout, and tick
//! generator together through the public API.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use genotrack::data::{FeatureSource, InMemoryFeatureSource};
use genotrack::feature::FeatureRecord;
use genotrack::layout::{ZoneDef, ZoneLayout, ZoneLayoutConfig};
use genotrack::ticks::build_ticks;
use genotrack::track::{
    CacheSnapshot, GeneRenderStrategy, IncrementalRenderer, Track, TrackCache, TrackOptions,
    Transition,
};
use genotrack::viewport::{Brush, Viewport};

fn gene(name: &str, start: u64, end: u64) -> FeatureRecord {
    let mut record = FeatureRecord {
        start_index: start,
        end_index: end,
        feature: Some("gene".into()),
        value: 1.0,
        ..Default::default()
    };
    record.attributes.insert("Name".into(), name.into());
    record
}

fn update_until_settled(track: &mut Track, viewport: &Viewport) {
    for _ in 0..200 {
        if track.update(viewport).is_some() && !track.has_pending_fetch() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("track never settled");
}

#[test]
fn translate_taken_for_small_zoom_drift() {
    // built at factor 2.0, asked to draw at factor 1.95: ratio 0.975 sits
    // inside the tolerance band, so the frame is a pure transform update
    let built = Viewport::new(Brush::new(1000.0, 1500.0), 1000.0, 100_000);
    assert_eq!(built.factor, 2.0);
    let mut cache = TrackCache {
        viewport: Some(CacheSnapshot::of(&built)),
        is_new: true,
        ..Default::default()
    };
    let mut renderer = IncrementalRenderer::new();
    let mut strategy = GeneRenderStrategy::new();
    renderer.render(&built, &mut cache, &mut strategy, false);

    let drifted = Viewport::new(Brush::new(1000.0, 1512.8), 1000.0, 100_000);
    assert!((drifted.factor - 1.95).abs() < 1e-2);
    let transition = renderer.render(&drifted, &mut cache, &mut strategy, false);
    assert!(matches!(transition, Some(Transition::Translate(_))));
}

#[test]
fn fresh_cache_forces_rebuild_even_when_brush_matches() {
    let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
    let mut cache = TrackCache {
        viewport: Some(CacheSnapshot::of(&vp)),
        is_new: true,
        ..Default::default()
    };
    let mut renderer = IncrementalRenderer::new();
    let mut strategy = GeneRenderStrategy::new();
    renderer.render(&vp, &mut cache, &mut strategy, false);
    assert!(!cache.is_new);

    // a new fetch landing resets the flag and the next frame rebuilds
    cache.is_new = true;
    let transition = renderer.render(&vp, &mut cache, &mut strategy, false);
    assert_eq!(transition, Some(Transition::Rebuild));
    assert!(!cache.is_new);
}

#[test]
fn translated_feature_lands_within_a_pixel_of_rebuild() {
    let source = Arc::new(InMemoryFeatureSource::new(vec![gene("A", 1200, 1600)]));
    let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
    let mut track = Track::new(
        TrackOptions::new("genes", 50.0),
        Arc::clone(&source) as Arc<dyn FeatureSource>,
        Box::new(GeneRenderStrategy::new()),
    );
    update_until_settled(&mut track, &vp);

    // same data rendered directly against the panned viewport
    let panned = vp.panned(150.0);
    let mut reference_track = Track::new(
        TrackOptions::new("genes", 50.0),
        source,
        Box::new(GeneRenderStrategy::new()),
    );
    update_until_settled(&mut reference_track, &panned);

    // the first track translates on its stale cache
    let transition = track.update(&panned);
    let translated_x = track.container().to_screen_x(
        (1200.0 - vp.brush.start) * vp.factor,
    );
    let rebuilt_x = panned.project_brush_bp_to_pixel(1200.0);
    if matches!(transition, Some(Transition::Translate(_))) {
        assert!((translated_x - rebuilt_x).abs() < 1.0);
    }
    assert!((reference_track.container().x).abs() < f64::EPSILON);
}

#[test]
fn identical_brush_never_refetches() {
    let source = Arc::new(InMemoryFeatureSource::new(vec![gene("A", 1200, 1600)]));
    let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
    let mut track = Track::new(
        TrackOptions::new("genes", 50.0),
        Arc::clone(&source) as Arc<dyn FeatureSource>,
        Box::new(GeneRenderStrategy::new()),
    );
    update_until_settled(&mut track, &vp);
    let fetches = source.fetch_count();
    for _ in 0..5 {
        track.update(&vp);
    }
    assert_eq!(source.fetch_count(), fetches);
}

#[test]
fn stale_cache_keeps_projecting_until_fetch_lands() {
    let source = Arc::new(
        InMemoryFeatureSource::new(vec![gene("A", 1200, 1600)])
            .with_latency(Duration::from_millis(80)),
    );
    let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
    let mut track = Track::new(
        TrackOptions::new("genes", 50.0),
        source,
        Box::new(GeneRenderStrategy::new()),
    );
    update_until_settled(&mut track, &vp);
    let before = track.container().children.clone();

    // pan: the refetch is in flight, the frame translates the old scene
    let panned = vp.panned(300.0);
    let transition = track.update(&panned);
    assert!(matches!(transition, Some(Transition::Translate(_))));
    assert_eq!(track.container().children, before);
    assert!(track.has_pending_fetch());

    update_until_settled(&mut track, &panned);
    assert!(!track.has_pending_fetch());
}

#[test]
fn zone_positions_follow_expand_state() {
    // sequence zone with aminoacid sub-zones above a strand zone
    let mut layout = ZoneLayout::new(ZoneLayoutConfig::default());
    layout.configure(&[
        ZoneDef::with_zones(
            "sequence",
            vec![ZoneDef::named("aminoacids"), ZoneDef::named("nucleotides")],
        ),
        ZoneDef::named("strand"),
    ]);

    let sequence_height = layout.get_height(&["sequence"]).unwrap();
    let strand_start = layout.get_start_position(&["strand"]).unwrap();
    assert_eq!(strand_start, sequence_height + 2.0);

    // collapsing the sequence zone pulls the strand zone up
    layout.collapse(&["sequence"]);
    let collapsed_start = layout.get_start_position(&["strand"]).unwrap();
    assert_eq!(collapsed_start, 10.0 + 2.0);
    assert!(collapsed_start < strand_start);

    layout.expand(&["sequence"]);
    assert_eq!(layout.get_start_position(&["strand"]).unwrap(), strand_start);
}

#[test]
fn ruler_ticks_for_kilobase_range() {
    let ticks = build_ticks(1000.0, 10);
    let step = ticks[1].value - ticks[0].value;
    assert_eq!(step, 100.0);
    assert_eq!(ticks[0].value, 0.0);
    assert!(ticks.last().unwrap().value >= 1000.0);
    for pair in ticks.windows(2) {
        assert_eq!(pair[1].value - pair[0].value, step);
    }
}

#[test]
fn vertical_scroll_limits_follow_content() {
    let records: Vec<_> = (0..12)
        .map(|i| gene(&format!("g{i}"), 1000, 1900))
        .collect();
    let vp = Viewport::new(Brush::new(900.0, 2000.0), 500.0, 100_000);
    let mut track = Track::new(
        TrackOptions::new("genes", 50.0),
        Arc::new(InMemoryFeatureSource::new(records)),
        Box::new(GeneRenderStrategy::new()),
    );
    update_until_settled(&mut track, &vp);

    // 12 stacked genes exceed the 50px track height
    assert!(track.scroll_bar().is_some());
    track.on_scroll(10_000.0);
    let bar = track.scroll_bar().unwrap();
    assert!(bar.thumb_y + bar.thumb_height <= 50.0 + 1e-9);
    assert!(track.scroll_offset() < 0.0);

    track.on_scroll(-20_000.0);
    assert_eq!(track.scroll_offset(), 0.0);
}
