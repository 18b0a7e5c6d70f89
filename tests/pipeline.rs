//! Asset-to-view-model integration tests.
//!
//! Exercises the full pipeline the site runs at load: parse the JSON
//! asset, reduce a deep link into selection state, derive the view-model
//! (geometry, statistics, viewport), and animate the selected route to
//! completion with an injected clock.
//!
//! Run with: `cargo test --test pipeline`

use std::cell::RefCell;
use std::rc::Rc;

use run_log::{
    aggregate, derive_view, reduce, AnimatorConfig, AnimatorState, ActivityLog, Effect, Interval,
    LocationCache, Selection, ViewEvent, ViewState,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small but representative asset: a GPS run, a treadmill run with no
/// geometry, and a degenerate point activity with a coordinate hint.
const ASSET: &str = r#"[
  {
    "run_id": 1001,
    "name": "Sierra Traverse",
    "distance": 12000.0,
    "moving_time": "1:10:00",
    "type": "Run",
    "start_date": "2024-03-15T00:00:00Z",
    "start_date_local": "2024-03-15 08:00:00",
    "location_country": "Mono County, California, United States",
    "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
    "average_heartrate": 152.5,
    "average_speed": 2.85,
    "streak": 2
  },
  {
    "run_id": 1002,
    "name": "Treadmill Intervals",
    "distance": 8000.0,
    "moving_time": "0:40:00",
    "type": "Run",
    "start_date_local": "2024-03-16 19:30:00",
    "average_speed": 3.33,
    "streak": 3
  },
  {
    "run_id": 1003,
    "name": "",
    "distance": 5000.0,
    "moving_time": "0:30:00",
    "type": "Run",
    "start_date_local": "2023-11-02 07:00:00",
    "location_country": "{'latitude': 39.904, 'longitude': 116.407}, 海淀区, 北京市, 中国",
    "summary_polyline": "_~orF_kmeU??",
    "average_speed": 2.77,
    "streak": 1
  }
]"#;

#[test]
fn test_asset_loads_and_aggregates() {
    init_logging();
    let log = ActivityLog::from_json(ASSET).expect("asset should parse");
    assert_eq!(log.activities().len(), 3);
    assert_eq!(log.years(), vec![2024, 2023]);

    let buckets = aggregate(log.activities(), Some("run"), Interval::Month);
    assert_eq!(buckets.len(), 2);

    let march = &buckets["2024-03"];
    assert_eq!(march.count, 2);
    assert!((march.total_distance - 20.0).abs() < 1e-9);
    assert_eq!(march.total_time, 4200.0 + 2400.0);
    assert!((march.daily_distances[14] - 12.0).abs() < 1e-9);
    assert!((march.daily_distances[15] - 8.0).abs() < 1e-9);
    assert!((march.max_speed - 3.33).abs() < 1e-9);

    // Full-precision sum invariant across all buckets.
    let total: f64 = buckets.values().map(|b| b.total_distance).sum();
    assert!((total - 25.0).abs() < 1e-9);
}

#[test]
fn test_deep_link_to_animated_view() {
    init_logging();
    let log = ActivityLog::from_json(ASSET).expect("asset should parse");
    let mut cache = LocationCache::new();

    // The host saw `#run_1001` at load and replays it through the reducer.
    let (state, effects) = reduce(
        &ViewState::default(),
        ViewEvent::FragmentChanged(Some("#run_1001".to_string())),
        &log,
    );
    assert_eq!(state.selection, Selection::Single(1001));
    assert_eq!(effects, vec![Effect::SetFragment(1001)]);

    let view = derive_view(&log, &state, &mut cache, Interval::Month);
    assert_eq!(view.routes.len(), 1);
    let [lng, lat] = view.routes[0][0];
    assert!((lng - (-120.2)).abs() < 1e-9);
    assert!((lat - 38.5).abs() < 1e-9);
    assert_eq!(view.periods.len(), 1);
    assert_eq!(view.periods[0].key, "2024-03");

    // Animate the selection to completion on a fake 16ms-frame clock.
    let mut animator = view.animator(AnimatorConfig::default());
    let revealed = Rc::new(RefCell::new(Vec::new()));
    let revealed_handle = Rc::clone(&revealed);
    animator.on_update(move |visible| revealed_handle.borrow_mut().push(visible.len()));

    let mut now = 0.0;
    let mut pending = animator.start(now);
    while pending {
        now += 16.0;
        pending = animator.tick(now);
    }

    assert_eq!(animator.state(), AnimatorState::Completed);
    let revealed = revealed.borrow();
    assert!(revealed.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*revealed.last().unwrap(), animator.points().len());
    let config = AnimatorConfig::default();
    assert!(now >= config.min_duration_ms);
    assert!(now <= config.max_duration_ms + 2.0 * 1000.0 / config.target_fps);
}

#[test]
fn test_point_activity_renders_as_dot() {
    init_logging();
    let log = ActivityLog::from_json(ASSET).expect("asset should parse");
    let mut cache = LocationCache::new();

    let state = ViewState {
        year: Some(2023),
        ..ViewState::default()
    };
    let view = derive_view(&log, &state, &mut cache, Interval::Year);

    // The degenerate track is replaced by the classifier's coordinate
    // hint, duplicated so the map draws a dot.
    assert_eq!(view.routes.len(), 1);
    assert_eq!(view.routes[0], vec![[116.407, 39.904], [116.407, 39.904]]);
    assert_eq!(view.viewport.longitude, 116.407);
    assert_eq!(view.viewport.latitude, 39.904);

    // And the classifier result is memoized for the set's lifetime.
    assert_eq!(cache.len(), 1);
    let location = cache.classify(1003, "ignored for cached ids").clone();
    assert_eq!(location.province, "北京市");
    assert_eq!(location.city, "海淀区");
    assert_eq!(location.country, "中国");
}

#[test]
fn test_widening_selection_clears_deep_link() {
    init_logging();
    let log = ActivityLog::from_json(ASSET).expect("asset should parse");

    let (single, _) = reduce(&ViewState::default(), ViewEvent::SelectRun(1001), &log);
    let (multi, effects) = reduce(&single, ViewEvent::SelectRuns(vec![1001, 1002]), &log);
    assert_eq!(multi.selection, Selection::Many(vec![1001, 1002]));
    assert_eq!(effects, vec![Effect::ClearFragment]);

    // A stale bookmark falls back to the aggregate view.
    let (state, effects) = reduce(
        &ViewState::default(),
        ViewEvent::FragmentChanged(Some("#run_40404".to_string())),
        &log,
    );
    assert_eq!(state.selection, Selection::All);
    assert_eq!(effects, vec![Effect::ClearFragment]);
}
