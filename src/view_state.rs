//! Filter/selection orchestration.
//!
//! The orchestrator is a pure reducer: the host adapter translates browser
//! events (clicks, hash changes) into [`ViewEvent`]s, applies
//! [`reduce`], and executes the returned [`Effect`]s (history pushes for
//! the `#run_<id>` deep-link fragment). Derived geo-data and statistics
//! are recomputed by [`derive_view`] whenever the state changes.

use chrono::Datelike;
use log::warn;
use serde::Serialize;

use crate::aggregate::{aggregate, best_streak, sorted_period_keys, Bucket, Interval};
use crate::config;
use crate::polylines::{decode_route, is_point_track, point_stand_in};
use crate::viewport::{compute_viewport, Viewport};
use crate::{Activity, ActivityLog, AnimatorConfig, GpsPoint, LocationCache, RouteAnimator};

/// Which activities are highlighted on the map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Everything passing the active filters
    #[default]
    All,
    /// One activity, deep-linkable via the URL fragment
    Single(u64),
    /// An explicit set (e.g. one day's activities)
    Many(Vec<u64>),
}

/// Active filter and selection state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub year: Option<i32>,
    pub city: Option<String>,
    pub activity_type: Option<String>,
    pub selection: Selection,
}

/// An input to the reducer, produced by the host's event adapter.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    SelectYear(i32),
    SelectCity(String),
    SelectType(String),
    SelectRun(u64),
    SelectRuns(Vec<u64>),
    ClearSelection,
    ClearFilters,
    /// The location hash changed (load or browser navigation)
    FragmentChanged(Option<String>),
}

/// A side effect the host must execute after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push `#run_<id>` without reloading
    SetFragment(u64),
    /// Remove the fragment
    ClearFragment,
}

/// Parse a `#run_<id>` fragment (leading `#` optional).
pub fn parse_fragment(raw: &str) -> Option<u64> {
    raw.strip_prefix('#')
        .unwrap_or(raw)
        .strip_prefix("run_")?
        .parse()
        .ok()
}

/// Render the fragment for a run id.
pub fn format_fragment(run_id: u64) -> String {
    format!("#run_{}", run_id)
}

/// Apply one event to the state.
///
/// Pure aside from warning logs: the same state and event always produce
/// the same next state and effects. A fragment that resolves to a known
/// activity replays exactly the single-run selection a click would have
/// made; one that does not resolve clears the fragment and falls back to
/// the aggregate view.
pub fn reduce(state: &ViewState, event: ViewEvent, log: &ActivityLog) -> (ViewState, Vec<Effect>) {
    let mut next = state.clone();

    match event {
        ViewEvent::SelectYear(year) => {
            next.year = Some(year);
            next.selection = Selection::All;
            (next, vec![Effect::ClearFragment])
        }
        ViewEvent::SelectCity(city) => {
            next.city = Some(city);
            next.selection = Selection::All;
            (next, vec![Effect::ClearFragment])
        }
        ViewEvent::SelectType(kind) => {
            next.activity_type = Some(kind);
            next.selection = Selection::All;
            (next, vec![Effect::ClearFragment])
        }
        ViewEvent::SelectRun(run_id) => select_run(next, run_id, log),
        ViewEvent::SelectRuns(run_ids) => {
            if run_ids.is_empty() {
                next.selection = Selection::All;
                (next, vec![Effect::ClearFragment])
            } else if run_ids.len() == 1 {
                select_run(next, run_ids[0], log)
            } else {
                next.selection = Selection::Many(run_ids);
                (next, vec![Effect::ClearFragment])
            }
        }
        ViewEvent::ClearSelection => {
            next.selection = Selection::All;
            (next, vec![Effect::ClearFragment])
        }
        ViewEvent::ClearFilters => {
            next.year = None;
            next.city = None;
            next.activity_type = None;
            next.selection = Selection::All;
            (next, vec![Effect::ClearFragment])
        }
        ViewEvent::FragmentChanged(None) => {
            next.selection = Selection::All;
            (next, Vec::new())
        }
        ViewEvent::FragmentChanged(Some(raw)) => match parse_fragment(&raw) {
            Some(run_id) if log.get(run_id).is_some() => select_run(next, run_id, log),
            _ => {
                warn!("fragment '{}' does not resolve to an activity", raw);
                next.selection = Selection::All;
                (next, vec![Effect::ClearFragment])
            }
        },
    }
}

fn select_run(mut next: ViewState, run_id: u64, log: &ActivityLog) -> (ViewState, Vec<Effect>) {
    if log.get(run_id).is_none() {
        warn!("run id {} not in the activity set", run_id);
        next.selection = Selection::All;
        return (next, vec![Effect::ClearFragment]);
    }
    next.selection = Selection::Single(run_id);
    (next, vec![Effect::SetFragment(run_id)])
}

// ============================================================================
// Derived View
// ============================================================================

/// One period row for the stats table, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub key: String,
    #[serde(flatten)]
    pub stats: Bucket,
}

/// Everything the presentation layer renders for one state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Route geometries as `[longitude, latitude]` pairs
    pub routes: Vec<Vec<[f64; 2]>>,
    pub viewport: Viewport,
    /// Period summaries, newest first
    pub periods: Vec<PeriodSummary>,
    /// Longest consecutive-day streak among the visible activities
    pub best_streak: u32,
    #[serde(skip)]
    tracks: Vec<Vec<GpsPoint>>,
}

impl ViewModel {
    /// The point sequence the route animator reveals: the visible tracks
    /// concatenated in display order.
    pub fn animation_track(&self) -> Vec<GpsPoint> {
        self.tracks.iter().flatten().copied().collect()
    }

    /// Build an animator for the current view.
    pub fn animator(&self, config: AnimatorConfig) -> RouteAnimator {
        RouteAnimator::new(&self.animation_track(), config)
    }
}

/// Recompute the derived view for a state.
///
/// Decodes the geometry of every visible activity (substituting a
/// classifier coordinate for degenerate point activities so they render
/// as a dot), aggregates them into `interval` buckets, and fits the map
/// viewport. Pure given its inputs; the location cache only memoizes.
pub fn derive_view(
    log: &ActivityLog,
    state: &ViewState,
    cache: &mut LocationCache,
    interval: Interval,
) -> ViewModel {
    let selected = selected_activities(log, state, cache);

    let mut tracks: Vec<Vec<GpsPoint>> = Vec::new();
    for activity in &selected {
        let encoded = activity.summary_polyline.as_deref().unwrap_or("");
        let mut track = decode_route(encoded, config::FIX_CHINA_OFFSET);

        if is_point_track(&track) {
            if let Some(text) = activity.location_country.as_deref() {
                if let Some(hint) = cache.classify(activity.run_id, text).coordinate {
                    track = point_stand_in(hint);
                }
            }
        }
        if !track.is_empty() {
            tracks.push(track);
        }
    }

    let viewport = compute_viewport(&tracks);
    let routes = tracks
        .iter()
        .map(|track| track.iter().map(GpsPoint::lng_lat).collect())
        .collect();

    let mut buckets = aggregate(selected.iter().copied(), None, interval);
    let keys = sorted_period_keys(buckets.keys().cloned().collect::<Vec<_>>(), interval);
    let periods = keys
        .into_iter()
        .filter_map(|key| {
            buckets.remove(&key).map(|stats| PeriodSummary { key, stats })
        })
        .collect();

    ViewModel {
        routes,
        viewport,
        periods,
        best_streak: best_streak(selected.iter().copied()),
        tracks,
    }
}

fn selected_activities<'a>(
    log: &'a ActivityLog,
    state: &ViewState,
    cache: &mut LocationCache,
) -> Vec<&'a Activity> {
    match &state.selection {
        Selection::Single(run_id) => log.get(*run_id).into_iter().collect(),
        Selection::Many(run_ids) => run_ids.iter().filter_map(|id| log.get(*id)).collect(),
        Selection::All => {
            let mut matching = Vec::new();
            for activity in log.activities() {
                if let Some(year) = state.year {
                    if activity.start_local().map(|d| d.year()) != Some(year) {
                        continue;
                    }
                }
                if let Some(kind) = state.activity_type.as_deref() {
                    if !activity.matches_type(kind) {
                        continue;
                    }
                }
                if let Some(city) = state.city.as_deref() {
                    let classified = activity
                        .location_country
                        .as_deref()
                        .map(|text| cache.classify(activity.run_id, text).city.clone())
                        .unwrap_or_default();
                    if classified != city {
                        continue;
                    }
                }
                matching.push(activity);
            }
            matching
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
