//! # Run Log
//!
//! Computational core for a personal running/activity website.
//!
//! This library turns a static JSON snapshot of activities into everything
//! the presentation layer renders:
//! - Route geometry decoded from encoded polylines
//! - Per-year/month/week/day statistics with derived pace and speed
//! - Map viewports fitted to the visible routes
//! - A progressive route-reveal animation state machine
//! - Filter/selection state with `#run_<id>` deep-link support
//!
//! The crate is pure and value-oriented: no I/O, no timers, no DOM. Hosts
//! (a WASM bridge, a static-site generator) feed it the activity asset and
//! wall-clock timestamps, and render the view-models it returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use run_log::{aggregate, ActivityLog, Interval};
//!
//! let asset = r#"[{
//!     "run_id": 1,
//!     "name": "Morning Run",
//!     "distance": 10000.0,
//!     "moving_time": "1:00:00",
//!     "type": "Run",
//!     "start_date_local": "2024-03-15 08:00:00",
//!     "average_speed": 2.77
//! }]"#;
//!
//! let log = ActivityLog::from_json(asset).unwrap();
//! let buckets = aggregate(log.activities(), Some("run"), Interval::Month);
//! assert_eq!(buckets["2024-03"].count, 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, RunLogError};

// Activity records and the immutable asset snapshot
pub mod activity;
pub use activity::{parse_moving_time, Activity, ActivityLog};

// Encoded-polyline decoding and the China coordinate fix-up
pub mod polylines;
pub use polylines::{decode_route, is_point_track, point_stand_in, wgs84_to_gcj02};

// Geographic utilities (distance, track length, simplification)
pub mod geo_utils;

// Free-text location classification with per-run memoization
pub mod locations;
pub use locations::{classify_location, Location, LocationCache};

// Period aggregation (year/month/week/day buckets)
pub mod aggregate;
pub use aggregate::{aggregate, best_streak, sorted_period_keys, Bucket, Interval};

// Map viewport fitting
pub mod viewport;
pub use viewport::{compute_viewport, Viewport};

// Progressive route-reveal animation
pub mod animator;
pub use animator::{find_segment_idx, AnimatorConfig, AnimatorState, RouteAnimator};

// Filter/selection orchestration and the URL-fragment protocol
pub mod view_state;
pub use view_state::{
    derive_view, format_fragment, parse_fragment, reduce, Effect, PeriodSummary, Selection,
    ViewEvent, ViewModel, ViewState,
};

// Compile-time site configuration
pub mod config;

// Display formatting over raw aggregator floats
pub mod format;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use run_log::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// The `[longitude, latitude]` pair map libraries expect (x = lon, y = lat).
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_lng_lat_axis_order() {
        let p = GpsPoint::new(38.5, -120.2);
        assert_eq!(p.lng_lat(), [-120.2, 38.5]);
    }

    #[test]
    fn test_bounds_from_points() {
        let track = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = Bounds::from_points(&track).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);

        let center = bounds.center();
        assert!((center.latitude - 51.505).abs() < 1e-9);
        assert!((center.longitude - (-0.125)).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::from_points(&[]).is_none());
    }
}
