//! Geographic utilities.
//!
//! Great-circle distance, track length, and the distance-threshold
//! simplification used before animating long routes. All functions expect
//! WGS84 coordinates in degrees, the convention of GPS receivers and the
//! encoded polylines in the activity asset.

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

// ============================================================================
// Distance Functions
// ============================================================================

/// Calculate the great-circle distance between two GPS points using the
/// Haversine formula (spherical Earth, mean radius 6,371 km).
///
/// # Example
/// ```
/// use run_log::GpsPoint;
/// use run_log::geo_utils::haversine_distance;
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
/// let distance = haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a GPS track in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point tracks return 0.0.
pub fn track_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// ============================================================================
// Simplification
// ============================================================================

/// Reduce a track by minimum point spacing.
///
/// Keeps the first point, then keeps a subsequent point only when its
/// great-circle distance from the last kept point exceeds `min_distance`
/// meters. The final point is always kept so the rendered route still ends
/// where the activity did.
///
/// Bounds the per-frame interpolation cost for very long routes without
/// visibly altering the rendered path.
pub fn simplify_track(points: &[GpsPoint], min_distance: f64) -> Vec<GpsPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);

    for point in &points[1..points.len() - 1] {
        let last = kept[kept.len() - 1];
        if haversine_distance(&last, point) > min_distance {
            kept.push(*point);
        }
    }

    kept.push(points[points.len() - 1]);
    kept
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0));
    }

    #[test]
    fn test_track_length_degenerate() {
        let empty: Vec<GpsPoint> = vec![];
        assert_eq!(track_length(&empty), 0.0);

        let single = vec![GpsPoint::new(51.5074, -0.1278)];
        assert_eq!(track_length(&single), 0.0);
    }

    #[test]
    fn test_track_length_two_points() {
        let track = vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1280),
        ];
        let length = track_length(&track);
        assert!(length > 0.0);
        assert!(length < 100.0); // about 68m
    }

    /// Dense track: ~1.1m point spacing along a meridian.
    fn dense_track(n: usize) -> Vec<GpsPoint> {
        (0..n)
            .map(|i| GpsPoint::new(51.5 + i as f64 * 0.00001, -0.12))
            .collect()
    }

    #[test]
    fn test_simplify_keeps_endpoints() {
        let track = dense_track(200);
        let simplified = simplify_track(&track, 5.0);
        assert_eq!(simplified[0], track[0]);
        assert_eq!(*simplified.last().unwrap(), *track.last().unwrap());
        assert!(simplified.len() <= track.len());
        assert!(simplified.len() < 60); // ~1.1m spacing against a 5m threshold
    }

    #[test]
    fn test_simplify_min_spacing() {
        let track = dense_track(500);
        let min_distance = 5.0;
        let simplified = simplify_track(&track, min_distance);

        // Every consecutive pair except possibly the final one is spaced
        // further apart than the threshold.
        for w in simplified.windows(2).take(simplified.len().saturating_sub(2)) {
            assert!(haversine_distance(&w[0], &w[1]) > min_distance);
        }
    }

    #[test]
    fn test_simplify_short_track_untouched() {
        let track = vec![
            GpsPoint::new(51.5, -0.12),
            GpsPoint::new(51.5001, -0.12),
        ];
        assert_eq!(simplify_track(&track, 5.0), track);
    }
}
