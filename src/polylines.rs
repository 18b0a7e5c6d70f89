//! Encoded-polyline decoding and the China coordinate fix-up.
//!
//! Activity geometry arrives as standard delta-encoded polyline strings at
//! precision 1e5. Decoding fails soft: malformed input yields an empty
//! track, never an error, so downstream renderers treat it as "no route to
//! draw" rather than an error state.

use std::f64::consts::PI;

use log::debug;

use crate::GpsPoint;

// Krasovsky 1940 ellipsoid, as used by the GCJ-02 obfuscation
const A: f64 = 6378245.0;
const EE: f64 = 0.006_693_421_622_965_943;

/// Decode an encoded polyline into an ordered GPS track.
///
/// The encoded axis order is (lat, lon); the returned points expose
/// `lng_lat()` in (lon, lat) order for map consumers. With `fix_crs` set,
/// every decoded point is shifted from WGS84 into GCJ-02 so routes line up
/// with Chinese base-map tiles.
///
/// Malformed or empty input decodes to an empty track.
///
/// # Example
/// ```
/// use run_log::decode_route;
///
/// let track = decode_route("_p~iF~ps|U_ulLnnqC_mqNvxq`@", false);
/// assert_eq!(track.len(), 3);
/// let [lng, lat] = track[0].lng_lat();
/// assert!((lng - (-120.2)).abs() < 1e-9 && (lat - 38.5).abs() < 1e-9);
/// ```
pub fn decode_route(encoded: &str, fix_crs: bool) -> Vec<GpsPoint> {
    if encoded.is_empty() {
        return Vec::new();
    }

    let line = match polyline::decode_polyline(encoded, 5) {
        Ok(line) => line,
        Err(err) => {
            debug!("polyline decode failed, rendering no route: {}", err);
            return Vec::new();
        }
    };

    line.coords()
        .map(|c| {
            // geo convention: x = longitude, y = latitude
            let point = GpsPoint::new(c.y, c.x);
            if fix_crs {
                wgs84_to_gcj02(point)
            } else {
                point
            }
        })
        .collect()
}

/// Whether a track is a degenerate "point" activity: one position, or the
/// same position recorded twice, with no real movement.
pub fn is_point_track(points: &[GpsPoint]) -> bool {
    match points {
        [_] => true,
        [a, b] => a == b,
        _ => false,
    }
}

/// A stand-in track for point activities: a known location duplicated so
/// the map renders a dot instead of nothing.
pub fn point_stand_in(location: GpsPoint) -> Vec<GpsPoint> {
    vec![location, location]
}

// ============================================================================
// WGS84 -> GCJ-02
// ============================================================================

/// Shift a WGS84 coordinate into the GCJ-02 reference used by Chinese map
/// providers. Points outside mainland China pass through unchanged, so the
/// fix-up toggle is safe to leave on for mixed datasets.
pub fn wgs84_to_gcj02(point: GpsPoint) -> GpsPoint {
    if out_of_china(point.latitude, point.longitude) {
        return point;
    }

    let x = point.longitude - 105.0;
    let y = point.latitude - 35.0;
    let mut d_lat = transform_lat(x, y);
    let mut d_lng = transform_lng(x, y);

    let rad_lat = point.latitude / 180.0 * PI;
    let mut magic = rad_lat.sin();
    magic = 1.0 - EE * magic * magic;
    let sqrt_magic = magic.sqrt();

    d_lat = (d_lat * 180.0) / ((A * (1.0 - EE)) / (magic * sqrt_magic) * PI);
    d_lng = (d_lng * 180.0) / (A / sqrt_magic * rad_lat.cos() * PI);

    GpsPoint::new(point.latitude + d_lat, point.longitude + d_lng)
}

fn out_of_china(lat: f64, lng: f64) -> bool {
    !(72.004..=137.8347).contains(&lng) || !(0.8293..=55.8271).contains(&lat)
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0
        + 2.0 * x
        + 3.0 * y
        + 0.2 * y * y
        + 0.1 * x * y
        + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

// ============================================================================
// Unit Tests
// ============================================================================
