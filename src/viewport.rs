//! Map viewport fitting.
//!
//! Computes the `{longitude, latitude, zoom}` the map opens with for a set
//! of route geometries. The fit targets a fixed reference viewport in
//! pixels; the presentation layer scales from there.

use std::f64::consts::PI;

use serde::Serialize;

use crate::polylines::is_point_track;
use crate::{Bounds, GpsPoint};

/// Map viewport: center coordinate and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// World view shown when there is nothing to fit. The dataset's origin
/// region is mainland China, so the fallback centers there.
pub const FALLBACK_VIEWPORT: Viewport = Viewport {
    longitude: 104.0,
    latitude: 35.0,
    zoom: 3.0,
};

/// Zoom for degenerate point activities (render as a dot, close in).
pub const POINT_ZOOM: f64 = 13.0;

/// Fixed overview zoom when more than one route is on the map.
pub const MULTI_ROUTE_ZOOM: f64 = 9.0;

// Reference viewport the fit targets.
const FIT_WIDTH_PX: f64 = 800.0;
const FIT_HEIGHT_PX: f64 = 600.0;
const FIT_PADDING_PX: f64 = 50.0;
const TILE_SIZE: f64 = 512.0;
const MAX_FIT_ZOOM: f64 = 17.0;

/// Compute a viewport containing the first non-empty geometry.
///
/// Deliberately fits the FIRST non-empty geometry rather than the union of
/// all of them, matching the dominant single-route use case; with more than
/// one feature present the fitted zoom is overridden by
/// [`MULTI_ROUTE_ZOOM`].
///
/// Degenerate inputs never fail: no points at all falls back to
/// [`FALLBACK_VIEWPORT`], and a point track centers on the point at
/// [`POINT_ZOOM`].
pub fn compute_viewport(geometries: &[Vec<GpsPoint>]) -> Viewport {
    let Some(track) = geometries.iter().find(|g| !g.is_empty()) else {
        return FALLBACK_VIEWPORT;
    };

    if is_point_track(track) {
        return Viewport {
            longitude: track[0].longitude,
            latitude: track[0].latitude,
            zoom: POINT_ZOOM,
        };
    }

    let Some(bounds) = Bounds::from_points(track) else {
        return FALLBACK_VIEWPORT;
    };
    let center = bounds.center();

    let feature_count = geometries.iter().filter(|g| !g.is_empty()).count();
    let zoom = if feature_count > 1 {
        MULTI_ROUTE_ZOOM
    } else {
        fit_zoom(&bounds)
    };

    Viewport {
        longitude: center.longitude,
        latitude: center.latitude,
        zoom,
    }
}

/// Web-Mercator zoom at which `bounds` fits the padded reference viewport.
fn fit_zoom(bounds: &Bounds) -> f64 {
    let usable_width = FIT_WIDTH_PX - 2.0 * FIT_PADDING_PX;
    let usable_height = FIT_HEIGHT_PX - 2.0 * FIT_PADDING_PX;

    // Fractions of the world (zoom 0 = one TILE_SIZE world) each span covers.
    let lng_fraction = ((bounds.max_lng - bounds.min_lng).abs() / 360.0).max(1e-12);
    let lat_fraction = (mercator_y(bounds.min_lat) - mercator_y(bounds.max_lat))
        .abs()
        .max(1e-12);

    let zoom_x = (usable_width / (TILE_SIZE * lng_fraction)).log2();
    let zoom_y = (usable_height / (TILE_SIZE * lat_fraction)).log2();

    zoom_x.min(zoom_y).clamp(0.0, MAX_FIT_ZOOM)
}

/// Web-Mercator Y in world fractions (0 at the north clamp, 1 at the south).
fn mercator_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin().clamp(-0.9999, 0.9999);
    0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)
}

// ============================================================================
// Unit Tests
// ============================================================================
