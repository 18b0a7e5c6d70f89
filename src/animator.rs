//! Progressive route-reveal animation.
//!
//! An explicit state machine that exposes a route a little at a time, as
//! if the athlete were re-running it at a configurable simulated speed.
//! The host owns the scheduling loop: it injects "now" timestamps into
//! [`RouteAnimator::tick`] and keeps scheduling frames while `tick`
//! returns `true`. Nothing here reads a real clock, which is what makes
//! the machine deterministic under test.
//!
//! States: `Idle -> Running -> Completed`, with `Running -> Idle` on
//! [`RouteAnimator::stop`]. Re-starting always begins from Idle.

use log::debug;

use crate::geo_utils::{haversine_distance, simplify_track};
use crate::GpsPoint;

/// Configuration for the route animation.
#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    /// Simulated travel speed in meters/second (not wall-clock pixels)
    /// Default: 2500.0
    pub speed: f64,

    /// Lower wall-clock bound for the whole animation in ms.
    /// Default: 1500.0
    pub min_duration_ms: f64,

    /// Upper wall-clock bound for the whole animation in ms.
    /// Default: 8000.0
    pub max_duration_ms: f64,

    /// Frame-rate ceiling; ticks arriving faster than this are skipped.
    /// Default: 60.0
    pub target_fps: f64,

    /// Minimum within-segment progress change worth a redraw.
    /// Default: 0.01
    pub update_threshold: f64,

    /// Minimum spacing for point simplification in meters.
    /// Default: 5.0
    pub simplify_min_distance: f64,

    /// Routes longer than this many points are simplified first.
    /// Default: 100
    pub simplify_point_threshold: usize,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            speed: 2500.0,
            min_duration_ms: 1500.0,
            max_duration_ms: 8000.0,
            target_fps: 60.0,
            update_threshold: 0.01,
            simplify_min_distance: 5.0,
            simplify_point_threshold: 100,
        }
    }
}

/// Animation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Running,
    Completed,
}

type UpdateFn = Box<dyn FnMut(&[GpsPoint])>;
type CompleteFn = Box<dyn FnMut()>;

/// Progressive-reveal engine for one route.
///
/// # Example
/// ```
/// use run_log::{AnimatorConfig, GpsPoint, RouteAnimator};
///
/// let route = vec![
///     GpsPoint::new(51.500, -0.130),
///     GpsPoint::new(51.510, -0.120),
/// ];
/// let mut animator = RouteAnimator::new(&route, AnimatorConfig::default());
/// animator.on_update(|visible| println!("{} points visible", visible.len()));
///
/// let mut now = 0.0;
/// let mut pending = animator.start(now);
/// while pending {
///     now += 16.0; // the host's frame callback
///     pending = animator.tick(now);
/// }
/// ```
pub struct RouteAnimator {
    /// Simplified point sequence actually animated
    points: Vec<GpsPoint>,
    /// Cumulative segment lengths, `cum[0] = 0`
    cum: Vec<f64>,
    /// Total route length in meters
    total: f64,
    /// Wall-clock duration after clamping, in ms
    duration_ms: f64,
    config: AnimatorConfig,
    state: AnimatorState,
    started_at: f64,
    last_frame_at: Option<f64>,
    /// Segment index and fractional progress of the last redraw
    last_rendered: Option<(usize, f64)>,
    on_update: Option<UpdateFn>,
    on_complete: Option<CompleteFn>,
}

impl RouteAnimator {
    /// Prepare an animation for a route.
    ///
    /// Long routes are simplified by minimum point spacing before any
    /// frames run, bounding per-frame interpolation cost.
    pub fn new(route: &[GpsPoint], config: AnimatorConfig) -> Self {
        let points = if route.len() > config.simplify_point_threshold {
            simplify_track(route, config.simplify_min_distance)
        } else {
            route.to_vec()
        };

        let mut cum = Vec::with_capacity(points.len().max(1));
        cum.push(0.0);
        for w in points.windows(2) {
            let last = cum[cum.len() - 1];
            cum.push(last + haversine_distance(&w[0], &w[1]));
        }
        let total = *cum.last().unwrap_or(&0.0);

        let nominal_ms = total / config.speed * 1000.0;
        let duration_ms = nominal_ms.clamp(config.min_duration_ms, config.max_duration_ms);

        debug!(
            "animator prepared: {} points ({} raw), {:.0}m, {:.0}ms",
            points.len(),
            route.len(),
            total,
            duration_ms
        );

        Self {
            points,
            cum,
            total,
            duration_ms,
            config,
            state: AnimatorState::Idle,
            started_at: 0.0,
            last_frame_at: None,
            last_rendered: None,
            on_update: None,
            on_complete: None,
        }
    }

    /// Register the partial-route callback, invoked with the currently
    /// visible point sequence on every redraw.
    pub fn on_update(&mut self, callback: impl FnMut(&[GpsPoint]) + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    /// Register the completion callback. Never invoked after [`stop`].
    ///
    /// [`stop`]: RouteAnimator::stop
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Begin animating at the injected timestamp.
    ///
    /// Returns whether the host should schedule frames. A zero-length
    /// route completes immediately: one empty update, the completion
    /// callback, and no frames.
    pub fn start(&mut self, now_ms: f64) -> bool {
        self.state = AnimatorState::Running;
        self.started_at = now_ms;
        self.last_frame_at = None;
        self.last_rendered = None;

        if self.total <= 0.0 {
            self.state = AnimatorState::Completed;
            self.emit_update(Vec::new());
            self.emit_complete();
            return false;
        }
        true
    }

    /// Advance one frame at the injected timestamp.
    ///
    /// Returns whether another frame should be scheduled. Ticks after
    /// completion or [`stop`] are inert: no callback fires, no frame is
    /// requested.
    ///
    /// [`stop`]: RouteAnimator::stop
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.state != AnimatorState::Running {
            return false;
        }

        // Frame-rate ceiling; the very first frame always runs.
        if let Some(last) = self.last_frame_at {
            if now_ms - last < 1000.0 / self.config.target_fps {
                return true;
            }
        }
        self.last_frame_at = Some(now_ms);

        let progress = ((now_ms - self.started_at) / self.duration_ms).min(1.0);
        if progress >= 1.0 {
            let full = self.points.clone();
            self.state = AnimatorState::Completed;
            self.emit_update(full);
            self.emit_complete();
            return false;
        }

        let target = progress * self.total;
        let segment = find_segment_idx(&self.cum, target);
        let segment_len = self.cum[segment + 1] - self.cum[segment];
        let fraction = if segment_len > 0.0 {
            (target - self.cum[segment]) / segment_len
        } else {
            0.0
        };

        // Skip imperceptible redraws, but force the final frames through
        // so the route never looks frozen just short of done.
        if progress < 0.98 {
            if let Some((last_segment, last_fraction)) = self.last_rendered {
                if last_segment == segment
                    && (fraction - last_fraction).abs() < self.config.update_threshold
                {
                    return true;
                }
            }
        }
        self.last_rendered = Some((segment, fraction));

        let from = self.points[segment];
        let to = self.points[segment + 1];
        let interpolated = GpsPoint::new(
            from.latitude + (to.latitude - from.latitude) * fraction,
            from.longitude + (to.longitude - from.longitude) * fraction,
        );

        let mut visible = self.points[..=segment].to_vec();
        visible.push(interpolated);
        self.emit_update(visible);
        true
    }

    /// Cancel the animation and return to Idle.
    ///
    /// Any tick arriving afterwards is a no-op, so a late host frame
    /// cannot mutate view state for a route that is no longer active. No
    /// completion callback fires for a cancelled run.
    pub fn stop(&mut self) {
        self.state = AnimatorState::Idle;
        self.last_frame_at = None;
        self.last_rendered = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// The simplified point sequence being animated.
    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Wall-clock duration the animation will take, in ms.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn emit_update(&mut self, visible: Vec<GpsPoint>) {
        if let Some(callback) = self.on_update.as_mut() {
            callback(&visible);
        }
    }

    fn emit_complete(&mut self) {
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

/// Greatest index `i` with `cum[i] <= target < cum[i+1]`, clamped to
/// `[0, cum.len()-2]`. `cum` must be monotonically non-decreasing with
/// `cum[0] = 0`.
pub fn find_segment_idx(cum: &[f64], target: f64) -> usize {
    if cum.len() < 2 {
        return 0;
    }

    let mut lo = 0;
    let mut hi = cum.len() - 1;
    while lo + 1 < hi {
        let mid = (lo + hi) / 2;
        if cum[mid] <= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo.min(cum.len() - 2)
}

// ============================================================================
// Unit Tests
// ============================================================================
