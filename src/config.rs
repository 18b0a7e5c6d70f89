//! Compile-time site configuration.
//!
//! These are build-time choices, not runtime settings: the site is
//! regenerated whenever they change. None of them alter core semantics
//! except [`FIX_CHINA_OFFSET`], which feeds the decoder's CRS fix-up.

/// Render labels in Chinese instead of English. Labels only; keys,
/// period formats and all computation are unaffected.
pub const USE_CHINESE_LABELS: bool = false;

/// Draw routes with a dashed line instead of a solid one.
pub const USE_DASH_LINE: bool = true;

/// Route line opacity.
pub const LINE_OPACITY: f64 = 0.4;

/// Map canvas height in pixels.
pub const MAP_HEIGHT: u32 = 600;

/// Suppress base-map tiles and render route lines only.
pub const PRIVACY_MODE: bool = false;

/// Start in the light theme.
pub const LIGHTS_ON: bool = true;

/// Shift decoded WGS84 routes into GCJ-02 so they line up with Chinese
/// base-map tiles. Safe for mixed datasets: points outside mainland China
/// pass through unchanged.
pub const FIX_CHINA_OFFSET: bool = false;

/// Display label for an activity type.
pub fn activity_type_label(kind: &str) -> &'static str {
    let zh = USE_CHINESE_LABELS;
    match kind.to_ascii_lowercase().as_str() {
        "run" => {
            if zh {
                "跑步"
            } else {
                "Run"
            }
        }
        "trail run" => {
            if zh {
                "越野跑"
            } else {
                "Trail Run"
            }
        }
        "ride" => {
            if zh {
                "骑行"
            } else {
                "Ride"
            }
        }
        "hike" => {
            if zh {
                "徒步"
            } else {
                "Hike"
            }
        }
        "walk" => {
            if zh {
                "步行"
            } else {
                "Walk"
            }
        }
        "swim" => {
            if zh {
                "游泳"
            } else {
                "Swim"
            }
        }
        "ski" => {
            if zh {
                "滑雪"
            } else {
                "Ski"
            }
        }
        _ => {
            if zh {
                "其他"
            } else {
                "Workout"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_labels() {
        assert_eq!(activity_type_label("Run"), "Run");
        assert_eq!(activity_type_label("RIDE"), "Ride");
        assert_eq!(activity_type_label("VirtualRow"), "Workout");
    }
}
