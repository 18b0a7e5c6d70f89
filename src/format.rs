//! Display formatting.
//!
//! The aggregator keeps full float precision; these helpers apply the
//! rounding each calling context wants. Pure string building, no locale
//! handling beyond the unit suffixes.

/// Format kilometers with the given number of decimals (1 or 2 in
/// practice, depending on the calling context).
pub fn format_km(km: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, km)
}

/// Format a pace from meters/second as `M:SS/km`, or `"N/A"` when there
/// is no movement to pace.
pub fn format_pace(meters_per_second: f64) -> String {
    if meters_per_second <= 0.0 {
        return "N/A".to_string();
    }
    let seconds_per_km = 1000.0 / meters_per_second;
    let mins = (seconds_per_km / 60.0) as i64;
    let secs = (seconds_per_km % 60.0) as i64;
    format!("{}:{:02}/km", mins, secs)
}

/// Humanize a duration in seconds: `45s`, `32min`, `2h 5min`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}min", seconds / 60)
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{}h {}min", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(10.0, 1), "10.0");
        assert_eq!(format_km(21.0975, 2), "21.10");
        assert_eq!(format_km(0.456, 1), "0.5");
    }

    #[test]
    fn test_format_pace() {
        // 2.77 m/s is about 6:00/km
        assert_eq!(format_pace(1000.0 / 360.0), "6:00/km");
        assert_eq!(format_pace(1000.0 / 272.0), "4:32/km");
        assert_eq!(format_pace(0.0), "N/A");
        assert_eq!(format_pace(-1.0), "N/A");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(1920), "32min");
        assert_eq!(format_duration(7500), "2h 5min");
        assert_eq!(format_duration(7200), "2h");
    }
}
