//! Activity records and the immutable asset snapshot.
//!
//! The site's data source is a JSON array of activities produced by an
//! offline sync process. It is loaded once at startup and never mutated;
//! every ordering or grouping the UI shows is a derived view.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunLogError};

/// One recorded workout.
///
/// Field names match the snake_case keys of the generated asset. Optional
/// fields are missing for activities recorded without GPS or heart-rate
/// data, so all of them default rather than failing the whole asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub run_id: u64,
    #[serde(default)]
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Duration as rendered by the generator: `"H:MM:SS"` or `"D day(s), H:MM:SS"`
    pub moving_time: String,
    /// Activity type ("Run", "Ride", "Hike", ...)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Free-text location description, Chinese administrative-region style
    #[serde(default)]
    pub location_country: Option<String>,
    /// Encoded route geometry (precision 1e5); absent for treadmill runs
    #[serde(default)]
    pub summary_polyline: Option<String>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    /// Average speed in meters/second
    #[serde(default)]
    pub average_speed: f64,
    /// Consecutive-day count as of this activity
    #[serde(default)]
    pub streak: Option<u32>,
}

impl Activity {
    /// Local start time, or `None` when the field is absent or malformed.
    ///
    /// The generator has emitted both `"2024-03-15T08:00:00Z"` and
    /// `"2024-03-15 08:00:00"` over time, so both shapes are accepted.
    pub fn start_local(&self) -> Option<NaiveDateTime> {
        let raw = self.start_date_local.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }

    /// Moving time in seconds; a malformed duration string counts as 0.
    pub fn moving_time_seconds(&self) -> u64 {
        parse_moving_time(&self.moving_time).unwrap_or(0)
    }

    /// Case-insensitive exact match against the activity type.
    pub fn matches_type(&self, filter: &str) -> bool {
        self.kind.eq_ignore_ascii_case(filter)
    }
}

/// Parse a duration string as rendered by the asset generator.
///
/// Accepts `"H:MM:SS"` (hours unpadded) and `"D day, H:MM:SS"` /
/// `"D days, H:MM:SS"` for multi-day totals.
///
/// # Example
/// ```
/// use run_log::parse_moving_time;
/// assert_eq!(parse_moving_time("1:02:03").unwrap(), 3723);
/// assert_eq!(parse_moving_time("1 day, 0:00:30").unwrap(), 86430);
/// ```
pub fn parse_moving_time(value: &str) -> Result<u64> {
    let invalid = || RunLogError::InvalidDuration {
        value: value.to_string(),
    };

    let (days, clock) = match value.split_once(", ") {
        Some((prefix, rest)) => {
            let count = prefix
                .strip_suffix(" days")
                .or_else(|| prefix.strip_suffix(" day"))
                .ok_or_else(invalid)?;
            let days: u64 = count.trim().parse().map_err(|_| invalid())?;
            (days, rest)
        }
        None => (0, value),
    };

    let mut parts = clock.trim().splitn(3, ':');
    let hours: u64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let minutes: u64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let seconds: u64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(days * 86400 + hours * 3600 + minutes * 60 + seconds)
}

// ============================================================================
// Activity Log
// ============================================================================

/// The immutable activity snapshot loaded at startup.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    activities: Vec<Activity>,
}

impl ActivityLog {
    /// Load the snapshot from the JSON asset.
    pub fn from_json(asset: &str) -> Result<Self> {
        let activities: Vec<Activity> = serde_json::from_str(asset)?;
        Ok(Self { activities })
    }

    /// Wrap an already-deserialized activity list.
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    /// All activities in asset order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Look up one activity by run id.
    pub fn get(&self, run_id: u64) -> Option<&Activity> {
        self.activities.iter().find(|a| a.run_id == run_id)
    }

    /// Look up one activity by run id, failing when it is not in the set.
    pub fn require(&self, run_id: u64) -> Result<&Activity> {
        self.get(run_id)
            .ok_or(RunLogError::UnknownRun { run_id })
    }

    /// Table display ordering: newest first, undated activities last.
    ///
    /// This is a derived view; the snapshot itself keeps asset order.
    pub fn sorted_for_table(&self) -> Vec<&Activity> {
        let mut rows: Vec<&Activity> = self.activities.iter().collect();
        rows.sort_by(|a, b| {
            b.start_local()
                .cmp(&a.start_local())
                .then_with(|| b.run_id.cmp(&a.run_id))
        });
        rows
    }

    /// Distinct years with at least one dated activity, newest first.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .activities
            .iter()
            .filter_map(|a| a.start_local())
            .map(|d| d.year())
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_activity(run_id: u64, start: Option<&str>) -> Activity {
        Activity {
            run_id,
            name: format!("run {}", run_id),
            distance: 5000.0,
            moving_time: "0:30:00".to_string(),
            kind: "Run".to_string(),
            subtype: None,
            start_date: None,
            start_date_local: start.map(|s| s.to_string()),
            location_country: None,
            summary_polyline: None,
            average_heartrate: None,
            average_speed: 2.7,
            streak: None,
        }
    }

    #[test]
    fn test_parse_moving_time_clock() {
        assert_eq!(parse_moving_time("0:00:00").unwrap(), 0);
        assert_eq!(parse_moving_time("1:02:03").unwrap(), 3723);
        assert_eq!(parse_moving_time("10:59:59").unwrap(), 39599);
    }

    #[test]
    fn test_parse_moving_time_with_days() {
        assert_eq!(parse_moving_time("1 day, 0:00:30").unwrap(), 86430);
        assert_eq!(parse_moving_time("2 days, 1:00:00").unwrap(), 176400);
    }

    #[test]
    fn test_parse_moving_time_rejects_garbage() {
        assert!(parse_moving_time("").is_err());
        assert!(parse_moving_time("90 minutes").is_err());
        assert!(parse_moving_time("1:99:00").is_err());
        assert!(parse_moving_time("soon, 1:00:00").is_err());
    }

    #[test]
    fn test_start_local_both_shapes() {
        let mut activity = make_activity(1, Some("2024-03-15 08:00:00"));
        assert_eq!(activity.start_local().unwrap().year(), 2024);

        activity.start_date_local = Some("2024-03-15T08:00:00Z".to_string());
        assert_eq!(activity.start_local().unwrap().year(), 2024);

        activity.start_date_local = Some("yesterday".to_string());
        assert!(activity.start_local().is_none());
    }

    #[test]
    fn test_matches_type_case_insensitive() {
        let activity = make_activity(1, None);
        assert!(activity.matches_type("run"));
        assert!(activity.matches_type("RUN"));
        assert!(!activity.matches_type("ride"));
    }

    #[test]
    fn test_from_json_minimal_fields() {
        let asset = r#"[{
            "run_id": 7,
            "distance": 1200.5,
            "moving_time": "0:10:00",
            "type": "Run"
        }]"#;
        let log = ActivityLog::from_json(asset).unwrap();
        assert_eq!(log.activities().len(), 1);
        assert_eq!(log.get(7).unwrap().distance, 1200.5);
        assert!(log.get(8).is_none());
        assert!(log.require(8).is_err());
    }

    #[test]
    fn test_sorted_for_table_newest_first() {
        let log = ActivityLog::new(vec![
            make_activity(1, Some("2023-05-01 07:00:00")),
            make_activity(2, Some("2024-01-01 07:00:00")),
            make_activity(3, None),
        ]);
        let rows = log.sorted_for_table();
        assert_eq!(rows[0].run_id, 2);
        assert_eq!(rows[1].run_id, 1);
        assert_eq!(rows[2].run_id, 3);
    }

    #[test]
    fn test_years_distinct_descending() {
        let log = ActivityLog::new(vec![
            make_activity(1, Some("2023-05-01 07:00:00")),
            make_activity(2, Some("2024-01-01 07:00:00")),
            make_activity(3, Some("2024-06-01 07:00:00")),
        ]);
        assert_eq!(log.years(), vec![2024, 2023]);
    }
}
