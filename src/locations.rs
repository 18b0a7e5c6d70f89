//! Free-text location classification.
//!
//! Activities carry a free-text `location_country` field: comma-delimited
//! Chinese administrative-region text with variable segment count and
//! order. Classification extracts `{country, province, city}` by pattern
//! matching, validating city candidates against a fixed gazetteer so a
//! random `..市` substring does not leak into the UI.
//!
//! Extraction fails soft: anything that does not match classifies to an
//! empty string, never an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::GpsPoint;

// Patterns are stored as Option so a failed compile degrades to "no match"
// instead of panicking (they never fail for these static patterns).
static CITY_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\p{Han}{2,}(?:市|自治州|特别行政区|盟|地区)").ok());

static PROVINCE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\p{Han}{2,}(?:省|自治区)").ok());

static DISTRICT_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\p{Han}{2,}[区县]").ok());

static CJK_RUN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\p{Han}{2,}").ok());

// Matches the stringified dict the generator writes for GPS-less point
// activities: `{'latitude': 39.9, 'longitude': 116.4, ...}`
static COORD_HINT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"'latitude':\s*(-?\d+(?:\.\d+)?).*?'longitude':\s*(-?\d+(?:\.\d+)?)").ok()
});

/// Municipality-level cities reported as their own province.
const MUNICIPALITIES: &[&str] = &[
    "北京市",
    "上海市",
    "天津市",
    "重庆市",
    "香港特别行政区",
    "澳门特别行政区",
];

/// Known city names. Regex candidates not in this list are discarded.
const CITY_GAZETTEER: &[&str] = &[
    // Municipalities and SARs
    "北京市",
    "上海市",
    "天津市",
    "重庆市",
    "香港特别行政区",
    "澳门特别行政区",
    // Provincial capitals
    "石家庄市",
    "太原市",
    "呼和浩特市",
    "沈阳市",
    "长春市",
    "哈尔滨市",
    "南京市",
    "杭州市",
    "合肥市",
    "福州市",
    "南昌市",
    "济南市",
    "郑州市",
    "武汉市",
    "长沙市",
    "广州市",
    "南宁市",
    "海口市",
    "成都市",
    "贵阳市",
    "昆明市",
    "拉萨市",
    "西安市",
    "兰州市",
    "西宁市",
    "银川市",
    "乌鲁木齐市",
    // Common prefecture-level cities
    "深圳市",
    "珠海市",
    "汕头市",
    "佛山市",
    "东莞市",
    "中山市",
    "惠州市",
    "厦门市",
    "泉州市",
    "宁波市",
    "温州市",
    "绍兴市",
    "嘉兴市",
    "金华市",
    "苏州市",
    "无锡市",
    "常州市",
    "南通市",
    "徐州市",
    "扬州市",
    "青岛市",
    "烟台市",
    "威海市",
    "潍坊市",
    "洛阳市",
    "开封市",
    "宜昌市",
    "襄阳市",
    "株洲市",
    "岳阳市",
    "桂林市",
    "柳州市",
    "三亚市",
    "绵阳市",
    "大连市",
    "鞍山市",
    "吉林市",
    "大庆市",
    "唐山市",
    "保定市",
    "秦皇岛市",
    "包头市",
    "宝鸡市",
    "咸阳市",
    "遵义市",
    "大理市",
    "丽江市",
    // Autonomous prefectures, leagues, regions
    "延边朝鲜族自治州",
    "大理白族自治州",
    "西双版纳傣族自治州",
    "甘孜藏族自治州",
    "阿坝藏族羌族自治州",
    "锡林郭勒盟",
    "阿拉善盟",
    "兴安盟",
    "阿里地区",
    "那曲地区",
];

/// Classification result for one activity's location text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub country: String,
    pub province: String,
    pub city: String,
    /// Explicit coordinate embedded in the text, for point activities
    pub coordinate: Option<GpsPoint>,
}

/// Classify a free-text location description.
///
/// # Example
/// ```
/// use run_log::classify_location;
///
/// let location = classify_location("朝阳区, 北京市, 中国");
/// assert_eq!(location.province, "北京市");
/// assert_eq!(location.city, "朝阳区");
/// assert_eq!(location.country, "中国");
/// ```
pub fn classify_location(text: &str) -> Location {
    let mut city = CITY_PATTERN
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
        .filter(|candidate| CITY_GAZETTEER.contains(candidate))
        .unwrap_or("")
        .to_string();

    let mut province = PROVINCE_PATTERN
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    // Municipality-level cities are their own province; the city slot is
    // then re-derived from the last district-level match in the text.
    if MUNICIPALITIES.contains(&city.as_str()) {
        province = city;
        city = DISTRICT_PATTERN
            .as_ref()
            .and_then(|re| re.find_iter(text).last())
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
    }

    Location {
        country: extract_country(text),
        province,
        city,
        coordinate: extract_coordinate(text),
    }
}

/// Last comma segment, falling back to the third when the last holds no
/// CJK run of length >= 2.
fn extract_country(text: &str) -> String {
    let segments: Vec<&str> = text.split(',').map(str::trim).collect();
    let Some(last) = segments.last().filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let has_cjk = CJK_RUN
        .as_ref()
        .map(|re| re.is_match(last))
        .unwrap_or(false);

    if has_cjk {
        (*last).to_string()
    } else {
        segments.get(2).map(|s| (*s).to_string()).unwrap_or_default()
    }
}

fn extract_coordinate(text: &str) -> Option<GpsPoint> {
    let captures = COORD_HINT.as_ref()?.captures(text)?;
    let latitude: f64 = captures.get(1)?.as_str().parse().ok()?;
    let longitude: f64 = captures.get(2)?.as_str().parse().ok()?;
    Some(GpsPoint::new(latitude, longitude))
}

// ============================================================================
// Memoization
// ============================================================================

/// Per-activity-set classification cache, keyed by run id.
///
/// Construct one per `ActivityLog` and pass it by reference to classifier
/// calls; never share a process-wide instance across activity sets. The
/// cache is append-only for its lifetime: the snapshot is immutable, so a
/// computed result never needs invalidation.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: HashMap<u64, Location>,
}

impl LocationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `text` for `run_id`, returning the cached result when one
    /// exists.
    pub fn classify(&mut self, run_id: u64, text: &str) -> &Location {
        self.entries
            .entry(run_id)
            .or_insert_with(|| classify_location(text))
    }

    /// Number of memoized results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_province_and_city() {
        let location = classify_location("西湖区, 杭州市, 浙江省, 中国");
        assert_eq!(location.country, "中国");
        assert_eq!(location.province, "浙江省");
        assert_eq!(location.city, "杭州市");
        assert!(location.coordinate.is_none());
    }

    #[test]
    fn test_classify_municipality_reports_district_as_city() {
        let location = classify_location("海淀区, 北京市, 中国");
        assert_eq!(location.province, "北京市");
        assert_eq!(location.city, "海淀区");

        // The LAST district-level match wins.
        let location = classify_location("静安区, 徐汇区, 上海市, 中国");
        assert_eq!(location.province, "上海市");
        assert_eq!(location.city, "徐汇区");
    }

    #[test]
    fn test_classify_rejects_unknown_city() {
        // "传说市" carries the right suffix but is not in the gazetteer.
        let location = classify_location("传说市, 中国");
        assert_eq!(location.city, "");
        assert_eq!(location.country, "中国");
    }

    #[test]
    fn test_classify_autonomous_prefecture() {
        let location = classify_location("延边朝鲜族自治州, 吉林省, 中国");
        assert_eq!(location.city, "延边朝鲜族自治州");
        assert_eq!(location.province, "吉林省");
    }

    #[test]
    fn test_country_fallback_to_third_segment() {
        // Last segment has no CJK run, so the third segment is used.
        let location = classify_location("Dover, Kent, England, GB");
        assert_eq!(location.country, "England");

        // No third segment either: empty string.
        let location = classify_location("Dover, GB");
        assert_eq!(location.country, "");
    }

    #[test]
    fn test_classify_empty_text() {
        let location = classify_location("");
        assert_eq!(location.country, "");
        assert_eq!(location.province, "");
        assert_eq!(location.city, "");
        assert!(location.coordinate.is_none());
    }

    #[test]
    fn test_coordinate_hint() {
        let text = "{'latitude': 39.904, 'longitude': 116.407, 'country': '中国'}";
        let location = classify_location(text);
        let coordinate = location.coordinate.unwrap();
        assert!((coordinate.latitude - 39.904).abs() < 1e-9);
        assert!((coordinate.longitude - 116.407).abs() < 1e-9);
    }

    #[test]
    fn test_cache_memoizes_by_run_id() {
        let mut cache = LocationCache::new();
        let first = cache.classify(1, "杭州市, 浙江省, 中国").clone();
        assert_eq!(cache.len(), 1);

        // Same run id returns the cached result even for different text.
        let second = cache.classify(1, "completely different").clone();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.classify(2, "海淀区, 北京市, 中国");
        assert_eq!(cache.len(), 2);
    }
}
