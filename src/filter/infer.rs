// src/filter/infer.rs
// Shape inference for raw JSON filter values (protocol boundary)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use super::{FilterValue, SkippedClause};

const AT_LEAST_PREFIX: &str = ">=";
const AT_MOST_PREFIX: &str = "<=";

/// Offset-less datetime layouts, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// `%#z` also takes `Z` and hour-only offsets.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// A one-sided bound on a timestamp, inclusive at the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    AtLeast(DateTime<Utc>),
    AtMost(DateTime<Utc>),
}

impl DateBound {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        match self {
            Self::AtLeast(bound) => ts >= *bound,
            Self::AtMost(bound) => ts <= *bound,
        }
    }

    pub fn into_filter_value(self) -> FilterValue {
        match self {
            Self::AtLeast(ts) => FilterValue::DateAtLeast(ts),
            Self::AtMost(ts) => FilterValue::DateAtMost(ts),
        }
    }
}

/// Outcome of reading a `>=date` / `<=date` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundParse {
    /// The string carries no comparison prefix
    NotABound,
    Bound(DateBound),
    /// Prefix present, remainder is not a date
    Malformed(String),
}

impl BoundParse {
    pub fn bound(self) -> Option<DateBound> {
        match self {
            Self::Bound(bound) => Some(bound),
            Self::NotABound | Self::Malformed(_) => None,
        }
    }
}

/// Read a comparison-prefixed date string like `>=2024-06-01`.
pub fn parse_date_bound(raw: &str) -> BoundParse {
    let (remainder, make): (&str, fn(DateTime<Utc>) -> DateBound) =
        if let Some(rest) = raw.strip_prefix(AT_LEAST_PREFIX) {
            (rest, DateBound::AtLeast)
        } else if let Some(rest) = raw.strip_prefix(AT_MOST_PREFIX) {
            (rest, DateBound::AtMost)
        } else {
            return BoundParse::NotABound;
        };

    match parse_timestamp(remainder) {
        Some(ts) => BoundParse::Bound(make(ts)),
        None => BoundParse::Malformed(remainder.to_string()),
    }
}

/// Parse a calendar timestamp. Accepts RFC 3339, ISO-8601 datetimes with or
/// without offset, and bare dates (midnight). Offset-less input is UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // A trailing `Z` is UTC, whatever precision precedes it
    let naive_part = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Infer the typed filter value for one field from its raw JSON shape.
///
/// Prefixed strings become date bounds, arrays become any-of sets, and
/// everything else is an equality operand. A prefixed string whose remainder
/// is not a date yields `Err` so the caller can drop the clause and report it.
pub fn infer_value(field: &str, raw: Value) -> Result<FilterValue, SkippedClause> {
    match raw {
        Value::String(s) => match parse_date_bound(&s) {
            BoundParse::NotABound => Ok(FilterValue::Equals(Value::String(s))),
            BoundParse::Bound(bound) => Ok(bound.into_filter_value()),
            BoundParse::Malformed(remainder) => {
                warn!(field = field, "Invalid date format for field {}: {}", field, remainder);
                Err(SkippedClause::invalid_date(field, &s))
            }
        },
        Value::Array(items) => Ok(FilterValue::AnyOf(items)),
        other => Ok(FilterValue::Equals(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let cases = [
            "2024-01-01",
            "2024-01-01T10:00:00Z",
            "2024-06-15T14:30:00.123Z",
            "2024-06-15T14:30:00",
            "2024-06-15 14:30:00",
            "2024-06-15T14:30:00+09:00",
            "2024/06/15",
            "2024-06-15T14:30Z",
            "2024-06-15T14:30+09:00",
            "2024-06-15 14:30+09:00",
            "2024-06-15T14:30:00+0900",
        ];
        for case in cases {
            let parsed = parse_timestamp(case);
            assert!(parsed.is_some(), "failed to parse {}", case);
            assert_eq!(parsed.unwrap().year(), 2024);
        }
    }

    #[test]
    fn test_parse_timestamp_bare_date_is_midnight_utc() {
        let ts = parse_timestamp("2024-06-01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_offset_normalized() {
        let ts = parse_timestamp("2024-06-15T09:00:00+09:00").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 15);
    }

    #[test]
    fn test_parse_timestamp_minute_precision_with_zone() {
        assert_eq!(
            parse_timestamp("2024-06-01T10:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-06-01T10:00+09:00"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-06-01 10:00-02:00"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
        assert!(parse_timestamp("Z").is_none());
    }

    #[test]
    fn test_parse_date_bound() {
        assert_eq!(
            parse_date_bound(">=2024-06-01"),
            BoundParse::Bound(DateBound::AtLeast(
                Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            parse_date_bound("<=2024-12-31T23:59:59Z"),
            BoundParse::Bound(DateBound::AtMost(
                Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()
            ))
        );
        assert_eq!(parse_date_bound("2024-06-01"), BoundParse::NotABound);
        assert_eq!(
            parse_date_bound(">=soon"),
            BoundParse::Malformed("soon".to_string())
        );
    }

    #[test]
    fn test_date_bound_contains_is_inclusive() {
        let edge = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        assert!(DateBound::AtLeast(edge).contains(edge));
        assert!(DateBound::AtLeast(edge).contains(later));
        assert!(!DateBound::AtMost(edge).contains(later));
        assert!(DateBound::AtMost(edge).contains(edge));
    }

    #[test]
    fn test_infer_scalars_are_equality() {
        for raw in [json!("public"), json!(42), json!(1.5), json!(true), json!(null), json!({"a": 1})] {
            let inferred = infer_value("f", raw.clone()).unwrap();
            assert_eq!(inferred, FilterValue::Equals(raw));
        }
    }

    #[test]
    fn test_infer_array_is_any_of() {
        let inferred = infer_value("tags", json!(["banner", "promo"])).unwrap();
        assert_eq!(inferred, FilterValue::AnyOf(vec![json!("banner"), json!("promo")]));

        let empty = infer_value("tags", json!([])).unwrap();
        assert_eq!(empty, FilterValue::AnyOf(vec![]));
    }

    #[test]
    fn test_infer_malformed_date_is_skipped() {
        let skipped = infer_value("uploadedAt", json!(">=not-a-date")).unwrap_err();
        assert_eq!(skipped.field, "uploadedAt");
        assert_eq!(skipped.value, ">=not-a-date");
    }

    #[test]
    fn test_infer_date_bounds() {
        let at_least = infer_value("uploadedAt", json!(">=2024-06-01")).unwrap();
        assert!(matches!(at_least, FilterValue::DateAtLeast(ts) if ts.month() == 6 && ts.day() == 1));
        let at_most = infer_value("uploadedAt", json!("<=2024-12-31")).unwrap();
        assert!(matches!(at_most, FilterValue::DateAtMost(ts) if ts.month() == 12 && ts.day() == 31));
    }
}
