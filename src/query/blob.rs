// src/query/blob.rs
// Blob scan executor: prefix listing + in-process predicates

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{FirebaseError, Result};
use crate::filter::{BoundParse, DateBound, FilterSpec, SkippedClause, parse_date_bound};
use crate::store::{BlobObject, BlobStore};

const PREFIX_KEY: &str = "prefix";
const CONTENT_TYPE_KEY: &str = "contentType";
const UPLOADED_AT_KEY: &str = "uploadedAt";

/// Filter keys the file search understands
pub const RECOGNIZED_FILE_FILTERS: [&str; 3] = [PREFIX_KEY, CONTENT_TYPE_KEY, UPLOADED_AT_KEY];

/// Compiled file filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlobFilter {
    pub prefix: String,
    pub content_type: Option<String>,
    pub uploaded_at: Option<DateBound>,
}

impl BlobFilter {
    /// Read the recognized keys out of a raw filter mapping.
    ///
    /// Non-string `prefix`/`contentType` values are rejected. A bad
    /// `uploadedAt` is dropped and reported, like date clauses elsewhere.
    pub fn compile(spec: Option<&FilterSpec>) -> Result<(Self, Vec<SkippedClause>)> {
        let mut filter = Self::default();
        let mut skipped = Vec::new();
        let Some(spec) = spec else {
            return Ok((filter, skipped));
        };

        for key in spec.keys() {
            if !RECOGNIZED_FILE_FILTERS.contains(&key.as_str()) {
                debug!(key = key.as_str(), "Ignoring unrecognized file filter key");
            }
        }

        if let Some(prefix) = optional_string(spec, PREFIX_KEY)? {
            filter.prefix = prefix;
        }
        // Empty content type means "no filter"
        filter.content_type = optional_string(spec, CONTENT_TYPE_KEY)?.filter(|ct| !ct.is_empty());

        match spec.get(UPLOADED_AT_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::String(raw)) => match parse_date_bound(raw) {
                BoundParse::Bound(bound) => filter.uploaded_at = Some(bound),
                BoundParse::Malformed(remainder) => {
                    tracing::warn!("Invalid date format: {}", remainder);
                    skipped.push(SkippedClause::invalid_date(UPLOADED_AT_KEY, raw));
                }
                BoundParse::NotABound => {
                    skipped.push(SkippedClause::not_a_bound(UPLOADED_AT_KEY, raw));
                }
            },
            Some(other) => {
                skipped.push(SkippedClause::not_a_bound(UPLOADED_AT_KEY, &other.to_string()));
            }
        }

        Ok((filter, skipped))
    }

    /// Whether a listed object survives the content-type and date predicates.
    ///
    /// Objects without a creation time cannot satisfy a date bound.
    pub fn matches(&self, object: &BlobObject) -> bool {
        if let Some(expected) = &self.content_type
            && object.content_type.as_deref() != Some(expected.as_str())
        {
            return false;
        }
        if let Some(bound) = &self.uploaded_at {
            return object.time_created.is_some_and(|ts| bound.contains(ts));
        }
        true
    }
}

fn optional_string(spec: &FilterSpec, key: &str) -> Result<Option<String>> {
    match spec.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FirebaseError::InvalidInput(format!(
            "file filter '{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Normalized metadata for one stored file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub uploaded_at: Option<String>,
    pub download_url: String,
    pub etag: Option<String>,
    pub generation: Option<i64>,
}

impl FileRecord {
    pub fn from_object(object: BlobObject, download_url: String) -> Self {
        Self {
            uploaded_at: object.time_created.map(|ts| ts.to_rfc3339()),
            name: object.name,
            size: object.size,
            content_type: object.content_type,
            download_url,
            etag: object.etag,
            generation: object.generation,
        }
    }
}

/// List under the filter's prefix and keep the objects that match.
pub async fn execute(store: &dyn BlobStore, filter: &BlobFilter) -> Result<Vec<FileRecord>> {
    let objects = store.list_objects(&filter.prefix).await?;
    let records = objects
        .into_iter()
        .filter(|object| filter.matches(object))
        .map(|object| {
            let url = store.public_url(&object.name);
            FileRecord::from_object(object, url)
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn spec(value: Value) -> FilterSpec {
        value.as_object().cloned().unwrap()
    }

    fn object(name: &str, content_type: &str, day: u32) -> BlobObject {
        BlobObject {
            name: name.to_string(),
            size: 1024,
            content_type: Some(content_type.to_string()),
            time_created: Some(Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()),
            etag: Some("etag".to_string()),
            generation: Some(1),
        }
    }

    #[test]
    fn test_compile_absent_lists_everything() {
        let (filter, skipped) = BlobFilter::compile(None).unwrap();
        assert_eq!(filter, BlobFilter::default());
        assert!(skipped.is_empty());
        assert_eq!(filter.prefix, "");
    }

    #[test]
    fn test_compile_recognized_keys() {
        let (filter, skipped) = BlobFilter::compile(Some(&spec(json!({
            "prefix": "assets/",
            "contentType": "image/png",
            "uploadedAt": "<=2024-06-10"
        }))))
        .unwrap();
        assert!(skipped.is_empty());
        assert_eq!(filter.prefix, "assets/");
        assert_eq!(filter.content_type.as_deref(), Some("image/png"));
        assert_eq!(
            filter.uploaded_at,
            Some(DateBound::AtMost(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_compile_empty_content_type_is_no_filter() {
        let (filter, _) = BlobFilter::compile(Some(&spec(json!({"contentType": ""})))).unwrap();
        assert!(filter.content_type.is_none());
    }

    #[test]
    fn test_compile_rejects_non_string_prefix() {
        let err = BlobFilter::compile(Some(&spec(json!({"prefix": 7})))).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedInput);
    }

    #[test]
    fn test_compile_bad_dates_are_skipped() {
        let (filter, skipped) =
            BlobFilter::compile(Some(&spec(json!({"uploadedAt": ">=not-a-date"})))).unwrap();
        assert!(filter.uploaded_at.is_none());
        assert_eq!(skipped, vec![SkippedClause::invalid_date("uploadedAt", ">=not-a-date")]);

        let (filter, skipped) =
            BlobFilter::compile(Some(&spec(json!({"uploadedAt": "2024-06-01"})))).unwrap();
        assert!(filter.uploaded_at.is_none());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].reason, "expected a '>=' or '<=' date bound");
    }

    #[test]
    fn test_matches_content_type_exactly() {
        let filter = BlobFilter {
            content_type: Some("image/png".to_string()),
            ..BlobFilter::default()
        };
        assert!(filter.matches(&object("a.png", "image/png", 1)));
        assert!(!filter.matches(&object("a.jpg", "image/jpeg", 1)));
        assert!(!filter.matches(&object("a.PNG", "IMAGE/PNG", 1)));
    }

    #[test]
    fn test_matches_date_bound() {
        let filter = BlobFilter {
            uploaded_at: parse_date_bound(">=2024-06-05").bound(),
            ..BlobFilter::default()
        };
        assert!(filter.matches(&object("late.png", "image/png", 9)));
        assert!(!filter.matches(&object("early.png", "image/png", 1)));

        let mut undated = object("undated.png", "image/png", 9);
        undated.time_created = None;
        assert!(!filter.matches(&undated));
        assert!(BlobFilter::default().matches(&undated));
    }

    #[test]
    fn test_file_record_serialization() {
        let record = FileRecord::from_object(
            object("assets/b.png", "image/png", 1),
            "https://storage.googleapis.com/b/assets/b.png".to_string(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], json!("assets/b.png"));
        assert_eq!(value["size"], json!(1024));
        assert_eq!(value["contentType"], json!("image/png"));
        assert_eq!(value["uploadedAt"], json!("2024-06-01T12:00:00+00:00"));
        assert_eq!(value["downloadUrl"], json!("https://storage.googleapis.com/b/assets/b.png"));
        assert_eq!(value["etag"], json!("etag"));
        assert_eq!(value["generation"], json!(1));
    }

    #[test]
    fn test_file_record_without_creation_time() {
        let mut obj = object("x", "text/plain", 1);
        obj.time_created = None;
        let value = serde_json::to_value(FileRecord::from_object(obj, String::new())).unwrap();
        assert_eq!(value["uploadedAt"], Value::Null);
    }
}
