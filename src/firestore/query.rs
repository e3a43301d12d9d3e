// src/firestore/query.rs
// StructuredQuery request bodies and runQuery response parsing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::{decode_fields, encode, encode_timestamp};
use crate::error::{FirebaseError, Result};
use crate::filter::{FilterClause, FilterValue};
use crate::store::Document;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    CompositeFilter { op: &'static str, filters: Vec<Filter> },
    FieldFilter { field: FieldReference, op: &'static str, value: Value },
    UnaryFilter { field: FieldReference, op: &'static str },
}

impl RunQueryRequest {
    /// Build the query for `collection`, ANDing every clause.
    pub fn new(collection: &str, clauses: &[FilterClause]) -> Result<Self> {
        let mut filters = clauses.iter().map(clause_filter).collect::<Result<Vec<_>>>()?;
        let filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::CompositeFilter {
                op: "AND",
                filters,
            }),
        };
        Ok(Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection.to_string(),
                }],
                filter,
            },
        })
    }
}

fn clause_filter(clause: &FilterClause) -> Result<Filter> {
    let field = FieldReference {
        field_path: field_path(&clause.field),
    };
    let filter = match &clause.value {
        // Firestore rejects EQUAL against null; it wants the unary form
        FilterValue::Equals(Value::Null) => Filter::UnaryFilter {
            field,
            op: "IS_NULL",
        },
        FilterValue::Equals(v) => Filter::FieldFilter {
            field,
            op: "EQUAL",
            value: encode(v)?,
        },
        FilterValue::DateAtLeast(ts) => Filter::FieldFilter {
            field,
            op: "GREATER_THAN_OR_EQUAL",
            value: encode_timestamp(ts),
        },
        FilterValue::DateAtMost(ts) => Filter::FieldFilter {
            field,
            op: "LESS_THAN_OR_EQUAL",
            value: encode_timestamp(ts),
        },
        FilterValue::AnyOf(values) => Filter::FieldFilter {
            field,
            op: "ARRAY_CONTAINS_ANY",
            value: encode(&Value::Array(values.clone()))?,
        },
    };
    Ok(filter)
}

/// Dotted names address nested map fields. Segments that are not plain
/// identifiers get backtick-quoted.
pub fn field_path(field: &str) -> String {
    field
        .split('.')
        .map(|segment| {
            let simple = segment
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if simple {
                segment.to_string()
            } else {
                format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    #[serde(default)]
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Parse a runQuery response body (a JSON array of result frames).
///
/// Frames without a document (read-time markers, `done`) are skipped.
pub fn parse_run_query_response(body: &str) -> Result<Vec<Document>> {
    let frames: Vec<RunQueryResponse> = serde_json::from_str(body)
        .map_err(|e| FirebaseError::Decode(format!("runQuery response: {}", e)))?;

    Ok(frames
        .into_iter()
        .filter_map(|frame| frame.document)
        .map(|doc| {
            let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
            Document::new(id, decode_fields(doc.fields))
        })
        .collect())
}
