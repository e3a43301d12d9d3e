// src/store/memory.rs
// In-process stores that evaluate clauses directly (tests, offline runs)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{BlobObject, BlobStore, Document, DocumentStore};
use crate::error::{FirebaseError, Result};
use crate::filter::{FilterClause, FilterValue};

/// Document store backed by a map of collection name -> documents.
///
/// Stored fields use the same plain JSON shape `FirestoreClient` decodes to,
/// so a Firestore timestamp is an RFC 3339 string here. Date clauses only
/// match fields in that exact form. Unlike Firestore, this store cannot tell a
/// timestamp from a string that happens to hold one, so seed date fields only
/// where the real collection holds `timestampValue`s.
///
/// Every query is recorded so tests can inspect what the executor sent.
#[derive(Default)]
pub struct MemoryDocuments {
    collections: HashMap<String, Vec<Document>>,
    failure: Option<String>,
    queries: Mutex<Vec<(String, Vec<FilterClause>)>>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Non-object `fields` values are stored as an empty map.
    pub fn with_document(mut self, collection: &str, id: &str, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, fields));
        self
    }

    /// Make every query fail with an upstream-style error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queries received so far, as (collection, clauses)
    pub fn recorded_queries(&self) -> Vec<(String, Vec<FilterClause>)> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn run_query(&self, collection: &str, clauses: &[FilterClause]) -> Result<Vec<Document>> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((collection.to_string(), clauses.to_vec()));

        if let Some(message) = &self.failure {
            return Err(FirebaseError::Api {
                status: 503,
                message: message.clone(),
            });
        }

        let docs = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| clauses.iter().all(|c| clause_matches(c, &doc.fields)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }
}

/// Evaluate one clause against a document's fields. A missing field never
/// matches, mirroring Firestore's behavior for field filters.
pub fn clause_matches(clause: &FilterClause, fields: &Map<String, Value>) -> bool {
    let Some(actual) = fields.get(&clause.field) else {
        return false;
    };
    match &clause.value {
        FilterValue::Equals(expected) => values_equal(actual, expected),
        FilterValue::DateAtLeast(bound) => stored_timestamp(actual).is_some_and(|ts| ts >= *bound),
        FilterValue::DateAtMost(bound) => stored_timestamp(actual).is_some_and(|ts| ts <= *bound),
        FilterValue::AnyOf(candidates) => actual
            .as_array()
            .is_some_and(|items| {
                items
                    .iter()
                    .any(|item| candidates.iter().any(|c| values_equal(item, c)))
            }),
    }
}

/// Firestore compares integers and doubles by numeric value
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn stored_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Bucket backed by a fixed object list
pub struct MemoryBucket {
    name: String,
    objects: Vec<BlobObject>,
    failure: Option<String>,
}

impl MemoryBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            failure: None,
        }
    }

    pub fn with_object(mut self, object: BlobObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(name)
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBucket {
    fn bucket_name(&self) -> &str {
        &self.name
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<BlobObject>> {
        if let Some(message) = &self.failure {
            return Err(FirebaseError::NotFound(message.clone()));
        }
        let mut listed: Vec<BlobObject> = self
            .objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .cloned()
            .collect();
        // Cloud Storage lists in lexicographic name order
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }
}
