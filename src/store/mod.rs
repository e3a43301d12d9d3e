// src/store/mod.rs
// Store abstractions: document collections and object buckets

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::Result;
use crate::filter::FilterClause;

/// Public host for Cloud Storage object URLs
pub const PUBLIC_STORAGE_HOST: &str = "https://storage.googleapis.com";

/// A stored document: its key plus its field map
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Metadata for one object in a bucket listing
#[derive(Debug, Clone, PartialEq)]
pub struct BlobObject {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    pub generation: Option<i64>,
}

/// Read access to a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a conjunctive query over one collection and return every match.
    async fn run_query(&self, collection: &str, clauses: &[FilterClause]) -> Result<Vec<Document>>;
}

/// Read access to an object bucket
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn bucket_name(&self) -> &str;

    /// List every object whose name starts with `prefix`.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<BlobObject>>;

    /// Stable public URL for an object in this bucket
    fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/{}/{}",
            PUBLIC_STORAGE_HOST,
            self.bucket_name(),
            encode_object_path(object_name)
        )
    }
}

/// Percent-encode an object name for use in a URL path, keeping `/` and `~`.
pub fn encode_object_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
