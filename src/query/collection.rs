// src/query/collection.rs
// Collection query executor: typed clauses -> store query -> normalized records

use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::Result;
use crate::filter::FilterClause;
use crate::store::{Document, DocumentStore};

/// A normalized result record: stored fields plus `id`
pub type Record = Map<String, Value>;

/// The fixed document collections exposed as tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Assets,
    Versions,
    Comments,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Assets, Self::Versions, Self::Comments];

    /// Collection id in the document store
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Versions => "versions",
            Self::Comments => "comments",
        }
    }

    /// Filter keys advertised in the tool descriptions
    pub fn recognized_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Assets => &[
                "category",
                "tags",
                "visibility",
                "uploader",
                "uploadedAt",
                "updatedAt",
            ],
            Self::Versions => &["assetId", "version", "fileType", "updatedBy", "updatedAt"],
            Self::Comments => &["assetId", "user", "createdAt"],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run the clauses as one AND query against `collection`.
pub async fn execute(
    store: &dyn DocumentStore,
    collection: Collection,
    clauses: &[FilterClause],
) -> Result<Vec<Record>> {
    for clause in clauses {
        if !collection.recognized_fields().contains(&clause.field.as_str()) {
            debug!(
                collection = collection.name(),
                field = clause.field.as_str(),
                "Filtering on a field outside the documented set"
            );
        }
    }

    let docs = store.run_query(collection.name(), clauses).await?;
    Ok(docs.into_iter().map(normalize).collect())
}

/// Copy stored fields and stamp `id` with the document key, replacing any stored `id`.
pub fn normalize(doc: Document) -> Record {
    let mut record = doc.fields;
    record.insert("id".to_string(), Value::String(doc.id));
    record
}
