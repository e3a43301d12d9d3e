// src/client.rs
// FirebaseClient: the injected handle pair every search goes through

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{FirebaseError, Result};
use crate::filter::{self, FilterSpec, SkippedClause};
use crate::query::{self, BlobFilter, Collection, FileRecord, Record};
use crate::store::{BlobStore, DocumentStore};

/// Records plus the filter entries that were dropped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedClause>,
}

impl<T> SearchResult<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only access to the document store and the asset bucket.
///
/// Only obtainable through [`FirebaseClientBuilder::build`], which refuses to
/// produce a client with a missing handle.
#[derive(Clone)]
pub struct FirebaseClient {
    documents: Arc<dyn DocumentStore>,
    bucket: Arc<dyn BlobStore>,
}

impl FirebaseClient {
    pub fn builder() -> FirebaseClientBuilder {
        FirebaseClientBuilder::default()
    }

    pub fn bucket_name(&self) -> &str {
        self.bucket.bucket_name()
    }

    /// Search one of the document collections with an optional filter.
    pub async fn search_collection(
        &self,
        collection: Collection,
        filter: Option<&FilterSpec>,
    ) -> Result<SearchResult<Record>> {
        let compiled = filter::compile(filter);
        log_skipped(collection.name(), &compiled.skipped);

        match query::collection::execute(self.documents.as_ref(), collection, &compiled.clauses)
            .await
        {
            Ok(records) => {
                info!("Found {} {}", records.len(), collection);
                Ok(SearchResult {
                    records,
                    skipped: compiled.skipped,
                })
            }
            Err(e) => {
                error!("Error searching {}: {}", collection, e);
                Err(e)
            }
        }
    }

    pub async fn search_assets(&self, filter: Option<&FilterSpec>) -> Result<SearchResult<Record>> {
        self.search_collection(Collection::Assets, filter).await
    }

    pub async fn search_versions(&self, filter: Option<&FilterSpec>) -> Result<SearchResult<Record>> {
        self.search_collection(Collection::Versions, filter).await
    }

    pub async fn search_comments(&self, filter: Option<&FilterSpec>) -> Result<SearchResult<Record>> {
        self.search_collection(Collection::Comments, filter).await
    }

    /// Search files in the asset bucket with an optional filter.
    pub async fn search_asset_files(
        &self,
        filter: Option<&FilterSpec>,
    ) -> Result<SearchResult<FileRecord>> {
        let (blob_filter, skipped) = BlobFilter::compile(filter)?;
        log_skipped("files", &skipped);

        match query::blob::execute(self.bucket.as_ref(), &blob_filter).await {
            Ok(records) => {
                info!("Found {} files", records.len());
                Ok(SearchResult { records, skipped })
            }
            Err(e) => {
                error!("Error searching asset files: {}", e);
                Err(e)
            }
        }
    }
}

fn log_skipped(target: &str, skipped: &[SkippedClause]) {
    for clause in skipped {
        warn!(
            target_name = target,
            field = clause.field.as_str(),
            "Skipping filter '{}' = '{}': {}",
            clause.field,
            clause.value,
            clause.reason
        );
    }
}

/// Assembles a [`FirebaseClient`] from its two store handles
#[derive(Default)]
pub struct FirebaseClientBuilder {
    documents: Option<Arc<dyn DocumentStore>>,
    bucket: Option<Arc<dyn BlobStore>>,
}

impl FirebaseClientBuilder {
    pub fn documents(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(store);
        self
    }

    pub fn bucket(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.bucket = Some(store);
        self
    }

    pub fn build(self) -> Result<FirebaseClient> {
        let documents = self
            .documents
            .ok_or(FirebaseError::NotInitialized("document store"))?;
        let bucket = self
            .bucket
            .ok_or(FirebaseError::NotInitialized("storage bucket"))?;
        Ok(FirebaseClient { documents, bucket })
    }
}
