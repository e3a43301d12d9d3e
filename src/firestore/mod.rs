// src/firestore/mod.rs
// Firestore document store over the REST runQuery endpoint

pub mod query;
pub mod value;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::auth::TokenProvider;
use crate::filter::FilterClause;
use crate::http::check_response;
use crate::store::{Document, DocumentStore};
use query::{RunQueryRequest, parse_run_query_response};

/// Production Firestore REST root
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub const DEFAULT_DATABASE: &str = "(default)";

pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    database_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl FirestoreClient {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE.to_string(),
            tokens,
        }
    }

    /// Point at a different REST root (emulator, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents:runQuery",
            self.base_url, self.project_id, self.database_id
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn run_query(&self, collection: &str, clauses: &[FilterClause]) -> Result<Vec<Document>> {
        let request = RunQueryRequest::new(collection, clauses)?;
        debug!(collection, clauses = clauses.len(), "Running Firestore query");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.run_query_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let body = check_response(response).await?;
        parse_run_query_response(&body)
    }
}
