// src/storage/mod.rs
// Cloud Storage bucket over the JSON API object listing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{FirebaseError, Result};
use crate::http::check_response;
use crate::store::{BlobObject, BlobStore};

/// Production Cloud Storage JSON API root
pub const STORAGE_BASE_URL: &str = "https://storage.googleapis.com/storage/v1";

/// Page size requested per listing call (the API maximum)
const PAGE_SIZE: &str = "1000";

pub struct CloudStorageBucket {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    tokens: Arc<dyn TokenProvider>,
}

impl CloudStorageBucket {
    pub fn new(http: reqwest::Client, bucket: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: STORAGE_BASE_URL.to_string(),
            bucket: bucket.into(),
            tokens,
        }
    }

    /// Point at a different API root (emulator, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn list_url(&self) -> String {
        format!("{}/b/{}/o", self.base_url, urlencoding::encode(&self.bucket))
    }

    async fn fetch_page(&self, prefix: &str, page_token: Option<&str>) -> Result<ObjectsPage> {
        let mut query: Vec<(&str, &str)> = vec![("maxResults", PAGE_SIZE)];
        if !prefix.is_empty() {
            query.push(("prefix", prefix));
        }
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.list_url())
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;
        let body = check_response(response).await?;
        parse_objects_page(&body)
    }
}

#[async_trait]
impl BlobStore for CloudStorageBucket {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<BlobObject>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(prefix, page_token.as_deref()).await?;
            pages += 1;
            for item in page.items {
                objects.push(item.into_blob()?);
            }
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(bucket = self.bucket.as_str(), prefix, pages, objects = objects.len(), "Listed bucket");
        Ok(objects)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectsPage {
    #[serde(default)]
    items: Vec<ObjectResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// The JSON API encodes uint64/int64 fields as strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    name: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    etag: Option<String>,
    #[serde(default)]
    generation: Option<String>,
}

impl ObjectResource {
    fn into_blob(self) -> Result<BlobObject> {
        let size = match self.size.as_deref() {
            None => 0,
            Some(s) => s.parse::<u64>().map_err(|_| {
                FirebaseError::Decode(format!("object '{}' has non-numeric size '{}'", self.name, s))
            })?,
        };
        let generation = match self.generation.as_deref() {
            None => None,
            Some(g) => Some(g.parse::<i64>().map_err(|_| {
                FirebaseError::Decode(format!("object '{}' has non-numeric generation '{}'", self.name, g))
            })?),
        };
        Ok(BlobObject {
            name: self.name,
            size,
            content_type: self.content_type,
            time_created: self.time_created,
            etag: self.etag,
            generation,
        })
    }
}

fn parse_objects_page(body: &str) -> Result<ObjectsPage> {
    serde_json::from_str(body).map_err(|e| FirebaseError::Decode(format!("object listing: {}", e)))
}
