// src/mcp/mod.rs
// MCP Server implementation

pub mod http;
pub mod response;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

use crate::client::FirebaseClient;
use response::{search_response, to_mcp_err};

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchAssetsRequest {
    #[schemars(
        description = "Field filters, ANDed. Supported: category, tags (string[], array-contains-any), visibility ('public' | 'private'), uploader, uploadedAt and updatedAt (date bound such as \">=2024-06-01\")"
    )]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchVersionsRequest {
    #[schemars(
        description = "Field filters, ANDed. Supported: assetId, version, fileType (MIME type), updatedBy, updatedAt (date bound such as \">=2024-06-01\")"
    )]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchCommentsRequest {
    #[schemars(
        description = "Field filters, ANDed. Supported: assetId, user, createdAt (date bound such as \">=2024-06-01\")"
    )]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchAssetFilesRequest {
    #[schemars(
        description = "Supported: prefix (path prefix, e.g. \"assets/\"), contentType (exact MIME type, e.g. \"image/png\"), uploadedAt (date bound such as \">=2024-06-01\")"
    )]
    pub filter: Option<Map<String, Value>>,
}

/// MCP Server state
#[derive(Clone)]
pub struct FirebaseServer {
    pub client: Arc<FirebaseClient>,
    tool_router: ToolRouter<Self>,
}

impl FirebaseServer {
    pub fn new(client: Arc<FirebaseClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl FirebaseServer {
    #[tool(description = "Search digital asset metadata in the Firestore 'assets' collection. \
        Document fields: id, title, description, category (e.g. \"image\", \"video\", \"document\"), \
        tags (string[]), uploader (user ID), uploadedAt and updatedAt (ISO8601), \
        visibility ('public' | 'private'), latestVersionId (optional). \
        Example filter: {\"category\": \"image\", \"tags\": [\"banner\"], \"visibility\": \"public\", \"uploadedAt\": \">=2024-06-01\"}")]
    async fn search_assets(
        &self,
        Parameters(req): Parameters<SearchAssetsRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.search_assets(req.filter.as_ref()).await {
            Ok(result) => search_response(result),
            Err(e) => {
                error!("Error in search_assets: {}", e);
                Err(to_mcp_err(e))
            }
        }
    }

    #[tool(description = "Search asset version metadata in the Firestore 'versions' collection. \
        Document fields: id, assetId (parent asset), version, fileUrl, fileName, fileType (MIME type), \
        fileSize (bytes), updatedAt (ISO8601), updatedBy (user ID). \
        Example filter: {\"assetId\": \"asset123\", \"fileType\": \"image/png\", \"updatedAt\": \">=2024-06-01\"}")]
    async fn search_versions(
        &self,
        Parameters(req): Parameters<SearchVersionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.search_versions(req.filter.as_ref()).await {
            Ok(result) => search_response(result),
            Err(e) => {
                error!("Error in search_versions: {}", e);
                Err(to_mcp_err(e))
            }
        }
    }

    #[tool(description = "Search user comments on assets in the Firestore 'comments' collection. \
        Document fields: id, assetId (asset commented on), user (user ID), text, createdAt (ISO8601). \
        Example filter: {\"assetId\": \"asset123\", \"user\": \"user456\", \"createdAt\": \">=2024-06-01\"}")]
    async fn search_comments(
        &self,
        Parameters(req): Parameters<SearchCommentsRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.search_comments(req.filter.as_ref()).await {
            Ok(result) => search_response(result),
            Err(e) => {
                error!("Error in search_comments: {}", e);
                Err(to_mcp_err(e))
            }
        }
    }

    #[tool(description = "Search files in the Firebase Storage bucket holding the asset files \
        referenced by the Firestore documents. Returns name (full path), size (bytes), contentType, \
        uploadedAt (ISO8601), downloadUrl (public URL), etag and generation for each file. \
        Example filter: {\"prefix\": \"assets/\", \"contentType\": \"image/png\", \"uploadedAt\": \">=2024-06-01\"}")]
    async fn search_asset_files(
        &self,
        Parameters(req): Parameters<SearchAssetFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.search_asset_files(req.filter.as_ref()).await {
            Ok(result) => search_response(result),
            Err(e) => {
                error!("Error in search_asset_files: {}", e);
                Err(to_mcp_err(e))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for FirebaseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "firebase-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "Firebase MCP Server - read-only search over the Firestore assets, versions and \
                comments collections and the '{}' storage bucket. Filters are ANDed; date fields \
                take bounds such as \">=2024-06-01\" or \"<=2024-12-31T23:59:59Z\".",
                self.client.bucket_name()
            )),
        }
    }
}
