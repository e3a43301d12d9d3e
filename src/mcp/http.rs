// src/mcp/http.rs
// MCP over HTTP (Streamable HTTP transport)

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::FirebaseServer;

/// Mount point of the MCP endpoint
pub const MCP_PATH: &str = "/mcp";

/// Create the MCP HTTP service
pub fn create_mcp_service(
    server: FirebaseServer,
) -> StreamableHttpService<FirebaseServer, LocalSessionManager> {
    // Every session shares the same client handles
    let service_factory = move || Ok(server.clone());

    let session_manager = Arc::new(LocalSessionManager::default());

    let config = StreamableHttpServerConfig {
        sse_keep_alive: Some(Duration::from_secs(15)),
        stateful_mode: true,
        ..Default::default()
    };

    StreamableHttpService::new(service_factory, session_manager, config)
}

/// Router with the MCP endpoint nested at [`MCP_PATH`]
pub fn create_router(server: FirebaseServer) -> Router {
    Router::new()
        .nest_service(MCP_PATH, create_mcp_service(server))
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` is cancelled
pub async fn serve(
    server: FirebaseServer,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("MCP HTTP transport listening on http://{}{}", addr, MCP_PATH);

    axum::serve(listener, create_router(server))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("MCP HTTP transport stopped");
    Ok(())
}
