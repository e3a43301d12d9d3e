// src/cli/mod.rs
// Command line interface for the Firebase MCP server

use clap::Parser;
use std::path::PathBuf;

use firebase_mcp::config::{DEFAULT_BUCKET, DEFAULT_HOST, DEFAULT_PORT, EmulatorHosts, ServerConfig, Transport};

pub mod serve;

pub use serve::run_server;

#[derive(Parser, Debug)]
#[command(name = "firebase-mcp")]
#[command(about = "MCP server for searching Firestore asset metadata and Firebase Storage files")]
#[command(version)]
pub struct Cli {
    /// Path to the Google service account credentials JSON file
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub google_credentials: PathBuf,

    /// Transport protocol to use
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Host to bind to (HTTP transport only)
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind to (HTTP transport only)
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Storage bucket holding the asset files
    #[arg(long, env = "FIREBASE_STORAGE_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Firebase project id (default: project_id from the credentials file)
    #[arg(long, env = "FIREBASE_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Resolve flags and environment into a [`ServerConfig`]
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            credentials: self.google_credentials,
            transport: self.transport,
            host: self.host,
            port: self.port,
            bucket: self.bucket,
            project_id: self.project_id,
            debug: self.debug,
            emulators: EmulatorHosts::from_env(),
        }
    }
}
