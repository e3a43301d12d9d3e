// src/lib.rs
// Firebase MCP - search Firestore asset metadata and Storage files over MCP

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod firestore;
pub mod http;
pub mod mcp;
pub mod query;
pub mod storage;
pub mod store;

pub use client::{FirebaseClient, FirebaseClientBuilder, SearchResult};
pub use error::{ErrorKind, FirebaseError, Result};
