//! # Bucketgate Gateway
//!
//! HTTP gateway for files stored across several S3-compatible regions.
//!
//! This crate provides:
//! - **File API**: List, upload, view and download files per region and bucket
//! - **Whitelisting**: Only configured region/bucket pairs reach a backend
//! - **Rate Limiting**: Per-client request throttling
//! - **Streaming**: Uploads are staged to disk, downloads are proxied chunk by chunk
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │            (browser UI, curl, scripts)              │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                 Bucketgate Gateway                  │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Rate Limiter │ CORS │ Body Limit      │
//! ├─────────────────────────────────────────────────────┤
//! │                  File Handlers                      │
//! │       (config, files, upload, raw, download)        │
//! ├─────────────────────────────────────────────────────┤
//! │                 bucketgate-core                     │
//! │    (registry, validation, listing, up/download)     │
//! ├─────────────────────────────────────────────────────┤
//! │                bucketgate-store                     │
//! │          (S3-compatible object storage)             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ErrorCode};
pub use server::{run_server, run_server_with_shutdown, serve};
pub use state::AppState;
