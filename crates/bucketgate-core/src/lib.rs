//! # Bucketgate Core
//!
//! Region resolution and file-streaming services for the bucketgate gateway.
//!
//! This crate provides:
//! - **Region Registry**: Per-region endpoints, credentials, and bucket whitelists
//! - **Request Validation**: The region/bucket whitelist check every request passes
//! - **Store Factory**: Backend clients bound to a region, cached per process
//! - **File Services**: Listing, staged uploads, and streamed downloads
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Gateway               │
//! ├─────────────────────────────────────────┤
//! │   Request Validator (region, bucket)    │
//! ├─────────────────────────────────────────┤
//! │          Store Factory (per region)     │
//! ├─────────────┬─────────────┬─────────────┤
//! │   Listing   │   Upload    │  Download   │
//! ├─────────────┴─────────────┴─────────────┤
//! │              ObjectStore                │
//! └─────────────────────────────────────────┘
//! ```

pub mod content;
pub mod download;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod listing;
pub mod registry;
pub mod sanitize;
pub mod upload;
pub mod validator;

pub use content::{classify, ContentClass, ContentInfo};
pub use download::{Download, StreamDisposition};
pub use error::{GatewayError, Result};
pub use factory::{S3StoreFactory, SharedStoreFactory, StoreFactory};
pub use gateway::Gateway;
pub use listing::FileInfo;
pub use registry::{RegionConfig, RegionRegistry, RegionSettings, RegistryError, RegistrySettings};
pub use sanitize::sanitize;
pub use upload::{StagedFile, UploadOutcome};
pub use validator::{RequestValidator, ValidatedTarget};
