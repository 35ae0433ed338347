//! Gateway configuration

use bucketgate_core::RegistrySettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Region settings file; the built-in two-region layout when absent
    pub regions_file: Option<PathBuf>,
    /// Directory for staged uploads
    pub upload_dir: PathBuf,
    /// Maximum request body size (bytes)
    pub max_upload_size: usize,
    /// Rate limit (requests per second per client IP, 0 disables)
    pub rate_limit_rps: u32,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Serve every region from one in-memory store (for development)
    pub use_memory_store: bool,
    /// Objects requested per listing page
    pub list_page_size: i32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            regions_file: None,
            upload_dir: PathBuf::from("uploads"),
            max_upload_size: 5 * 1024 * 1024 * 1024, // 5 GB
            rate_limit_rps: 100,
            cors_enabled: true,
            use_memory_store: false,
            list_page_size: 1000,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Region layout to build the registry from
    pub fn registry_settings(&self) -> Result<RegistrySettings, config::ConfigError> {
        match &self.regions_file {
            Some(path) => load_registry_settings(path),
            None => Ok(RegistrySettings::default()),
        }
    }
}

/// Read region settings from a TOML, YAML or JSON file
///
/// The format follows the file extension.
pub fn load_registry_settings(path: &Path) -> Result<RegistrySettings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .build()?
        .try_deserialize()
}
