//! Configuration management for ESGF Request
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! command-line overrides applied by the CLI layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, RequestConfig};
use crate::constants::{esgf, http, inventory, limits, logging, paging};
use crate::errors::{ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Search service settings
    pub catalog: CatalogConfigToml,
    /// Local inventory settings
    pub inventory: InventoryConfig,
    /// Request manifest settings
    pub request: RequestConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly search client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfigToml {
    /// ESGF search API endpoint
    pub search_url: String,
    /// Deadline for each search request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Datasets per page in the dataset stage
    pub dataset_page_size: usize,
    /// Files per page in the file stage
    pub file_page_size: usize,
    /// Maximum files scanned per run
    pub file_limit: usize,
}

impl Default for CatalogConfigToml {
    fn default() -> Self {
        Self {
            search_url: esgf::DEFAULT_SEARCH_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            dataset_page_size: paging::DATASET_PAGE_SIZE,
            file_page_size: paging::FILE_PAGE_SIZE,
            file_limit: paging::DEFAULT_FILE_LIMIT,
        }
    }
}

impl CatalogConfigToml {
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            search_url: self.search_url.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            rate_limit_rps: self.rate_limit_rps,
            dataset_page_size: self.dataset_page_size,
            file_page_size: self.file_page_size,
        }
    }
}

/// Local inventory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// SQLite inventory database
    pub database: PathBuf,
    /// Hostname suffix of the local data node; empty disables the override
    pub local_node_suffix: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(inventory::DEFAULT_DATABASE),
            local_node_suffix: inventory::DEFAULT_LOCAL_NODE_SUFFIX.to_string(),
        }
    }
}

/// TOML-friendly request manifest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfigToml {
    /// Directory request files are written to
    pub output_dir: PathBuf,
    /// Requesting user (defaults to $USER)
    pub user: Option<String>,
}

impl Default for RequestConfigToml {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            user: None,
        }
    }
}

impl RequestConfigToml {
    pub fn to_runtime_config(&self) -> Result<RequestConfig> {
        Ok(RequestConfig {
            output_dir: self.output_dir.clone(),
            user: RequestConfig::resolve_user(self.user.as_deref())?,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
    /// Enable colored output on terminals
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
            colored_output: true,
        }
    }
}

impl AppConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Config file (explicit path, else the first standard location found)
    ///
    /// CLI overrides are applied afterwards by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from("./esgf-request.toml")];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| {
            let exists = path.exists();
            if exists {
                debug!("Found config file: {}", path.display());
            }
            exists
        })
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("esgf-request").join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(ConfigError::InvalidFormat)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the run cannot work with
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("catalog.rate_limit_rps", self.catalog.rate_limit_rps as usize),
            ("catalog.dataset_page_size", self.catalog.dataset_page_size),
            ("catalog.file_page_size", self.catalog.file_page_size),
            ("catalog.file_limit", self.catalog.file_limit),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "Must be greater than 0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Local node suffix, `None` when disabled
    pub fn local_node_suffix(&self) -> Option<String> {
        Some(self.inventory.local_node_suffix.clone()).filter(|s| !s.is_empty())
    }
}
