//! Error types for ESGF Request
//!
//! Each component has its own error enum; `AppError` unifies them for the
//! command-line layer. None of these errors are retried automatically, a
//! failure ends the current reconciliation run.

use std::path::PathBuf;
use thiserror::Error;

/// Remote catalog (ESGF search service) errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A search request exceeded its deadline
    #[error("Search request timed out: {url}")]
    Timeout { url: String },

    /// Server returned a non-success status
    #[error("Search service error: HTTP {status} from {url}")]
    ServerError { status: u16, url: String },

    /// Transport-level HTTP failure
    #[error("HTTP request to search service failed")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected search result shape
    #[error("Unexpected search response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Search endpoint could not be parsed
    #[error("Invalid search URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Client was configured without any request budget
    #[error("Search rate limit must be non-zero")]
    ZeroRateLimit,
}

/// Local inventory (checksum database) errors
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Database could not be opened
    #[error("Could not connect to inventory database {path}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A lookup query failed
    #[error("Inventory query failed")]
    Query(#[from] rusqlite::Error),
}

/// Request manifest errors
#[derive(Error, Debug)]
pub enum RequestError {
    /// No download URL with the expected transport label
    #[error("No {protocol} URL found for file '{title}'")]
    ProtocolMismatch { title: String, protocol: String },

    /// File lookup against the catalog failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Writing the request file failed
    #[error("Failed to write request file")]
    Io(#[from] std::io::Error),

    /// Neither configuration nor environment names the requesting user
    #[error("Cannot determine requesting user. Set USER or [request].user in the config file")]
    MissingUser,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Local inventory error
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Request manifest error
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is transient; a fresh run may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Catalog(CatalogError::Timeout { .. })
                | AppError::Catalog(CatalogError::Http(_))
                | AppError::Request(RequestError::Catalog(CatalogError::Timeout { .. }))
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Catalog(_) => "catalog",
            AppError::Inventory(_) => "inventory",
            AppError::Request(_) => "request",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Inventory(InventoryError::Connection { .. }) => 2,
            AppError::Catalog(CatalogError::Timeout { .. })
            | AppError::Request(RequestError::Catalog(CatalogError::Timeout { .. })) => 3,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Inventory result type alias
pub type InventoryResult<T> = std::result::Result<T, InventoryError>;

/// Request result type alias
pub type RequestResult<T> = std::result::Result<T, RequestError>;
