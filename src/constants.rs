//! Application constants for ESGF Request
//!
//! Constants are grouped by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Login name of the operator, used in request file names
    pub const USER: &str = "USER";

    /// Fallback login name variable (Windows)
    pub const USERNAME: &str = "USERNAME";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "ESGF-Request/0.1.0 (Climate Data Tool)";

    /// Deadline for a single search request
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Rate limiting configuration
pub mod limits {
    /// Default request rate against the search service (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
}

/// ESGF search service parameters
pub mod esgf {
    /// Default search API endpoint
    pub const DEFAULT_SEARCH_URL: &str = "https://esgf.nci.org.au/esg-search/search";

    /// Result format requested from the search service
    pub const RESULT_FORMAT: &str = "application/solr+json";

    /// Free-text query matching everything
    pub const MATCH_ALL_QUERY: &str = "*";

    /// Marker prefixing a filter value that should be excluded
    pub const NEGATION_MARKER: char = '^';

    /// Suffix appended to a facet name for its exclusion parameter
    pub const EXCLUDE_SUFFIX: char = '!';

    /// Separator between the parts of a catalog URL entry (`url|mime|protocol`)
    pub const URL_FIELD_SEPARATOR: char = '|';

    /// Protocol label of plain HTTP download URLs
    pub const HTTP_SERVER_PROTOCOL: &str = "HTTPServer";

    /// Fields requested for reconciliation records
    pub const RECORD_FIELDS: &[&str] = &["dataset_id", "variable", "title", "checksum", "size"];

    /// Fields requested when writing request manifests
    pub const MANIFEST_FIELDS: &[&str] = &["title", "url", "checksum_type", "checksum"];
}

/// Pagination constants
pub mod paging {
    /// Datasets fetched per page in the dataset stage
    pub const DATASET_PAGE_SIZE: usize = 10;

    /// Files fetched per page in the file stage
    pub const FILE_PAGE_SIZE: usize = 100;

    /// Default maximum number of files to reconcile
    pub const DEFAULT_FILE_LIMIT: usize = 1000;
}

/// Local inventory constants
pub mod inventory {
    /// Default inventory database file
    pub const DEFAULT_DATABASE: &str = "checksums.db";

    /// Hostname suffix of the local data node; its datasets are always present
    pub const DEFAULT_LOCAL_NODE_SUFFIX: &str = "esgf.nci.org.au";
}

/// Request manifest constants
pub mod request {
    /// File prefix for requests of missing data
    pub const REQUEST_PREFIX: &str = "request";

    /// File prefix for requests of updated data
    pub const UPDATE_PREFIX: &str = "update";

    /// Minute-resolution timestamp in request file names
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M";

    /// Request file extension
    pub const FILE_EXTENSION: &str = "txt";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use esgf::{DEFAULT_SEARCH_URL, HTTP_SERVER_PROTOCOL};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use paging::DEFAULT_FILE_LIMIT;
