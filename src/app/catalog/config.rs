//! Search client configuration and building logic

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{esgf, http, limits, paging};
use crate::errors::{CatalogError, CatalogResult};

/// Configuration for the search service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// ESGF search API endpoint
    pub search_url: String,
    /// Deadline for each search request
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// Datasets requested per page in the dataset stage
    pub dataset_page_size: usize,
    /// Files requested per page in the file stage
    pub file_page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search_url: esgf::DEFAULT_SEARCH_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            dataset_page_size: paging::DATASET_PAGE_SIZE,
            file_page_size: paging::FILE_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> CatalogResult<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT)
            .build()
            .map_err(CatalogError::Http)
    }
}
