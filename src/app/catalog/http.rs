//! Core HTTP operations against the search service
//!
//! Requests are paced by a rate limiter and bounded by the client timeout.
//! Failures are returned to the caller as-is; nothing is retried.

use std::num::NonZeroU32;

use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{CatalogError, CatalogResult};

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ZeroRateLimit` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> CatalogResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> CatalogResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or(CatalogError::ZeroRateLimit)?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// Issue a GET with the given query parameters and decode the JSON body
    ///
    /// # Errors
    ///
    /// - `CatalogError::Timeout` when the request or body read exceeds the deadline
    /// - `CatalogError::ServerError` on a non-success status
    /// - `CatalogError::Decode` when the body is not the expected shape
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        params: &[(String, String)],
    ) -> CatalogResult<T> {
        self.rate_limiter.until_ready().await;

        let request = self.client.get(url.clone()).query(params).build()?;
        let target = request.url().to_string();
        tracing::debug!("GET {}", target);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| transport_error(e, &target))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Search service returned HTTP {} for {}", status, target);
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                url: target,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, &target))?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode {
            url: target,
            reason: e.to_string(),
        })
    }
}

/// Map a reqwest failure, singling out deadline expiry
fn transport_error(error: reqwest::Error, target: &str) -> CatalogError {
    if error.is_timeout() {
        tracing::error!("Search request timed out: {}", target);
        CatalogError::Timeout {
            url: target.to_string(),
        }
    } else {
        CatalogError::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::config::ClientConfig;

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let rate_limiter = HttpHandler::build_rate_limiter(5).unwrap();
        rate_limiter.until_ready().await;
    }

    #[test]
    fn test_rate_limiter_zero_fails() {
        assert!(HttpHandler::build_rate_limiter(0).is_err());
    }

    #[tokio::test]
    async fn test_http_handler_creation() {
        let config = ClientConfig::default();
        let client = config.build_http_client().unwrap();
        assert!(HttpHandler::new(client, 5).is_ok());
    }
}
