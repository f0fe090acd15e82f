//! Client for the ESGF search service
//!
//! Results are exposed as lazy streams: a page is requested only when the
//! consumer has drained the previous one, so stopping early (for example at a
//! file limit) never fetches further pages.
//!
//! The module is organized into:
//! - `config`: client configuration and building
//! - `http`: rate-limited GET + JSON decoding
//! - `filters`: typed facet filters and tri-state flags
//! - `query`: per-page request parameters and the response envelope

use std::sync::Arc;

use futures::stream::{self, LocalBoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::models::{DatasetRecord, RemoteFileRecord};
use crate::constants::esgf;
use crate::errors::{CatalogError, CatalogResult};

pub mod config;
pub mod filters;
pub mod http;
pub mod query;

pub use config::ClientConfig;
pub use filters::{Facet, SearchFilters, TriState};
pub use query::{RecordType, SearchRequest};

use http::HttpHandler;
use query::{has_next_page, SearchResponse};

/// Lazily fetched stream of search results
pub type RecordStream<T> = LocalBoxStream<'static, CatalogResult<T>>;

/// HTTP client for the ESGF search API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Arc<HttpHandler>,
    search_url: Url,
    dataset_page_size: usize,
    file_page_size: usize,
}

impl CatalogClient {
    /// Creates a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the search URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &ClientConfig) -> CatalogResult<Self> {
        let search_url =
            Url::parse(&config.search_url).map_err(|e| CatalogError::InvalidUrl {
                url: config.search_url.clone(),
                error: e.to_string(),
            })?;
        let client = config.build_http_client()?;
        let http = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::info!("Created search client for {}", search_url);

        Ok(Self {
            http: Arc::new(http),
            search_url,
            dataset_page_size: config.dataset_page_size.max(1),
            file_page_size: config.file_page_size.max(1),
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Fetch a single page of results
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: &SearchRequest,
        offset: usize,
    ) -> CatalogResult<SearchResponse<T>> {
        self.http
            .get_json(&self.search_url, &request.page_params(offset))
            .await
    }

    /// Stream pages of results, starting at offset 0
    pub fn pages<T>(&self, request: SearchRequest) -> RecordStream<Vec<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let client = self.clone();
        stream::try_unfold(Some(0usize), move |state| {
            let client = client.clone();
            let request = request.clone();
            async move {
                let Some(offset) = state else {
                    return Ok::<_, CatalogError>(None);
                };

                let page: SearchResponse<T> = client.fetch_page(&request, offset).await?;
                tracing::debug!(
                    "{} page at offset {}: {} docs of {}",
                    request.record_type,
                    offset,
                    page.response.docs.len(),
                    page.response.num_found
                );

                let next = has_next_page(page.response.num_found, offset, request.page_size)
                    .then_some(offset + request.page_size);
                Ok(Some((page.response.docs, next)))
            }
        })
        .boxed_local()
    }

    /// Stream individual results across all pages
    pub fn records<T>(&self, request: SearchRequest) -> RecordStream<T>
    where
        T: DeserializeOwned + 'static,
    {
        self.pages::<T>(request)
            .map_ok(|docs| stream::iter(docs.into_iter().map(Ok::<T, CatalogError>)))
            .try_flatten()
            .boxed_local()
    }

    /// Stream files belonging to datasets that match `filters`
    ///
    /// Version and most other facets live on datasets, not files, so this first
    /// pages through matching dataset ids and then, per page of ids, pages
    /// through their files with only the variable-level facets applied.
    pub fn search(&self, filters: &SearchFilters) -> RecordStream<RemoteFileRecord> {
        let dataset_request =
            SearchRequest::new(RecordType::Dataset, filters.clone(), self.dataset_page_size)
                .with_fields(&["id"]);
        let file_filters = filters.file_level();
        let file_page_size = self.file_page_size;
        let client = self.clone();

        self.pages::<DatasetRecord>(dataset_request)
            .map_ok(move |datasets| {
                let ids: Vec<String> = datasets.into_iter().map(|d| d.id).collect();
                if ids.is_empty() {
                    return stream::empty::<CatalogResult<RemoteFileRecord>>().boxed_local();
                }

                let request = SearchRequest::new(RecordType::File, file_filters.clone(), file_page_size)
                    .with_dataset_ids(ids)
                    .with_fields(esgf::RECORD_FIELDS);
                client.records::<RemoteFileRecord>(request)
            })
            .try_flatten()
            .boxed_local()
    }

    /// Stream the files of one dataset variable with their download details
    pub fn search_files(&self, dataset_id: &str, variable: &str) -> RecordStream<RemoteFileRecord> {
        let filters = SearchFilters {
            variable: Facet::parse([variable]),
            replica: TriState::All,
            latest: TriState::All,
            ..Default::default()
        };
        let request = SearchRequest::new(RecordType::File, filters, self.file_page_size)
            .with_dataset_ids(vec![dataset_id.to_string()])
            .with_fields(esgf::MANIFEST_FIELDS);

        self.records::<RemoteFileRecord>(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn test_client(server: &MockServer) -> CatalogClient {
        let config = ClientConfig {
            search_url: server.url("/esg-search/search"),
            rate_limit_rps: 1000,
            dataset_page_size: 2,
            file_page_size: 2,
            ..Default::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    fn file_doc(dataset: &str, title: &str) -> serde_json::Value {
        json!({
            "dataset_id": dataset,
            "variable": ["tas"],
            "title": title,
            "checksum": [format!("sum-{}", title)],
            "size": 100
        })
    }

    #[test]
    fn test_invalid_search_url() {
        let config = ClientConfig {
            search_url: "not a url".to_string(),
            ..Default::default()
        };
        match CatalogClient::new(&config) {
            Err(CatalogError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_records_follow_pagination() {
        let server = MockServer::start_async().await;

        let page0 = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/esg-search/search")
                    .query_param("type", "File")
                    .query_param("offset", "0");
                then.status(200).json_body(json!({
                    "response": {
                        "numFound": 3,
                        "docs": [file_doc("D1", "a.nc"), file_doc("D1", "b.nc")]
                    }
                }));
            })
            .await;
        let page1 = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/esg-search/search")
                    .query_param("type", "File")
                    .query_param("offset", "2");
                then.status(200).json_body(json!({
                    "response": { "numFound": 3, "docs": [file_doc("D1", "c.nc")] }
                }));
            })
            .await;

        let client = test_client(&server);
        let request = SearchRequest::new(RecordType::File, SearchFilters::default(), 2);
        let titles: Vec<String> = client
            .records::<RemoteFileRecord>(request)
            .map_ok(|r| r.title)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(titles, vec!["a.nc", "b.nc", "c.nc"]);
        page0.assert_async().await;
        page1.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_is_two_stage() {
        let server = MockServer::start_async().await;

        let datasets = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/esg-search/search")
                    .query_param("type", "Dataset")
                    .query_param("fields", "id")
                    .query_param("version", "20170725")
                    .query_param("offset", "0");
                then.status(200).json_body(json!({
                    "response": { "numFound": 1, "docs": [{ "id": "D1|node" }] }
                }));
            })
            .await;
        let files = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/esg-search/search")
                    .query_param("type", "File")
                    .query_param("dataset_id", "D1|node")
                    .query_param("variable", "tas")
                    .query_param_missing("version")
                    .query_param_missing("latest")
                    .query_param("offset", "0");
                then.status(200).json_body(json!({
                    "response": { "numFound": 1, "docs": [file_doc("D1|node", "tas.nc")] }
                }));
            })
            .await;

        let client = test_client(&server);
        let filters = SearchFilters {
            version: Facet::parse(["20170725"]),
            variable: Facet::parse(["tas"]),
            ..Default::default()
        };

        let records: Vec<RemoteFileRecord> = client.search(&filters).try_collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dataset_id, "D1|node");
        datasets.assert_async().await;
        files.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_dataset_page_skips_file_stage() {
        let server = MockServer::start_async().await;

        let datasets = server
            .mock_async(|when, then| {
                when.method(GET).query_param("type", "Dataset");
                then.status(200).json_body(json!({
                    "response": { "numFound": 0, "docs": [] }
                }));
            })
            .await;
        let files = server
            .mock_async(|when, then| {
                when.method(GET).query_param("type", "File");
                then.status(200).json_body(json!({
                    "response": { "numFound": 0, "docs": [] }
                }));
            })
            .await;

        let client = test_client(&server);
        let records: Vec<RemoteFileRecord> = client
            .search(&SearchFilters::default())
            .try_collect()
            .await
            .unwrap();

        assert!(records.is_empty());
        datasets.assert_hits_async(1).await;
        files.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_lazy_stream_stops_fetching() {
        let server = MockServer::start_async().await;

        let first = server
            .mock_async(|when, then| {
                when.method(GET).query_param("offset", "0");
                then.status(200).json_body(json!({
                    "response": {
                        "numFound": 10,
                        "docs": [file_doc("D1", "a.nc"), file_doc("D1", "b.nc")]
                    }
                }));
            })
            .await;
        let rest = server
            .mock_async(|when, then| {
                when.method(GET).query_param("offset", "2");
                then.status(200).json_body(json!({
                    "response": { "numFound": 10, "docs": [file_doc("D1", "z.nc")] }
                }));
            })
            .await;

        let client = test_client(&server);
        let request = SearchRequest::new(RecordType::File, SearchFilters::default(), 2);
        let taken: Vec<RemoteFileRecord> = client
            .records::<RemoteFileRecord>(request)
            .take(2)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(taken.len(), 2);
        first.assert_hits_async(1).await;
        rest.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let client = test_client(&server);
        let result: CatalogResult<Vec<RemoteFileRecord>> =
            client.search(&SearchFilters::default()).try_collect().await;

        match result {
            Err(CatalogError::ServerError { status, url }) => {
                assert_eq!(status, 500);
                assert!(url.contains("type=Dataset"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_names_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "response": { "numFound": 0, "docs": [] } }));
            })
            .await;

        let config = ClientConfig {
            search_url: server.url("/esg-search/search"),
            request_timeout: Duration::from_millis(50),
            rate_limit_rps: 1000,
            ..Default::default()
        };
        let client = CatalogClient::new(&config).unwrap();
        let result: CatalogResult<Vec<RemoteFileRecord>> =
            client.search(&SearchFilters::default()).try_collect().await;

        match result {
            Err(CatalogError::Timeout { url }) => assert!(url.contains("/esg-search/search")),
            other => panic!("expected Timeout, got {:?}", other),
        }
    }
}
