//! Search request parameters and response envelope

use std::fmt;

use serde::Deserialize;

use super::filters::SearchFilters;
use crate::constants::esgf;

/// Record granularity searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Dataset,
    File,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dataset => "Dataset",
            Self::File => "File",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to request one page of results except the offset
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub record_type: RecordType,
    pub filters: SearchFilters,
    /// Restrict results to these dataset ids
    pub dataset_ids: Vec<String>,
    /// Fields to return; empty returns the service default
    pub fields: Vec<String>,
    pub page_size: usize,
}

impl SearchRequest {
    pub fn new(record_type: RecordType, filters: SearchFilters, page_size: usize) -> Self {
        Self {
            record_type,
            filters,
            dataset_ids: Vec::new(),
            fields: Vec::new(),
            page_size,
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_dataset_ids(mut self, ids: Vec<String>) -> Self {
        self.dataset_ids = ids;
        self
    }

    /// Query parameters for the page starting at `offset`
    pub fn page_params(&self, offset: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("type".to_string(), self.record_type.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
            ("offset".to_string(), offset.to_string()),
            ("format".to_string(), esgf::RESULT_FORMAT.to_string()),
        ];

        if !self.fields.is_empty() {
            params.push(("fields".to_string(), self.fields.join(",")));
        }
        if !self.dataset_ids.is_empty() {
            params.push(("dataset_id".to_string(), self.dataset_ids.join(",")));
        }

        params.extend(self.filters.query_pairs());
        params
    }
}

/// Solr-style search response envelope
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseBody<T> {
    #[serde(rename = "numFound")]
    pub num_found: u64,
    pub docs: Vec<T>,
}

/// Whether another page follows the one fetched at `offset`
///
/// Paging stops once the reported total is below the next offset; when the
/// total is an exact multiple of the page size one final empty page is read.
pub fn has_next_page(num_found: u64, offset: usize, page_size: usize) -> bool {
    let next_offset = (offset + page_size) as u64;
    num_found >= next_offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::catalog::filters::Facet;

    fn value_of<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_page_params() {
        let filters = SearchFilters {
            experiment: Facet::parse(["rcp45"]),
            ..Default::default()
        };
        let request = SearchRequest::new(RecordType::Dataset, filters, 10).with_fields(&["id"]);

        let params = request.page_params(20);
        assert_eq!(value_of(&params, "type"), Some("Dataset"));
        assert_eq!(value_of(&params, "limit"), Some("10"));
        assert_eq!(value_of(&params, "offset"), Some("20"));
        assert_eq!(value_of(&params, "format"), Some("application/solr+json"));
        assert_eq!(value_of(&params, "fields"), Some("id"));
        assert_eq!(value_of(&params, "experiment"), Some("rcp45"));
        assert_eq!(value_of(&params, "dataset_id"), None);
    }

    #[test]
    fn test_dataset_ids_are_comma_joined() {
        let request = SearchRequest::new(RecordType::File, SearchFilters::default(), 100)
            .with_dataset_ids(vec!["a|node".to_string(), "b|node".to_string()]);
        let params = request.page_params(0);
        assert_eq!(value_of(&params, "type"), Some("File"));
        assert_eq!(value_of(&params, "dataset_id"), Some("a|node,b|node"));
    }

    #[test]
    fn test_has_next_page() {
        assert!(has_next_page(25, 0, 10));
        assert!(has_next_page(25, 10, 10));
        assert!(!has_next_page(25, 20, 10));
        // exact multiple reads a trailing empty page
        assert!(has_next_page(20, 10, 10));
        assert!(!has_next_page(20, 20, 10));
        assert!(!has_next_page(0, 0, 10));
    }

    #[test]
    fn test_response_envelope() {
        let body = serde_json::json!({
            "response": { "numFound": 2, "docs": [{ "id": "a" }, { "id": "b" }] }
        });
        let parsed: SearchResponse<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.response.num_found, 2);
        assert_eq!(parsed.response.docs.len(), 2);
    }
}
