//! Data models for ESGF Request
//!
//! This module defines the records returned by the search service, the
//! classification of a record against the local inventory, and the per-group
//! summaries produced by reconciliation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::esgf;

/// A file entry returned by a `type=File` search
///
/// Several ESGF fields are multi-valued (`variable`, `checksum`, `url`, ...)
/// and arrive as JSON arrays; single values are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFileRecord {
    /// Dataset identifier, including the data node (`<id>|<node>`)
    #[serde(default)]
    pub dataset_id: String,
    /// Variable names contained in the file
    #[serde(default, deserialize_with = "one_or_many")]
    pub variable: Vec<String>,
    /// File basename
    pub title: String,
    /// Reported checksums; the first is authoritative
    #[serde(default, deserialize_with = "one_or_many")]
    pub checksum: Vec<String>,
    /// Checksum algorithms matching `checksum`
    #[serde(default, deserialize_with = "one_or_many")]
    pub checksum_type: Vec<String>,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
    /// Access URLs in `url|mime|protocol` form
    #[serde(default, rename = "url", deserialize_with = "one_or_many")]
    pub urls: Vec<String>,
}

impl RemoteFileRecord {
    /// The checksum used for inventory lookups
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.first().map(String::as_str)
    }

    /// The checksum algorithm, empty when the catalog omits it
    pub fn checksum_type(&self) -> &str {
        self.checksum_type.first().map(String::as_str).unwrap_or("")
    }

    /// The first listed variable, which names the record's group
    pub fn primary_variable(&self) -> &str {
        self.variable.first().map(String::as_str).unwrap_or("")
    }

    /// Key of the group this record aggregates into
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(&self.dataset_id, self.primary_variable())
    }

    /// First URL served over the given protocol label
    pub fn url_for_protocol(&self, protocol: &str) -> Option<UrlEntry> {
        self.urls
            .iter()
            .map(|raw| UrlEntry::parse(raw))
            .find(|entry| entry.protocol == protocol)
    }
}

/// A dataset entry returned by the `type=Dataset` stage (only `id` is requested)
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
}

/// One decoded `url|mime|protocol` access entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub url: String,
    pub mime_type: String,
    pub protocol: String,
}

impl UrlEntry {
    /// Split a catalog URL string; missing parts decode as empty strings
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(3, esgf::URL_FIELD_SEPARATOR);
        let url = parts.next().unwrap_or("").to_string();
        let mime_type = parts.next().unwrap_or("").to_string();
        let protocol = parts.next().unwrap_or("").to_string();
        Self {
            url,
            mime_type,
            protocol,
        }
    }
}

/// Classification of a remote file against the local inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    /// A local file has the same content hash
    Exact,
    /// A local file has the same basename but different content
    Partial,
    /// Nothing local corresponds to the file
    Missing,
}

impl MatchResult {
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Missing => "missing",
        };
        f.write_str(label)
    }
}

/// Grouping key: a dataset and one of its variables
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub dataset_id: String,
    pub variable: String,
}

impl GroupKey {
    pub fn new(dataset_id: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            variable: variable.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dataset_id, self.variable)
    }
}

/// Reconciliation counts for one dataset/variable group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub dataset_id: String,
    pub variable: String,
    /// Files present locally with identical content
    pub matches: u64,
    /// Files present locally under the same name with different content
    pub partial: u64,
    /// Files absent locally
    pub misses: u64,
    /// Combined size of every file seen in the group
    pub total_size: u64,
}

impl GroupSummary {
    pub fn new(key: &GroupKey) -> Self {
        Self {
            dataset_id: key.dataset_id.clone(),
            variable: key.variable.clone(),
            ..Default::default()
        }
    }

    /// Fold one classified file into the summary
    pub fn record(&mut self, result: MatchResult, size: u64) {
        match result {
            MatchResult::Exact => self.matches += 1,
            MatchResult::Partial => self.partial += 1,
            MatchResult::Missing => self.misses += 1,
        }
        self.total_size += size;
    }

    /// Number of files folded into the summary
    pub fn file_count(&self) -> u64 {
        self.matches + self.partial + self.misses
    }

    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.dataset_id, &self.variable)
    }
}

/// Accept either a scalar or a list for multi-valued catalog fields
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_catalog_doc() {
        let doc = serde_json::json!({
            "dataset_id": "cmip5.output1.CSIRO-BOM.ACCESS1-0.historical.mon.atmos.Amon.r1i1p1.v20120727|esgf.nci.org.au",
            "variable": ["tas"],
            "title": "tas_Amon_ACCESS1-0_historical_r1i1p1_185001-200512.nc",
            "checksum": ["0f1d2c6e3ab0b0f58a1d73f09f5a1e44"],
            "checksum_type": ["MD5"],
            "size": 146_253_920u64,
            "url": [
                "http://esgf.nci.org.au/thredds/fileServer/tas.nc|application/netcdf|HTTPServer"
            ]
        });

        let record: RemoteFileRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(record.primary_variable(), "tas");
        assert_eq!(record.checksum(), Some("0f1d2c6e3ab0b0f58a1d73f09f5a1e44"));
        assert_eq!(record.checksum_type(), "MD5");
        assert_eq!(record.size, 146_253_920);
        assert_eq!(record.urls.len(), 1);
    }

    #[test]
    fn test_scalar_fields_accepted() {
        let doc = serde_json::json!({
            "dataset_id": "D1",
            "variable": "pr",
            "title": "pr.nc",
            "checksum": "abc",
        });

        let record: RemoteFileRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(record.variable, vec!["pr".to_string()]);
        assert_eq!(record.checksum(), Some("abc"));
        assert_eq!(record.size, 0);
        assert!(record.urls.is_empty());
    }

    #[test]
    fn test_url_entry_parse() {
        let entry = UrlEntry::parse("gsiftp://node/tas.nc|application/gridftp|GridFTP");
        assert_eq!(entry.url, "gsiftp://node/tas.nc");
        assert_eq!(entry.mime_type, "application/gridftp");
        assert_eq!(entry.protocol, "GridFTP");

        let bare = UrlEntry::parse("http://node/tas.nc");
        assert_eq!(bare.url, "http://node/tas.nc");
        assert!(bare.protocol.is_empty());
    }

    #[test]
    fn test_url_for_protocol_picks_first_match() {
        let record = RemoteFileRecord {
            dataset_id: "D1".to_string(),
            variable: vec!["v1".to_string()],
            title: "f.nc".to_string(),
            checksum: vec![],
            checksum_type: vec![],
            size: 0,
            urls: vec![
                "gsiftp://a/f.nc|application/gridftp|GridFTP".to_string(),
                "http://a/f.nc|application/netcdf|HTTPServer".to_string(),
                "http://b/f.nc|application/netcdf|HTTPServer".to_string(),
            ],
        };

        let entry = record.url_for_protocol(esgf::HTTP_SERVER_PROTOCOL).unwrap();
        assert_eq!(entry.url, "http://a/f.nc");
        assert!(record.url_for_protocol("OPENDAP").is_none());
    }

    #[test]
    fn test_group_summary_counts_each_file_once() {
        let key = GroupKey::new("D1", "v1");
        let mut summary = GroupSummary::new(&key);

        summary.record(MatchResult::Exact, 10);
        summary.record(MatchResult::Partial, 20);
        summary.record(MatchResult::Missing, 30);
        summary.record(MatchResult::Missing, 40);

        assert_eq!(summary.matches, 1);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.misses, 2);
        assert_eq!(summary.total_size, 100);
        assert_eq!(summary.file_count(), 4);
        assert_eq!(summary.key(), key);
    }

    #[test]
    fn test_group_key_display() {
        assert_eq!(GroupKey::new("D1", "v1").to_string(), "D1 v1");
    }

    #[test]
    fn test_match_result_is_exclusive() {
        for result in [MatchResult::Exact, MatchResult::Partial, MatchResult::Missing] {
            let flags = [result.is_exact(), result.is_partial(), result.is_missing()];
            assert_eq!(flags.iter().filter(|flag| **flag).count(), 1);
        }
    }
}
