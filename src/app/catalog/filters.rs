//! Typed search filters
//!
//! Every searchable facet is a named field holding the values to include and
//! the values to exclude. A raw value starting with `^` is an exclusion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::esgf;

/// Values for a single facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Values sent as `<facet>=a,b`
    pub include: Vec<String>,
    /// Values sent as `<facet>!=a,b`
    pub exclude: Vec<String>,
}

impl Facet {
    /// Build a facet from raw command-line values, splitting off negations
    pub fn parse<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut facet = Self::default();
        for value in values {
            facet.push(value.as_ref());
        }
        facet
    }

    /// Add one raw value; a bare marker is kept as a literal value
    pub fn push(&mut self, raw: &str) {
        match raw.strip_prefix(esgf::NEGATION_MARKER) {
            Some(stripped) if !stripped.is_empty() => self.exclude.push(stripped.to_string()),
            _ => self.include.push(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Query parameters for this facet under `name`
    pub fn query_pairs(&self, name: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.include.is_empty() {
            pairs.push((name.to_string(), self.include.join(",")));
        }
        if !self.exclude.is_empty() {
            pairs.push((
                format!("{}{}", name, esgf::EXCLUDE_SUFFIX),
                self.exclude.join(","),
            ));
        }
        pairs
    }
}

/// A boolean search flag that may also be left open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    True,
    False,
    /// Match both values; the parameter is omitted from the request
    All,
}

impl TriState {
    /// Parameter value, or `None` when the parameter should be omitted
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Self::True => Some("true"),
            Self::False => Some("false"),
            Self::All => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(value) = parse_bool(s) {
            return Ok(value.into());
        }
        match s.to_ascii_lowercase().as_str() {
            "a" | "all" => Ok(Self::All),
            _ => Err(format!("invalid value '{}': expected true, false or all", s)),
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("all"))
    }
}

/// Interpret the usual spellings of yes/no
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Search constraints for a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free-text query; empty means match everything
    pub query: Facet,
    pub title: Facet,
    pub version: Facet,
    pub checksum: Facet,
    pub checksum_type: Facet,
    pub start: Facet,
    pub end: Facet,
    pub cf_standard_name: Facet,
    pub ensemble: Facet,
    pub experiment: Facet,
    pub institute: Facet,
    pub cmor_table: Facet,
    pub model: Facet,
    pub project: Facet,
    pub realm: Facet,
    pub time_frequency: Facet,
    pub variable: Facet,
    pub variable_long_name: Facet,
    /// Search all federated nodes or only the queried one
    pub distrib: TriState,
    /// Replicas only, originals only, or both
    pub replica: TriState,
    /// Latest versions only, outdated only, or both
    pub latest: TriState,
    /// Sort expression passed through to the service
    pub sort: Option<String>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: Facet::default(),
            title: Facet::default(),
            version: Facet::default(),
            checksum: Facet::default(),
            checksum_type: Facet::default(),
            start: Facet::default(),
            end: Facet::default(),
            cf_standard_name: Facet::default(),
            ensemble: Facet::default(),
            experiment: Facet::default(),
            institute: Facet::default(),
            cmor_table: Facet::default(),
            model: Facet::default(),
            project: Facet::default(),
            realm: Facet::default(),
            time_frequency: Facet::default(),
            variable: Facet::default(),
            variable_long_name: Facet::default(),
            distrib: TriState::True,
            replica: TriState::False,
            latest: TriState::True,
            sort: None,
        }
    }
}

impl SearchFilters {
    /// Named facets, excluding the free-text query
    pub fn facets(&self) -> [(&'static str, &Facet); 17] {
        [
            ("title", &self.title),
            ("version", &self.version),
            ("checksum", &self.checksum),
            ("checksum_type", &self.checksum_type),
            ("start", &self.start),
            ("end", &self.end),
            ("cf_standard_name", &self.cf_standard_name),
            ("ensemble", &self.ensemble),
            ("experiment", &self.experiment),
            ("institute", &self.institute),
            ("cmor_table", &self.cmor_table),
            ("model", &self.model),
            ("project", &self.project),
            ("realm", &self.realm),
            ("time_frequency", &self.time_frequency),
            ("variable", &self.variable),
            ("variable_long_name", &self.variable_long_name),
        ]
    }

    /// Filters applicable to the file stage of a dataset search
    ///
    /// Only variable-level facets and `distrib` carry over; dataset-level
    /// constraints have already been applied when selecting dataset ids.
    pub fn file_level(&self) -> Self {
        Self {
            cf_standard_name: self.cf_standard_name.clone(),
            variable: self.variable.clone(),
            variable_long_name: self.variable_long_name.clone(),
            distrib: self.distrib,
            replica: TriState::All,
            latest: TriState::All,
            ..Default::default()
        }
    }

    /// Query parameters for the facets and flags
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if self.query.include.is_empty() {
            pairs.push(("query".to_string(), esgf::MATCH_ALL_QUERY.to_string()));
        }
        pairs.extend(self.query.query_pairs("query"));

        for (name, facet) in self.facets() {
            pairs.extend(facet.query_pairs(name));
        }

        for (name, flag) in [
            ("distrib", self.distrib),
            ("replica", self.replica),
            ("latest", self.latest),
        ] {
            if let Some(value) = flag.as_param() {
                pairs.push((name.to_string(), value.to_string()));
            }
        }

        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }

        pairs
    }
}
