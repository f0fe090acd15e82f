//! Command-line argument parsing for ESGF Request
//!
//! Text facets accept one or more values and may be repeated; prefix a value
//! with `^` to exclude it. Boolean facets accept true, false or all.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser};

use crate::app::{Facet, SearchFilters, TriState};

/// ESGF Request - compare ESGF holdings with local data and request what is missing
#[derive(Parser, Debug)]
#[command(
    name = "esgf_request",
    about = "Compare ESGF search results with a local checksum inventory",
    long_about = "Searches the ESGF federation, classifies each file as present, outdated or missing
against the local checksum inventory, and optionally writes request files for the
missing or outdated data."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Search filters
    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Global arguments
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ESGF search API endpoint (e.g. https://esgf.nci.org.au/esg-search/search)
    #[arg(long, value_name = "URL")]
    pub search_url: Option<String>,

    /// Maximum number of files to search
    #[arg(long)]
    pub limit: Option<usize>,

    /// Local checksum inventory database
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Hostname suffix of the local data node (empty to disable)
    #[arg(long, value_name = "SUFFIX")]
    pub local_node: Option<String>,

    /// Directory request files are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Search facets
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Free-text query
    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub query: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub title: Vec<String>,

    /// Dataset version, e.g. 20170725
    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub version: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub checksum: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub checksum_type: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub start: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub end: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub cf_standard_name: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub ensemble: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub experiment: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub institute: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub cmor_table: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub model: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub project: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub realm: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub time_frequency: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub variable: Vec<String>,

    #[arg(long, num_args = 1.., action = ArgAction::Append)]
    pub variable_long_name: Vec<String>,

    /// Search all nodes (true, default), or just the specified server (false)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_value = "true",
          default_missing_value = "true", value_parser = parse_tri_state)]
    pub distrib: TriState,

    /// Return only replicas (true), only originals (false, default), or all (all)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_value = "false",
          default_missing_value = "true", value_parser = parse_tri_state)]
    pub replica: TriState,

    /// Return only latest (true, default), only outdated (false), or all (all)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_value = "true",
          default_missing_value = "true", value_parser = parse_tri_state)]
    pub latest: TriState,

    /// Sort expression passed to the search service
    #[arg(long)]
    pub sort: Option<String>,
}

fn parse_tri_state(value: &str) -> Result<TriState, String> {
    value.parse()
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl GlobalArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl FilterArgs {
    /// Convert raw argument values into typed search filters
    pub fn to_filters(&self) -> SearchFilters {
        SearchFilters {
            query: Facet::parse(&self.query),
            title: Facet::parse(&self.title),
            version: Facet::parse(&self.version),
            checksum: Facet::parse(&self.checksum),
            checksum_type: Facet::parse(&self.checksum_type),
            start: Facet::parse(&self.start),
            end: Facet::parse(&self.end),
            cf_standard_name: Facet::parse(&self.cf_standard_name),
            ensemble: Facet::parse(&self.ensemble),
            experiment: Facet::parse(&self.experiment),
            institute: Facet::parse(&self.institute),
            cmor_table: Facet::parse(&self.cmor_table),
            model: Facet::parse(&self.model),
            project: Facet::parse(&self.project),
            realm: Facet::parse(&self.realm),
            time_frequency: Facet::parse(&self.time_frequency),
            variable: Facet::parse(&self.variable),
            variable_long_name: Facet::parse(&self.variable_long_name),
            distrib: self.distrib,
            replica: self.replica,
            latest: self.latest,
            sort: self.sort.clone(),
        }
    }
}
