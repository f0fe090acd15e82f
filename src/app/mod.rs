//! Core application logic for ESGF Request
//!
//! This module contains the search service client, the local inventory, the
//! match classifier, reconciliation, reporting and request manifests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use esgf_request::app::{
//!     CatalogClient, ClientConfig, Facet, MatchClassifier, Reconciler, ReportRenderer,
//!     SearchFilters, SqliteInventory,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(&ClientConfig::default())?;
//! let inventory = SqliteInventory::open("checksums.db")?;
//! let classifier = MatchClassifier::new(inventory, Some("esgf.nci.org.au".to_string()));
//!
//! let filters = SearchFilters {
//!     model: Facet::parse(["ACCESS1-0"]),
//!     variable: Facet::parse(["tas"]),
//!     ..Default::default()
//! };
//!
//! let reconciliation = Reconciler::new(&classifier, 1000)
//!     .run(client.search(&filters))
//!     .await?;
//! print!("{}", ReportRenderer::new(false).render(&reconciliation));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod classifier;
pub mod inventory;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod request;

// Re-export main public API
pub use catalog::{CatalogClient, ClientConfig, Facet, SearchFilters, TriState};
pub use classifier::MatchClassifier;
pub use inventory::{Inventory, SqliteInventory};
pub use models::{GroupKey, GroupSummary, MatchResult, RemoteFileRecord, UrlEntry};
pub use reconcile::{Reconciler, Reconciliation, Totals};
pub use report::{format_size, ReportRenderer};
pub use request::{RequestConfig, RequestEmitter, RequestKind, RequestManifest};
