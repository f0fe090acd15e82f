//! Reconciliation of search results against the local inventory
//!
//! Records are pulled one at a time from the catalog stream, classified, and
//! folded into per dataset/variable summaries. Nothing is kept if the run
//! fails part way.

use std::collections::BTreeMap;
use std::pin::pin;

use futures::stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::app::classifier::MatchClassifier;
use crate::app::inventory::Inventory;
use crate::app::models::{GroupKey, GroupSummary, RemoteFileRecord};
use crate::app::request::RequestKind;
use crate::errors::{CatalogResult, Result};

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Summaries ordered by group key
    pub groups: BTreeMap<GroupKey, GroupSummary>,
    /// Records actually scanned
    pub processed: usize,
    /// Maximum records the run was allowed to scan
    pub limit: usize,
}

/// Aggregate counts across all groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub missing_files: u64,
    /// Combined size of groups with at least one missing file
    pub missing_size: u64,
    pub partial_files: u64,
    /// Combined size of groups with at least one partial match
    pub partial_size: u64,
}

impl Reconciliation {
    /// Whether the limit cut the scan short; more files may exist
    pub fn is_truncated(&self) -> bool {
        self.processed == self.limit
    }

    pub fn totals(&self) -> Totals {
        self.groups
            .values()
            .fold(Totals::default(), |mut totals, group| {
                totals.missing_files += group.misses;
                totals.partial_files += group.partial;
                if group.misses > 0 {
                    totals.missing_size += group.total_size;
                }
                if group.partial > 0 {
                    totals.partial_size += group.total_size;
                }
                totals
            })
    }

    /// Groups that a request of the given kind should cover
    pub fn groups_needing(&self, kind: RequestKind) -> Vec<GroupKey> {
        self.groups
            .iter()
            .filter(|(_, group)| match kind {
                RequestKind::Missing => group.misses > 0,
                RequestKind::Update => group.partial > 0,
            })
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Folds a record stream into a `Reconciliation`
#[derive(Debug)]
pub struct Reconciler<'a, I> {
    classifier: &'a MatchClassifier<I>,
    limit: usize,
}

impl<'a, I: Inventory> Reconciler<'a, I> {
    pub fn new(classifier: &'a MatchClassifier<I>, limit: usize) -> Self {
        Self { classifier, limit }
    }

    /// Consume up to `limit` records and summarise them
    ///
    /// # Errors
    ///
    /// Returns the first catalog or inventory error encountered; summaries
    /// gathered so far are dropped
    pub async fn run<S>(&self, records: S) -> Result<Reconciliation>
    where
        S: Stream<Item = CatalogResult<RemoteFileRecord>>,
    {
        let mut records = pin!(records.take(self.limit));
        let mut groups: BTreeMap<GroupKey, GroupSummary> = BTreeMap::new();
        let mut processed = 0usize;

        while let Some(record) = records.next().await {
            let record = record?;
            let result = self.classifier.classify(&record)?;
            let key = record.group_key();
            debug!("{} [{}]: {}", record.title, key, result);

            groups
                .entry(key)
                .or_insert_with_key(GroupSummary::new)
                .record(result, record.size);
            processed += 1;
        }

        let reconciliation = Reconciliation {
            groups,
            processed,
            limit: self.limit,
        };

        info!(
            "Reconciled {} files in {} groups",
            processed,
            reconciliation.groups.len()
        );
        if reconciliation.is_truncated() {
            warn!("Stopped at the file limit ({}); results may be incomplete", self.limit);
        }

        Ok(reconciliation)
    }
}
