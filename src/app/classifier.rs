//! Classification of remote files against the local inventory

use tracing::trace;

use crate::app::inventory::Inventory;
use crate::app::models::{MatchResult, RemoteFileRecord};
use crate::errors::InventoryResult;

/// Decides whether a remote file is present, outdated, or missing locally
#[derive(Debug)]
pub struct MatchClassifier<I> {
    inventory: I,
    /// Datasets hosted on this node are present by definition
    local_node_suffix: Option<String>,
}

impl<I: Inventory> MatchClassifier<I> {
    pub fn new(inventory: I, local_node_suffix: Option<String>) -> Self {
        Self {
            inventory,
            local_node_suffix: local_node_suffix.filter(|suffix| !suffix.is_empty()),
        }
    }

    /// Classify one catalog record
    pub fn classify(&self, record: &RemoteFileRecord) -> InventoryResult<MatchResult> {
        if self.is_local(&record.dataset_id) {
            trace!("{} is hosted locally", record.title);
            return Ok(MatchResult::Exact);
        }
        self.classify_file(&record.title, record.checksum())
    }

    /// Classify by content hash first, then by basename
    pub fn classify_file(
        &self,
        filename: &str,
        checksum: Option<&str>,
    ) -> InventoryResult<MatchResult> {
        if let Some(checksum) = checksum {
            if self.inventory.has_checksum(checksum)? {
                return Ok(MatchResult::Exact);
            }
        }

        if self.inventory.has_basename(filename)? {
            Ok(MatchResult::Partial)
        } else {
            Ok(MatchResult::Missing)
        }
    }

    fn is_local(&self, dataset_id: &str) -> bool {
        self.local_node_suffix
            .as_deref()
            .is_some_and(|suffix| dataset_id.ends_with(suffix))
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }
}
