//! Request manifests for missing and outdated data
//!
//! A manifest lists one file per line as four single-quoted fields:
//! title, HTTP download URL, checksum type, checksum.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use futures::stream::TryStreamExt;
use tracing::{debug, info};

use crate::app::catalog::CatalogClient;
use crate::app::models::{GroupKey, RemoteFileRecord};
use crate::constants::{env as env_constants, esgf, request};
use crate::errors::{RequestError, RequestResult};

/// What a manifest asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Files with no local copy
    Missing,
    /// Files whose local copy has different content
    Update,
}

impl RequestKind {
    /// File name prefix for this kind of manifest
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Missing => request::REQUEST_PREFIX,
            Self::Update => request::UPDATE_PREFIX,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Settings for writing request manifests
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Directory the manifest is written to
    pub output_dir: PathBuf,
    /// Requesting user, embedded in the file name
    pub user: String,
}

impl RequestConfig {
    /// Resolve the requesting user from an explicit value or the environment
    pub fn resolve_user(explicit: Option<&str>) -> RequestResult<String> {
        if let Some(user) = explicit.filter(|u| !u.is_empty()) {
            return Ok(user.to_string());
        }
        [env_constants::USER, env_constants::USERNAME]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|u| !u.is_empty()))
            .ok_or(RequestError::MissingUser)
    }
}

/// Result of writing a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestManifest {
    pub path: PathBuf,
    pub files: usize,
}

/// Writes request manifests using file details from the catalog
#[derive(Debug)]
pub struct RequestEmitter {
    client: CatalogClient,
    config: RequestConfig,
}

impl RequestEmitter {
    pub fn new(client: CatalogClient, config: RequestConfig) -> Self {
        Self { client, config }
    }

    /// Look up every file of the given groups and write one manifest
    ///
    /// All lookups complete before anything is written, so a failure leaves
    /// no file behind.
    ///
    /// # Errors
    ///
    /// - `RequestError::ProtocolMismatch` when a file has no HTTPServer URL
    /// - `RequestError::Catalog` when a lookup fails
    /// - `RequestError::Io` when the manifest cannot be written
    pub async fn emit(&self, kind: RequestKind, groups: &[GroupKey]) -> RequestResult<RequestManifest> {
        self.emit_at(kind, groups, Local::now()).await
    }

    async fn emit_at(
        &self,
        kind: RequestKind,
        groups: &[GroupKey],
        now: DateTime<Local>,
    ) -> RequestResult<RequestManifest> {
        let mut content = String::new();
        let mut files = 0usize;

        for group in groups {
            debug!("Looking up files for {}", group);
            let records: Vec<RemoteFileRecord> = self
                .client
                .search_files(&group.dataset_id, &group.variable)
                .try_collect()
                .await?;

            for record in &records {
                content.push_str(&manifest_line(record)?);
                content.push('\n');
                files += 1;
            }
        }

        let path = request_path(&self.config.output_dir, kind, &self.config.user, now);
        tokio::fs::write(&path, content).await?;

        info!("Wrote {} request for {} files to {}", kind, files, path.display());
        Ok(RequestManifest { path, files })
    }
}

/// Manifest line for one file, using its first HTTPServer URL
pub fn manifest_line(record: &RemoteFileRecord) -> RequestResult<String> {
    let entry = record
        .url_for_protocol(esgf::HTTP_SERVER_PROTOCOL)
        .ok_or_else(|| RequestError::ProtocolMismatch {
            title: record.title.clone(),
            protocol: esgf::HTTP_SERVER_PROTOCOL.to_string(),
        })?;

    Ok(format!(
        "'{}' '{}' '{}' '{}'",
        record.title,
        entry.url,
        record.checksum_type(),
        record.checksum().unwrap_or("")
    ))
}

/// `<dir>/<prefix>_<user>_<YYYYmmddTHHMM>.txt`
pub fn request_path(dir: &Path, kind: RequestKind, user: &str, now: DateTime<Local>) -> PathBuf {
    let name = format!(
        "{}_{}_{}.{}",
        kind.prefix(),
        user,
        now.format(request::TIMESTAMP_FORMAT),
        request::FILE_EXTENSION
    );
    dir.join(name)
}
