//! Local inventory of downloaded files
//!
//! The inventory is a SQLite database with two relations: content hashes
//! (md5 and sha256) and basenames, each keyed by an opaque identifier.
//! Reconciliation only asks existence questions of it.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::errors::{InventoryError, InventoryResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS checksums (
    ch_hash TEXT PRIMARY KEY,
    ch_md5 TEXT,
    ch_sha256 TEXT
);

CREATE TABLE IF NOT EXISTS basenames (
    pa_hash TEXT PRIMARY KEY,
    basename TEXT
);

CREATE INDEX IF NOT EXISTS checksums_md5 ON checksums (ch_md5);
CREATE INDEX IF NOT EXISTS checksums_sha256 ON checksums (ch_sha256);
CREATE INDEX IF NOT EXISTS basenames_basename ON basenames (basename);
"#;

/// Lookups the match classifier needs from an inventory
pub trait Inventory {
    /// Whether any file has this md5 or sha256 content hash
    fn has_checksum(&self, checksum: &str) -> InventoryResult<bool>;

    /// Whether any file has this basename
    fn has_basename(&self, basename: &str) -> InventoryResult<bool>;
}

/// SQLite-backed inventory
#[derive(Debug)]
pub struct SqliteInventory {
    conn: Connection,
    path: PathBuf,
}

impl SqliteInventory {
    /// Open an existing inventory read-only
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Connection` if the database is missing or
    /// cannot be opened
    pub fn open(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| InventoryError::Connection {
            path: path.clone(),
            source,
        })?;

        info!("Opened inventory database: {}", path.display());
        Ok(Self { conn, path })
    }

    /// Open (creating if needed) a writable inventory with the schema in place
    pub fn create(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| InventoryError::Connection {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialised inventory database: {}", path.display());
        Ok(Self { conn, path })
    }

    /// Record a local file under identifier `id`
    pub fn add_file(
        &self,
        id: &str,
        md5: Option<&str>,
        sha256: Option<&str>,
        basename: &str,
    ) -> InventoryResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO checksums (ch_hash, ch_md5, ch_sha256) VALUES (?1, ?2, ?3)",
            params![id, md5, sha256],
        )?;
        self.conn.execute(
            "INSERT OR REPLACE INTO basenames (pa_hash, basename) VALUES (?1, ?2)",
            params![id, basename],
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, sql: &str, value: &str) -> InventoryResult<bool> {
        let found = self
            .conn
            .query_row(sql, params![value], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

impl Inventory for SqliteInventory {
    fn has_checksum(&self, checksum: &str) -> InventoryResult<bool> {
        let found = self.exists(
            "SELECT 1 FROM checksums WHERE ch_md5 = ?1 OR ch_sha256 = ?1 LIMIT 1",
            checksum,
        )?;
        debug!("checksum {} present: {}", checksum, found);
        Ok(found)
    }

    fn has_basename(&self, basename: &str) -> InventoryResult<bool> {
        let found = self.exists(
            "SELECT 1 FROM basenames WHERE basename = ?1 LIMIT 1",
            basename,
        )?;
        debug!("basename {} present: {}", basename, found);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("checksums.db");
        let inventory = SqliteInventory::create(&path).unwrap();
        inventory
            .add_file("id-1", Some("md5-aaa"), Some("sha-aaa"), "tas_Amon.nc")
            .unwrap();
        inventory
            .add_file("id-2", None, Some("sha-bbb"), "pr_Amon.nc")
            .unwrap();
        path
    }

    #[test]
    fn test_checksum_lookup_uses_both_hash_kinds() {
        let dir = TempDir::new().unwrap();
        let inventory = SqliteInventory::open(seeded(&dir)).unwrap();

        assert!(inventory.has_checksum("md5-aaa").unwrap());
        assert!(inventory.has_checksum("sha-aaa").unwrap());
        assert!(inventory.has_checksum("sha-bbb").unwrap());
        assert!(!inventory.has_checksum("md5-zzz").unwrap());
    }

    #[test]
    fn test_basename_lookup() {
        let dir = TempDir::new().unwrap();
        let inventory = SqliteInventory::open(seeded(&dir)).unwrap();

        assert!(inventory.has_basename("pr_Amon.nc").unwrap());
        assert!(!inventory.has_basename("uas_Amon.nc").unwrap());
    }

    #[test]
    fn test_missing_database_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.db");

        match SqliteInventory::open(&path) {
            Err(InventoryError::Connection { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Connection error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_create_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = seeded(&dir);

        let reopened = SqliteInventory::create(&path).unwrap();
        assert!(reopened.has_basename("tas_Amon.nc").unwrap());
        assert_eq!(reopened.path(), path.as_path());
    }
}
