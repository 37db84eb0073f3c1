//! ジョブのローカル実行データベース
//!
//! レジストリが割り当てたパスに SQLite ストアを用意する。
//! 既に利用可能なストアがあれば何もしない（冪等）。

use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// スキーマバージョン
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "Version" (
    "ID" INTEGER PRIMARY KEY,
    "Version" INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS "Configuration" (
    "Key" TEXT PRIMARY KEY NOT NULL,
    "Value" TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS "Operation" (
    "ID" INTEGER PRIMARY KEY,
    "Description" TEXT NOT NULL,
    "Timestamp" INTEGER NOT NULL
);
"#;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Database(#[from] rusqlite::Error),
}

/// ローカルストアの用意
pub trait StorageProvisioner {
    /// `path` にストアを用意する（既存なら何もしない）
    fn provision(&self, path: &Path) -> Result<(), StorageError>;
}

impl<T: StorageProvisioner + ?Sized> StorageProvisioner for &T {
    fn provision(&self, path: &Path) -> Result<(), StorageError> {
        (**self).provision(path)
    }
}

/// SQLite によるローカルストア
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteProvisioner;

impl SqliteProvisioner {
    pub fn new() -> Self {
        Self
    }
}

impl StorageProvisioner for SqliteProvisioner {
    fn provision(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let existed = path.exists();
        let mut conn = Connection::open(path)?;
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)?;

        let version: Option<i64> = tx
            .query_row(r#"SELECT "Version" FROM "Version" LIMIT 1"#, [], |row| {
                row.get(0)
            })
            .optional()?;
        if version.is_none() {
            tx.execute(
                r#"INSERT INTO "Version" ("Version") VALUES (?1)"#,
                [SCHEMA_VERSION],
            )?;
        }
        tx.commit()?;

        if existed {
            debug!(path = %path.display(), ?version, "local database already present");
        } else {
            info!(path = %path.display(), "local database created");
        }
        Ok(())
    }
}
