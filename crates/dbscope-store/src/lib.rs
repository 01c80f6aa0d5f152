//! Database file discovery, import and removal
//!
//! A `Store` owns one directory of SQLite database files. Discovery
//! re-scans the directory on every call, so listing stays consistent
//! with whatever import and removal did in the meantime.

use dbscope_core::{Database, DbscopeError, Result};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Journal sidecar suffixes that never count as databases on their own
const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm", "-journal"];

/// Outcome of one import batch
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Databases copied into the store, in source order
    pub imported: Vec<Database>,
    /// Source paths that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// True when the batch was interrupted by cancellation
    pub cancelled: bool,
}

impl ImportReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

/// Directory of database files under inspection
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store over `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the store directory for database files, sorted by name.
    ///
    /// Sidecar files (`-wal`, `-shm`, `-journal`) are skipped; they
    /// belong to a database, they are not databases.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn find(&self) -> Result<Vec<Database>> {
        let mut databases = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_sidecar(name) {
                continue;
            }

            databases.push(Database {
                name: name.to_string(),
                path: path.clone(),
                size_bytes: metadata.len(),
            });
        }

        databases.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(count = databases.len(), "store scanned");
        Ok(databases)
    }

    /// Copy database files into the store.
    ///
    /// Each destination name is the source's final path segment, and an
    /// existing file under that name is overwritten. A failing source is
    /// recorded and skipped; the rest of the batch still runs. An empty
    /// source list is an error, there is nothing sensible to report for
    /// it.
    #[tracing::instrument(skip(self, sources, token))]
    pub async fn import(
        &self,
        sources: &[PathBuf],
        token: &CancellationToken,
    ) -> Result<ImportReport> {
        if sources.is_empty() {
            return Err(DbscopeError::Import("no files to import".into()));
        }

        let mut report = ImportReport::default();
        for source in sources {
            if token.is_cancelled() {
                tracing::info!(
                    imported = report.imported.len(),
                    remaining = sources.len() - report.imported.len() - report.failed.len(),
                    "import cancelled"
                );
                report.cancelled = true;
                break;
            }

            match self.import_one(source).await {
                Ok(database) => report.imported.push(database),
                Err(e) => {
                    tracing::warn!(source = %source.display(), error = %e, "import failed, skipping");
                    report.failed.push((source.clone(), e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn import_one(&self, source: &Path) -> Result<Database> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DbscopeError::Import(format!("source has no file name: {}", source.display()))
            })?;

        let destination = self.root.join(name);
        let size_bytes = tokio::fs::copy(source, &destination).await.map_err(|e| {
            DbscopeError::Import(format!("failed to copy {}: {}", source.display(), e))
        })?;

        tracing::info!(name, size_bytes, "database imported");
        Ok(Database {
            name: name.to_string(),
            path: destination,
            size_bytes,
        })
    }

    /// Delete a database file and any journal sidecars next to it.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(DbscopeError::NotFound(format!(
                "no database named '{name}' in the store"
            )));
        }

        tokio::fs::remove_file(&path).await?;
        for suffix in SIDECAR_SUFFIXES {
            let sidecar = self.root.join(format!("{name}{suffix}"));
            if sidecar.is_file() {
                tokio::fs::remove_file(&sidecar).await?;
            }
        }

        tracing::info!(name, "database removed");
        Ok(())
    }
}

fn is_sidecar(name: &str) -> bool {
    SIDECAR_SUFFIXES.iter().any(|s| name.ends_with(s))
}
