use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use super::models::Document;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record already exists")]
    AlreadyExists,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// File-backed document store.
///
/// Every call re-reads the document from disk. Mutations hold the write guard
/// for the whole load-mutate-save cycle; reads share the read guard. The lock
/// owns the document path, so the file is unreachable without a guard.
#[derive(Clone)]
pub struct Store {
    path: Arc<RwLock<PathBuf>>,
}

impl Store {
    /// Open the document at `path`, creating an empty one if it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            // Reject a corrupt document at startup
            load(&path)?;
        } else {
            save(&path, &Document::default())?;
        }

        Ok(Self {
            path: Arc::new(RwLock::new(path)),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> PathBuf {
        self.path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a read-only closure against a freshly loaded document
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let path = self.path.read().unwrap_or_else(PoisonError::into_inner);
        let doc = load(&path)?;
        f(&doc)
    }

    /// Load, mutate and persist the document under the exclusive lock.
    ///
    /// If the closure fails nothing is written.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let path = self.path.write().unwrap_or_else(PoisonError::into_inner);
        let mut doc = load(&path)?;
        let out = f(&mut doc)?;
        save(&path, &doc)?;
        Ok(out)
    }

    /// Snapshot of the whole document
    pub fn document(&self) -> Result<Document, StoreError> {
        self.read(|doc| Ok(doc.clone()))
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Clear every record and counter. Debug/test bootstrap only.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.write(|doc| {
            *doc = Document::default();
            Ok(())
        })?;
        tracing::warn!("Document reset to empty");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Document, StoreError> {
    let data = fs::read(path)?;
    if data.is_empty() {
        return Ok(Document::default());
    }
    Ok(serde_json::from_slice(&data)?)
}

/// Write to a sibling temp file and rename it over the document
fn save(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(doc)?;
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
