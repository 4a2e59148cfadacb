//! Store files on disk
//!
//! Loading is lenient: a missing, unreadable or corrupt file yields an empty
//! store so a test run never fails over achievement data. Saving is strict
//! and reports every error.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::store::{StoreError, UnlockStore};

/// Load a store file
pub fn load_from_path(path: impl AsRef<Path>) -> Result<UnlockStore, StoreError> {
    let file = File::open(path)?;
    UnlockStore::load(BufReader::new(file))
}

/// Load a store file, falling back to an empty store on any failure
pub fn load_or_default(path: impl AsRef<Path>) -> UnlockStore {
    let path = path.as_ref();
    debug!("reading achievement data from {}", path.display());
    match load_from_path(path) {
        Ok(store) => store,
        Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            debug!("no achievement data at {}, starting fresh", path.display());
            UnlockStore::new()
        }
        Err(err) => {
            warn!(
                "ignoring unreadable achievement data at {}: {err}",
                path.display()
            );
            UnlockStore::new()
        }
    }
}

/// Write a store file, replacing previous contents
///
/// The data goes to a temporary file next to `path` which is then renamed
/// over it, so a failed save leaves the previous file intact.
pub fn save_to_path(store: &UnlockStore, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    debug!("writing achievement data to {}", path.display());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    store.save(BufWriter::new(tmp.as_file_mut()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Remove a store file; a missing file is not an error
pub fn delete_store(path: impl AsRef<Path>) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}
