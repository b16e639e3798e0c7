//! Durable state
//!
//! Layout under the data directory, compatible with the earlier bots:
//!
//! ```text
//! Dicts/<lang>.txt               seed words, one per line
//! Days/<lang>/<dd-mm-YYYY>.txt   session record, flat JSON object
//! ```

pub mod seed;
mod session;

pub use session::SessionStore;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt session file '{path}': {source}", path = path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replace `path` with `contents` via a temp file in the same directory
///
/// Readers see either the old file or the new one, never a torn write.
pub(crate) fn write_atomic(path: &std::path::Path, contents: &[u8]) -> Result<(), StoreError> {
    use std::io::Write;

    let write_err = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(contents).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
