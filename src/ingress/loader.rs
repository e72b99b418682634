//! Snapshot loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ingress::types::Snapshot;

/// Error type for snapshot loading.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse snapshot {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load an ingress snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot =
        serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        path = ?path,
        servers = snapshot.servers.len(),
        backends = snapshot.backends.len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}
