//! Local working-tree reader for dry runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use notify_core::TransportError;
use notify_routing::ContentReader;

/// Reads rule files from a checked-out workspace. The revision is ignored.
#[derive(Debug, Clone)]
pub struct FsContentReader {
    root: PathBuf,
}

impl FsContentReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentReader for FsContentReader {
    async fn get_contents(&self, path: &str, _revision: &str) -> Result<Option<Vec<u8>>, TransportError> {
        let full = self.root.join(path);
        let err = match tokio::fs::read(&full).await {
            Ok(bytes) => return Ok(Some(bytes)),
            Err(err) => err,
        };
        if err.kind() == ErrorKind::NotFound || self.unreachable(&full).await {
            debug!(path = %full.display(), error = %err, "no rule file");
            return Ok(None);
        }
        Err(TransportError::Io { path: full, source: err })
    }
}

impl FsContentReader {
    /// `full` is a directory, or some ancestor inside the root is not one.
    /// The latter happens for the level of a changed file that exists on disk.
    async fn unreachable(&self, full: &Path) -> bool {
        if is_dir(full).await == Some(true) {
            return true;
        }
        for ancestor in full.ancestors().skip(1) {
            if ancestor == self.root || !ancestor.starts_with(&self.root) {
                break;
            }
            if is_dir(ancestor).await == Some(false) {
                return true;
            }
        }
        false
    }
}

async fn is_dir(path: &Path) -> Option<bool> {
    tokio::fs::metadata(path).await.ok().map(|meta| meta.is_dir())
}
