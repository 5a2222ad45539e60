//! Flat directory store for uploaded and extracted PDFs.
//!
//! Keys are file names derived from the current time in milliseconds, so the
//! same key works as an on-disk name and a URL segment.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Suffix appended to keys of extraction results.
pub const EXTRACTED_SUFFIX: &str = "_extracted";

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open the store, creating the directory if needed.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Storage { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` under a fresh key and return it.
    ///
    /// Existing files are never overwritten: when two writes land in the same
    /// millisecond the later one gets a `-<n>` counter.
    pub async fn put(&self, bytes: &[u8], suffix: &str) -> Result<String> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let mut attempt = 0u32;

        loop {
            let key = if attempt == 0 {
                format!("{stamp}{suffix}.pdf")
            } else {
                format!("{stamp}-{attempt}{suffix}.pdf")
            };

            let path = self.root.join(&key);
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match created {
                Ok(file) => {
                    write_or_discard(file, &path, bytes).await?;
                    debug!(key = %key, bytes = bytes.len(), "stored file");
                    return Ok(key);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read the bytes stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a key to its path. Keys that could escape the store are unknown.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(&['/', '\\', '\0'][..]);
        if !plain {
            return Err(Error::NotFound {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(key))
    }
}

/// Write `bytes` to a freshly created file; on failure remove it so no
/// truncated file is left under an unreturned key.
async fn write_or_discard<W: AsyncWrite + Unpin>(
    mut file: W,
    path: &Path,
    bytes: &[u8],
) -> Result<()> {
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove, "failed to remove partial file");
        }
        return Err(e.into());
    }
    Ok(())
}
