use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::fetch::{FetchExhausted, RetryingFetcher};
use crate::persist::{AtomicFileWriter, PersistError};

/// Lowercase hex SHA-256 of a string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Content-address of an asset: the digest of its *original URL string*, not
/// of its bytes. The same URL maps to the same key across runs and processes.
pub fn asset_key(url: &str) -> String {
    sha256_hex(url)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Fetch(#[from] FetchExhausted),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Outcome of mirroring one asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredAsset {
    pub key: String,
    /// Rewrite target for in-document references; `None` when no hosting
    /// base URL is configured, in which case the original URL stays as is.
    pub local_reference: Option<String>,
    pub freshly_downloaded: bool,
}

/// Append-only, content-addressed store under the `static/` directory.
///
/// A key's file, once written, is never rewritten or deleted. The existence
/// check and the download-then-write run under a per-key lock, so concurrent
/// callers mirroring the same URL cannot double-fetch or double-write.
pub struct AssetStore {
    fetcher: RetryingFetcher,
    static_dir: PathBuf,
    hosting_base_url: Option<String>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AssetStore {
    pub fn new(
        fetcher: RetryingFetcher,
        static_dir: PathBuf,
        hosting_base_url: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            static_dir,
            hosting_base_url,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Mirror `url` into the store, downloading only if its key is not
    /// already present. The write is all-or-nothing: a failed download
    /// leaves no file behind.
    pub async fn mirror(&self, url: &str) -> Result<MirroredAsset, StoreError> {
        let key = asset_key(url);
        let lock = self.key_lock(&key).await;
        let _held = lock.lock().await;

        let target = self.static_dir.join(&key);
        let freshly_downloaded = if target.exists() {
            log::debug!("asset {url} already mirrored as {key}");
            false
        } else {
            let bytes = self.fetcher.fetch(url).await?;
            let writer = AtomicFileWriter::new(self.static_dir.clone());
            writer.write_bytes(&key, &bytes)?;
            log::info!("mirrored {url} -> {key} ({} bytes)", bytes.len());
            true
        };

        Ok(MirroredAsset {
            local_reference: self
                .hosting_base_url
                .as_deref()
                .map(|base| format!("{}/static/{key}", base.trim_end_matches('/'))),
            key,
            freshly_downloaded,
        })
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut map = self.in_flight.lock().await;
        map.entry(key.to_string()).or_default().clone()
    }
}
