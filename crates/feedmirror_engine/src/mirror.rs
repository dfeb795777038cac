use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::decode::decode_feed;
use crate::extract::extract_urls;
use crate::fetch::{FetchExhausted, RetryingFetcher};
use crate::filename::sanitize_file_stem;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::store::{sha256_hex, AssetStore, StoreError};
use crate::title::display_title;

/// One validated feed to mirror, as handed over by the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedJob {
    pub source_url: String,
    /// Pinned output file stem. When absent the feed's own title names the
    /// file, which means a title change between runs orphans the old file.
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredDocument {
    pub title: String,
    pub file_name: String,
    pub path: PathBuf,
    pub assets_mirrored: usize,
    pub assets_failed: usize,
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("feed download failed: {0}")]
    Fetch(#[from] FetchExhausted),
    #[error("feed persist failed: {0}")]
    Persist(#[from] PersistError),
}

/// Mirrors one feed document: fetch, discover asset URLs, mirror each asset,
/// rewrite the references, persist under `xml/`.
pub struct DocumentMirror {
    fetcher: RetryingFetcher,
    store: AssetStore,
    xml_dir: PathBuf,
}

impl DocumentMirror {
    pub fn new(fetcher: RetryingFetcher, store: AssetStore, output_dir: &Path) -> Self {
        Self {
            fetcher,
            store,
            xml_dir: output_dir.join("xml"),
        }
    }

    /// Fully replaces any previous output for this job; there is no merge
    /// with an earlier run. Asset downloads that exhaust their retries leave
    /// the original URL in place and do not fail the job.
    pub async fn mirror_feed(&self, job: &FeedJob) -> Result<MirroredDocument, MirrorError> {
        log::info!("backing up {}", job.source_url);
        let raw = self.fetcher.fetch(&job.source_url).await?;
        let decoded = decode_feed(&raw);
        log::debug!(
            "downloaded {} ({} bytes, {})",
            job.source_url,
            raw.len(),
            decoded.encoding_label
        );

        let title =
            display_title(&decoded.text).unwrap_or_else(|| sha256_hex(&job.source_url));
        let file_name = output_file_name(job, &title);

        let mut text = decoded.text;
        let mut assets_mirrored = 0;
        let mut assets_failed = 0;
        for url in extract_urls(&text) {
            match self.store.mirror(&url).await {
                Ok(asset) => {
                    assets_mirrored += 1;
                    if let Some(reference) = asset.local_reference {
                        // Replace against the current text so a URL that was
                        // already rewritten is not touched twice.
                        text = text.replace(&url, &reference);
                    }
                }
                Err(StoreError::Fetch(err)) => {
                    assets_failed += 1;
                    log::warn!("leaving {url} unrewritten: {err}");
                }
                Err(StoreError::Persist(err)) => return Err(MirrorError::Persist(err)),
            }
        }

        let writer = AtomicFileWriter::new(self.xml_dir.clone());
        let path = writer.write(&file_name, &text)?;
        log::info!(
            "backup of {title} done ({assets_mirrored} assets mirrored, {assets_failed} failed)"
        );

        Ok(MirroredDocument {
            title,
            file_name,
            path,
            assets_mirrored,
            assets_failed,
        })
    }
}

fn output_file_name(job: &FeedJob, title: &str) -> String {
    let stem = job.output_name.as_deref().unwrap_or(title);
    format!("{}.xml", sanitize_file_stem(stem))
}
