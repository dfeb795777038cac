//! One batch run: mirror every configured feed, then rebuild the catalog.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use feedmirror_engine::{
    build_catalog, write_catalog_artifacts, AssetStore, DocumentMirror, FetchSettings,
    ReqwestFetcher, RetryingFetcher,
};

use crate::config::{self, RunConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub failed: usize,
    pub catalog_entries: usize,
}

pub fn run(config_path: &Path) -> Result<RunSummary> {
    let config = config::load_config(config_path)?;
    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    runtime.block_on(execute(&config))
}

/// Every job is attempted; a failed job is logged and counted, never aborts
/// the run. The catalog is rebuilt from disk afterwards either way.
async fn execute(config: &RunConfig) -> Result<RunSummary> {
    let settings = FetchSettings::default();
    let fetcher = RetryingFetcher::new(
        Arc::new(ReqwestFetcher::new(&settings)?),
        settings.retry_limit,
    );
    let store = AssetStore::new(
        fetcher.clone(),
        config.output_dir.join("static"),
        config.hosting_url.clone(),
    );
    let mirror = DocumentMirror::new(fetcher, store, &config.output_dir);

    let jobs = config.jobs();
    let mut failed = 0;
    for job in &jobs {
        match mirror.mirror_feed(job).await {
            Ok(doc) => {
                log::info!(
                    "{} -> {} ({} assets)",
                    job.source_url,
                    doc.path.display(),
                    doc.assets_mirrored
                );
            }
            Err(err) => {
                failed += 1;
                log::error!("feed job {} failed: {err}", job.source_url);
            }
        }
    }

    let entries = build_catalog(&config.output_dir, config.hosting_url.as_deref())?;
    write_catalog_artifacts(&config.output_dir, &entries)?;
    log::info!(
        "run finished: {}/{} feeds mirrored, {} catalog entries",
        jobs.len() - failed,
        jobs.len(),
        entries.len()
    );

    Ok(RunSummary {
        total: jobs.len(),
        failed,
        catalog_entries: entries.len(),
    })
}
