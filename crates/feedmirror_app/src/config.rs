//! Run configuration: a RON file naming the feeds to mirror, the output
//! directory, and the optional hosting base URL.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use feedmirror_engine::FeedJob;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "feedmirror.ron";

#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    pub url: String,
    /// Pinned output file stem; the feed title names the file otherwise.
    #[serde(default)]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub feeds: Vec<FeedEntry>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub hosting_url: Option<String>,
}

impl RunConfig {
    /// The validated job list, in configuration order.
    pub fn jobs(&self) -> Vec<FeedJob> {
        self.feeds
            .iter()
            .map(|feed| FeedJob {
                source_url: feed.url.clone(),
                output_name: feed.output_name.clone(),
            })
            .collect()
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file {}", path.display()))?;
    let config: RunConfig = ron::from_str(&text)
        .with_context(|| format!("configuration file {} is invalid", path.display()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &RunConfig) -> Result<()> {
    if config.feeds.is_empty() {
        bail!("configuration lists no feeds");
    }
    for feed in &config.feeds {
        if !feed.url.starts_with("http://") && !feed.url.starts_with("https://") {
            bail!("feed url {:?} is not an absolute http(s) url", feed.url);
        }
        if let Some(name) = &feed.output_name {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                bail!("output name {name:?} for {} is not a plain filename", feed.url);
            }
        }
    }
    if let Some(hosting) = &config.hosting_url {
        if !hosting.starts_with("http://") && !hosting.starts_with("https://") {
            bail!("hosting url {hosting:?} is not an absolute http(s) url");
        }
    }
    Ok(())
}
