//! Feed mirroring engine: fetch, URL discovery, content-addressed storage,
//! document rewriting, and catalog generation.
mod catalog;
mod decode;
mod extract;
mod fetch;
mod filename;
mod mirror;
mod persist;
mod store;
mod title;

pub use catalog::{
    build_catalog, render_readme, write_catalog_artifacts, CatalogEntry, CatalogError,
};
pub use decode::{decode_feed, DecodedFeed};
pub use extract::extract_urls;
pub use fetch::{
    FetchExhausted, FetchFailure, FetchSettings, Fetcher, ReqwestFetcher, RetryingFetcher,
    BROWSER_ACCEPT, BROWSER_USER_AGENT,
};
pub use filename::sanitize_file_stem;
pub use mirror::{DocumentMirror, FeedJob, MirrorError, MirroredDocument};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use store::{asset_key, sha256_hex, AssetStore, MirroredAsset, StoreError};
pub use title::{display_title, source_link};
