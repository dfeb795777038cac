use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use feedmirror_engine::{
    asset_key, AssetStore, FetchFailure, Fetcher, RetryingFetcher, StoreError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct ScriptedFetcher {
    payload: Vec<u8>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn succeeding(payload: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            payload: payload.to_vec(),
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            payload: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(FetchFailure::HttpStatus(500))
        } else {
            Ok(self.payload.clone())
        }
    }
}

fn store_with(fetcher: Arc<ScriptedFetcher>, dir: &TempDir, hosting: Option<&str>) -> AssetStore {
    AssetStore::new(
        RetryingFetcher::new(fetcher, 0),
        dir.path().join("static"),
        hosting.map(str::to_string),
    )
}

#[tokio::test]
async fn mirror_downloads_once_and_dedups_afterwards() {
    let temp = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::succeeding(b"asset bytes");
    let store = store_with(fetcher.clone(), &temp, Some("https://mirror.example.net"));
    let url = "https://cdn.test/logo.png";

    let first = store.mirror(url).await.unwrap();
    let second = store.mirror(url).await.unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(first.freshly_downloaded);
    assert!(!second.freshly_downloaded);
    assert_eq!(first.local_reference, second.local_reference);
    assert_eq!(
        first.local_reference.as_deref(),
        Some(format!("https://mirror.example.net/static/{}", asset_key(url)).as_str())
    );

    let stored = fs::read(temp.path().join("static").join(asset_key(url))).unwrap();
    assert_eq!(stored, b"asset bytes");
}

#[tokio::test]
async fn missing_hosting_base_means_no_rewrite_reference() {
    let temp = TempDir::new().unwrap();
    let store = store_with(ScriptedFetcher::succeeding(b"x"), &temp, None);

    let asset = store.mirror("https://cdn.test/a.css").await.unwrap();
    assert_eq!(asset.local_reference, None);
    // Still downloaded and stored.
    assert!(temp.path().join("static").join(asset.key).exists());
}

#[tokio::test]
async fn failed_download_leaves_nothing_on_disk() {
    let temp = TempDir::new().unwrap();
    let store = store_with(ScriptedFetcher::failing(), &temp, None);

    let err = store.mirror("https://cdn.test/gone.png").await.unwrap_err();
    assert!(matches!(err, StoreError::Fetch(_)));

    let static_dir = temp.path().join("static");
    let leftover = static_dir
        .exists()
        .then(|| fs::read_dir(&static_dir).unwrap().count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn existing_file_is_never_refetched_or_rewritten() {
    let temp = TempDir::new().unwrap();
    let url = "https://cdn.test/pinned.png";
    let static_dir = temp.path().join("static");
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join(asset_key(url)), b"original bytes").unwrap();

    let fetcher = ScriptedFetcher::succeeding(b"new bytes");
    let store = store_with(fetcher.clone(), &temp, None);
    let asset = store.mirror(url).await.unwrap();

    assert!(!asset.freshly_downloaded);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        fs::read(static_dir.join(asset_key(url))).unwrap(),
        b"original bytes"
    );
}

#[tokio::test]
async fn concurrent_mirrors_of_the_same_url_fetch_once() {
    let temp = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::succeeding(b"shared");
    let store = store_with(fetcher.clone(), &temp, None);
    let url = "https://cdn.test/shared.png";

    let (a, b) = tokio::join!(store.mirror(url), store.mirror(url));
    a.unwrap();
    b.unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fs::read_dir(temp.path().join("static")).unwrap().count(), 1);
}
