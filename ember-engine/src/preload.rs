//! Concurrent asset preloading.
//!
//! Every roster sprite and every manifest url becomes one load request; the
//! requests fan out over a bounded worker pool and every one of them
//! settles. A failed load produces a failed-but-present cache entry, so a
//! single bad url can never abort the batch or block VM start.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ember_script::story::{Character, CharacterSprite};
use rustc_hash::FxHashMap;

/// Upper bound on concurrent load workers.
const MAX_WORKERS: usize = 16;

/// Loads the bytes behind a resolved media url.
pub trait AssetLoader: Send + Sync {
    fn load(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Loader for local paths and `file://` urls.
pub struct FsAssetLoader;

impl AssetLoader for FsAssetLoader {
    fn load(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(std::fs::read(path)?)
    }
}

/// Outcome of one preload request.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState {
    Loaded(Vec<u8>),
    /// The load failed; the entry stays addressable.
    Failed,
    /// Empty address, intentionally absent. Not a failure.
    Absent,
}

/// One settled preload request.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub key: String,
    pub url: String,
    /// Sprite metadata for roster entries; `None` for bare manifest urls.
    pub sprite: Option<CharacterSprite>,
    pub state: AssetState,
}

impl CachedAsset {
    pub fn is_failed(&self) -> bool {
        matches!(self.state, AssetState::Failed)
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.state {
            AssetState::Loaded(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Cache keyed by identity label: `"<character>/<sprite>"` for roster
/// entries, the bare url for manifest entries.
pub type PreloadCache = FxHashMap<String, CachedAsset>;

/// Resolves every roster sprite and manifest url into a fresh cache.
///
/// The returned map replaces any previous cache wholesale; callers needing
/// entries to survive a reload must snapshot them externally.
pub fn preload(
    characters: &[Character],
    resources: &[String],
    loader: &dyn AssetLoader,
) -> PreloadCache {
    let jobs: Vec<(String, String, Option<CharacterSprite>)> = characters
        .iter()
        .flat_map(|character| {
            character.sprites.iter().map(|sprite| {
                (
                    format!("{}/{}", character.name, sprite.name),
                    sprite.url.clone(),
                    Some(sprite.clone()),
                )
            })
        })
        .chain(resources.iter().map(|url| (url.clone(), url.clone(), None)))
        .collect();

    let settled: Mutex<Vec<CachedAsset>> = Mutex::new(Vec::with_capacity(jobs.len()));
    let cursor = AtomicUsize::new(0);
    let workers = jobs.len().min(MAX_WORKERS);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some((key, url, sprite)) = jobs.get(index) else {
                        break;
                    };
                    let asset = CachedAsset {
                        key: key.clone(),
                        url: url.clone(),
                        sprite: sprite.clone(),
                        state: load_one(url, loader),
                    };
                    if let Ok(mut done) = settled.lock() {
                        done.push(asset);
                    }
                }
            });
        }
    });

    let mut cache = PreloadCache::default();
    for asset in settled.into_inner().unwrap_or_default() {
        cache.insert(asset.key.clone(), asset);
    }
    log::debug!("preloaded {} assets", cache.len());
    cache
}

fn load_one(url: &str, loader: &dyn AssetLoader) -> AssetState {
    if url.is_empty() {
        return AssetState::Absent;
    }
    match loader.load(url) {
        Ok(bytes) => AssetState::Loaded(bytes),
        Err(e) => {
            log::warn!("preload failed for {url}: {e}");
            AssetState::Failed
        }
    }
}
