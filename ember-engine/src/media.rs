//! Storage-backed media address resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use ember_script::encode::MediaResolver;
use walkdir::WalkDir;

/// Storage types addressable as `"<type>:<name>"`.
pub const MEDIA_TYPES: [&str; 3] = ["audio", "background", "sprite"];

/// Directory-backed media store, the default [`MediaResolver`].
///
/// Layout mirrors the store types — `<root>/audio/…`, `<root>/background/…`,
/// `<root>/sprite/…` — keyed by file stem. An address whose name is unknown
/// resolves to the empty string; anything that is not a storage address
/// passes through untouched.
pub struct MediaLibrary {
    index: HashMap<(String, String), PathBuf>,
    cache: Mutex<HashMap<String, String>>,
}

impl MediaLibrary {
    /// Scans `root` and indexes every media file under the typed
    /// subdirectories.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            anyhow::bail!("media root {:?} is not a directory", root);
        }

        let mut index = HashMap::new();
        for media_type in MEDIA_TYPES {
            let dir = root.join(media_type);
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_stem() else {
                    continue;
                };
                index.insert(
                    (media_type.to_string(), name.to_string_lossy().to_string()),
                    path.to_path_buf(),
                );
            }
        }

        log::info!("media library at {:?}: {} assets", root, index.len());
        Ok(MediaLibrary {
            index,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn lookup(&self, media_type: &str, name: &str) -> String {
        self.index
            .get(&(media_type.to_string(), name.to_string()))
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

impl MediaResolver for MediaLibrary {
    fn resolve(&self, address: &str) -> String {
        let Some((media_type, name)) = address.split_once(':') else {
            return address.to_string();
        };
        // literal urls ("https://…") are not storage addresses
        if !MEDIA_TYPES.contains(&media_type) {
            return address.to_string();
        }

        if let Some(hit) = self
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(address).cloned())
        {
            return hit;
        }

        let url = self.lookup(media_type, name);
        if url.is_empty() {
            log::warn!("unresolved media address: {address}");
        } else if let Ok(mut cache) = self.cache.lock() {
            cache.insert(address.to_string(), url.clone());
        }
        url
    }
}
