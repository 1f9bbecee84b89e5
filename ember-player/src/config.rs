//! Player configuration, read from `player.toml` when present.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Media library root for `"<type>:<name>"` addresses.
    pub assets: String,
    /// Preload every referenced asset before the first step.
    pub preload: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            assets: "assets".to_string(),
            preload: true,
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> PlayerConfig {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("no config at {:?}, using defaults", path);
        return PlayerConfig::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::error!("cannot read {:?}: {}, using defaults", path, e);
            return PlayerConfig::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|e| {
        log::error!("config syntax error: {}, using defaults", e);
        PlayerConfig::default()
    })
}
