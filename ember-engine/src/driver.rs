//! Stepwise runtime driver over the embedded Lua VM.

use ember_script::story::Character;
use mlua::{Lua, LuaSerdeExt, Thread, ThreadStatus, Value};
use serde::{Deserialize, Serialize};

use crate::compiler::Chunk;
use crate::error::{EngineError, EngineResult};
use crate::lua_glue::{self, SELECTION_SLOT};
use crate::preload::{self, AssetLoader, CachedAsset, FsAssetLoader, PreloadCache};

/// Presentation tags attached to a narrative unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub se: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprites: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
}

/// One entry of a pending branch choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryOption {
    pub option: String,
    pub key: u32,
}

/// One narrative unit, returned per step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryUnit {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub options: Option<Vec<StoryOption>>,
}

impl StoryUnit {
    /// True while the script waits for [`StoryDriver::next`] to be called
    /// with a choice index.
    pub fn awaiting_choice(&self) -> bool {
        self.options.as_ref().is_some_and(|options| !options.is_empty())
    }
}

/// Drives one compiled story chunk through the VM.
///
/// A driver starts Unloaded and moves to Loaded on a successful
/// [`reload`](Self::reload); it stays Loaded once the story finishes —
/// further steps just return `None`.
pub struct StoryDriver {
    lua: Lua,
    thread: Option<Thread>,
    characters: Vec<Character>,
    resources: Vec<String>,
    cache: PreloadCache,
    loader: Box<dyn AssetLoader>,
    loaded: bool,
}

impl StoryDriver {
    pub fn new() -> Self {
        Self::with_loader(Box::new(FsAssetLoader))
    }

    pub fn with_loader(loader: Box<dyn AssetLoader>) -> Self {
        StoryDriver {
            lua: Lua::new(),
            thread: None,
            characters: Vec::new(),
            resources: Vec::new(),
            cache: PreloadCache::default(),
            loader,
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The roster announced by the current chunk, identity labels stamped.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Extra preload urls announced by the current chunk.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    pub fn asset(&self, key: &str) -> Option<&CachedAsset> {
        self.cache.get(key)
    }

    /// Loads `chunk` and preloads every referenced asset.
    pub fn reload(&mut self, chunk: &Chunk) -> EngineResult<()> {
        self.reload_with(chunk, true)
    }

    /// Loads `chunk`. With `preload = false` asset resolution is skipped
    /// entirely (validation mode); the cache is cleared either way.
    pub fn reload_with(&mut self, chunk: &Chunk, preload: bool) -> EngineResult<()> {
        self.loaded = false;
        self.thread = None;
        self.cache = PreloadCache::default();
        self.lua = Lua::new();

        let signals = lua_glue::install(&self.lua).map_err(runtime_fault)?;

        let thread: Thread = self
            .lua
            .load(&chunk.source)
            .set_name(chunk.name.as_str())
            .eval()
            .map_err(runtime_fault)?;

        let load = signals.drain();
        self.characters = match load.roster {
            Some(json) => decode_roster(&json)?,
            None => Vec::new(),
        };
        self.resources = match load.manifest {
            Some(json) => serde_json::from_str(&json).map_err(|e| EngineError::Runtime {
                message: format!("bad preload manifest: {e}"),
            })?,
            None => Vec::new(),
        };

        log::info!(
            "chunk {} loaded: {} characters, {} extra resources",
            chunk.name,
            self.characters.len(),
            self.resources.len()
        );

        if preload {
            self.cache = preload::preload(&self.characters, &self.resources, self.loader.as_ref());
        }

        self.thread = Some(thread);
        self.loaded = true;
        Ok(())
    }

    /// Advances the story by exactly one VM step.
    ///
    /// `choice` answers a pending branch; `None` is the no-selection
    /// sentinel, so index 0 stays a real selection. Returns `Ok(None)` from
    /// an Unloaded driver (fails closed, the VM is never touched) and once
    /// the story has finished.
    pub fn next(&mut self, choice: Option<usize>) -> EngineResult<Option<StoryUnit>> {
        if !self.loaded {
            return Ok(None);
        }
        let Some(thread) = &self.thread else {
            return Ok(None);
        };
        if thread.status() != ThreadStatus::Resumable {
            return Ok(None);
        }

        let globals = self.lua.globals();
        match choice {
            Some(index) => globals.set(SELECTION_SLOT, index).map_err(runtime_fault)?,
            None => globals.set(SELECTION_SLOT, Value::Nil).map_err(runtime_fault)?,
        }

        let value: Value = thread.resume(()).map_err(runtime_fault)?;
        if value.is_nil() {
            return Ok(None);
        }
        let unit: StoryUnit = self.lua.from_value(value).map_err(runtime_fault)?;
        Ok(Some(unit))
    }
}

impl Default for StoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn runtime_fault(e: mlua::Error) -> EngineError {
    EngineError::Runtime {
        message: e.to_string(),
    }
}

/// Decodes the roster payload and stamps every character and sprite with
/// its identity label — the preload-cache key, distinct from authoring ids.
fn decode_roster(json: &str) -> EngineResult<Vec<Character>> {
    let mut characters: Vec<Character> =
        serde_json::from_str(json).map_err(|e| EngineError::Runtime {
            message: format!("bad character roster: {e}"),
        })?;
    for character in &mut characters {
        character.id = Some(character.name.clone());
        for sprite in &mut character.sprites {
            sprite.id = Some(format!("{}/{}", character.name, sprite.name));
        }
    }
    Ok(characters)
}
