//! Host ↔ VM glue.
//!
//! Chunks announce their character roster and preload manifest by calling
//! host functions while they are being executed. Instead of letting those
//! callbacks mutate driver state directly, they write into a shared
//! [`SignalBuffer`] that the driver drains once the load returns — the load
//! is an explicit handshake, not a side channel.

pub mod types;

pub use types::{LoadSignals, SignalBuffer};

use mlua::{Lua, Table, Value};

/// Global slot compiled choice loops read their selection from. The driver
/// writes the chosen index (or nil, the no-selection sentinel) before every
/// step.
pub const SELECTION_SLOT: &str = "__selection";

/// Installs the host callbacks a chunk may invoke while loading.
///
/// Both calling conventions seen in compiled artifacts are registered: the
/// bare globals `defineCharacters` / `preloadResources` and the same pair
/// under the `story` namespace table.
pub fn install(lua: &Lua) -> mlua::Result<SignalBuffer> {
    let signals = SignalBuffer::new();
    let globals = lua.globals();

    let buffer = signals.clone();
    let define_characters = lua.create_function(move |_, json: String| {
        log::debug!("defineCharacters: {} bytes", json.len());
        buffer.push_roster(json);
        Ok(())
    })?;

    let buffer = signals.clone();
    let preload_resources = lua.create_function(move |_, json: String| {
        log::debug!("preloadResources: {} bytes", json.len());
        buffer.push_manifest(json);
        Ok(())
    })?;

    let story: Table = lua.create_table()?;
    story.set("defineCharacters", define_characters.clone())?;
    story.set("preloadResources", preload_resources.clone())?;

    globals.set("defineCharacters", define_characters)?;
    globals.set("preloadResources", preload_resources)?;
    globals.set("story", story)?;
    globals.set(SELECTION_SLOT, Value::Nil)?;

    Ok(signals)
}
