//! Story → tagged script document.
//!
//! The document has three stanzas in fixed order: the character roster, the
//! preload manifest, and one encoded segment per line. The two metadata
//! stanzas are fenced `lua global` blocks whose payload is JSON re-encoded
//! as a JSON string — the VM unescapes the string literal once at load and
//! is left with plain JSON. External artifacts depend on the double
//! encoding; do not flatten it.

use crate::story::{Character, Line, Story};

pub(crate) const DEFINE_CHARACTERS: &str = "story.defineCharacters";
pub(crate) const PRELOAD_RESOURCES: &str = "story.preloadResources";

/// Media resolution capability injected into [`encode`].
pub trait MediaResolver {
    /// Maps a media address to a loadable url. Storage addresses that do
    /// not resolve map to the empty string.
    fn resolve(&self, address: &str) -> String;
}

/// Resolver that leaves every address untouched (export scenario).
pub struct Passthrough;

impl MediaResolver for Passthrough {
    fn resolve(&self, address: &str) -> String {
        address.to_string()
    }
}

/// Encodes `story` into the tagged script document the compiler consumes.
///
/// Every sprite url in the roster is resolved exactly once. Scene urls are
/// resolved and additionally collected into the preload manifest in line
/// order, duplicates included (the VM side may dedupe). The input story is
/// not modified.
pub fn encode(story: &Story, resolver: &dyn MediaResolver) -> String {
    let characters = export_characters(&story.characters, resolver);

    let mut manifest: Vec<String> = Vec::new();
    let segments: Vec<String> = story
        .lines
        .iter()
        .map(|line| match line {
            Line::Text(text) => {
                let mut parts: Vec<String> = Vec::new();
                if !text.sprites.is_empty() {
                    parts.push(format!(":sprites[{}]", text.sprites.join("|")));
                }
                if !text.remote.is_empty() {
                    let tags: Vec<&str> = text.remote.iter().map(String::as_str).collect();
                    parts.push(format!(":remote[{}]", tags.join("|")));
                }
                parts.push(format!(":narrator[{}]", text.narrator));
                parts.push(format!(":color[{}]", text.narrator_color));
                parts.push(text.text.clone());
                parts.join(" ")
            }
            Line::Scene(scene) => {
                let url = resolver.resolve(&scene.media);
                manifest.push(url.clone());
                format!(":{}[{}] {}", scene.scene, scene.style, url)
            }
        })
        .collect();

    let manifest_json =
        serde_json::to_string(&manifest).expect("a url list always serializes");
    let preloaded = global_block(PRELOAD_RESOURCES, &manifest_json);

    format!("\n{characters}\n\n{preloaded}\n\n{}\n", segments.join("\n\n"))
}

fn export_characters(characters: &[Character], resolver: &dyn MediaResolver) -> String {
    let resolved: Vec<Character> = characters
        .iter()
        .map(|character| Character {
            name: character.name.clone(),
            id: None,
            sprites: character
                .sprites
                .iter()
                .map(|sprite| {
                    let mut copy = sprite.clone();
                    copy.url = resolver.resolve(&copy.url);
                    copy.id = None;
                    copy
                })
                .collect(),
        })
        .collect();
    let json = serde_json::to_string(&resolved).expect("a roster always serializes");
    global_block(DEFINE_CHARACTERS, &json)
}

fn global_block(call: &str, payload: &str) -> String {
    let quoted = serde_json::to_string(payload).expect("a string always serializes");
    format!("```lua global\n{call}({quoted})\n```")
}
