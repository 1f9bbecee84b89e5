//! Story data model shared by the authoring layer, the Encoder and the Decoder.
//!
//! A [`Story`] is a flat, ordered sequence of [`Line`]s plus the character
//! roster. The core never mutates a story it was handed: encoding and
//! decoding always produce fresh values.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids;

/// One sprite belonging to a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSprite {
    /// Addressing name, unique within the owning character.
    pub name: String,
    /// Media address: `"<type>:<name>"` for storage-backed assets, anything
    /// else is a literal url.
    pub url: String,
    /// Pixel anchor `[left, top]`.
    pub center: (f32, f32),
    pub scale: f32,
    /// Ephemeral identity label. Stamped by the runtime, stripped by the
    /// Encoder, never part of a compiled artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A character and its sprites. Display names need not be globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub sprites: Vec<CharacterSprite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Scene-change cue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Background,
    Audio,
    Se,
}

impl SceneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Background => "background",
            SceneKind::Audio => "audio",
            SceneKind::Se => "se",
        }
    }

    /// Maps a script tag name onto a scene kind.
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "background" => Some(SceneKind::Background),
            "audio" => Some(SceneKind::Audio),
            "se" => Some(SceneKind::Se),
            _ => None,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A narration line. `sprites` lists the roster addresses
/// (`"<character>/<sprite>"`) visible while the line is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    pub id: String,
    pub narrator: String,
    pub narrator_color: String,
    pub text: String,
    #[serde(default)]
    pub sprites: Vec<String>,
    #[serde(default)]
    pub remote: BTreeSet<String>,
}

/// A scene-change cue: background swap, music or sound effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLine {
    pub id: String,
    pub scene: SceneKind,
    pub media: String,
    pub style: String,
}

/// Closed union over every line variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Line {
    Text(TextLine),
    Scene(SceneLine),
}

impl Line {
    /// Stable authoring id of either variant.
    pub fn id(&self) -> &str {
        match self {
            Line::Text(t) => &t.id,
            Line::Scene(s) => &s.id,
        }
    }
}

/// A complete story: roster plus ordered lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub characters: Vec<Character>,
    pub lines: Vec<Line>,
}

impl Story {
    /// Raises the process-wide id counter above every numeric line id in
    /// this story, so ids generated afterwards never collide with loaded
    /// ones.
    pub fn seed_ids(&self) {
        for line in &self.lines {
            if let Ok(n) = line.id().parse::<u64>() {
                ids::observe(n);
            }
        }
    }
}
