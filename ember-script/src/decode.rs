//! Tagged script document → [`Story`], the inverse of [`crate::encode`].

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;

use crate::encode::{DEFINE_CHARACTERS, PRELOAD_RESOURCES};
use crate::ids;
use crate::story::{Character, Line, SceneKind, SceneLine, Story, TextLine};
use crate::tags::{self, RawTag};

/// Decodes a document produced by [`crate::encode::encode`].
///
/// Returns `None` when the roster or manifest stanza is missing or
/// unreadable: the input simply is not a compiled script, which is a
/// recoverable condition, not an error. Decoded lines receive fresh ids.
pub fn decode(text: &str) -> Option<Story> {
    let characters: Vec<Character> = stanza_payload(text, DEFINE_CHARACTERS)?;
    // The manifest content is re-derivable from the scene segments; it is
    // only parsed here to reject documents with a corrupted stanza.
    let _manifest: Vec<String> = stanza_payload(text, PRELOAD_RESOURCES)?;

    // unnamed roster entries are authoring placeholders
    let characters = characters
        .into_iter()
        .filter(|c| !c.name.is_empty())
        .collect();

    let mut lines = Vec::new();
    for raw in text.lines() {
        let stripped = tags::strip_decoration(raw);
        if !stripped.starts_with(':') {
            continue;
        }
        lines.push(parse_line(stripped));
    }

    Some(Story { characters, lines })
}

/// Locates `marker` and double-unwraps its argument: the call argument is a
/// JSON string whose content is itself JSON.
fn stanza_payload<T: DeserializeOwned>(text: &str, marker: &str) -> Option<T> {
    let line = text
        .lines()
        .find(|line| line.trim_start().starts_with(marker))?;
    let open = line.find('(')? + 1;
    let close = line.rfind(')')?;
    let literal = line.get(open..close)?.trim();
    let payload: String = serde_json::from_str(literal).ok()?;
    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("rejecting script metadata at {marker}: {e}");
            None
        }
    }
}

fn parse_line(line: &str) -> Line {
    let (raw_tags, rest) = tags::tokenize(line);
    // Historical format rule: literal backslashes never survive decoding.
    let content = rest.replace('\\', "");

    let scene_tag = raw_tags
        .iter()
        .find_map(|tag| SceneKind::from_tag(&tag.name).map(|kind| (kind, tag)));
    if let Some((kind, tag)) = scene_tag {
        return Line::Scene(SceneLine {
            id: ids::next_id(),
            scene: kind,
            media: content,
            style: tag.value.clone(),
        });
    }

    Line::Text(TextLine {
        id: ids::next_id(),
        narrator: tag_value(&raw_tags, "narrator"),
        narrator_color: tag_value(&raw_tags, "color"),
        sprites: split_list(&tag_value(&raw_tags, "sprites")),
        remote: split_list(&tag_value(&raw_tags, "remote"))
            .into_iter()
            .collect::<BTreeSet<_>>(),
        text: content,
    })
}

fn tag_value(tags: &[RawTag], name: &str) -> String {
    tags.iter()
        .find(|tag| tag.name == name)
        .map(|tag| tag.value.clone())
        .unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
