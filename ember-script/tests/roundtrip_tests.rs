use std::collections::BTreeSet;

use ember_script::decode::decode;
use ember_script::encode::{Passthrough, encode};
use ember_script::ids;
use ember_script::story::{
    Character, CharacterSprite, Line, SceneKind, SceneLine, Story, TextLine,
};

fn sprite(name: &str, url: &str) -> CharacterSprite {
    CharacterSprite {
        name: name.to_string(),
        url: url.to_string(),
        center: (120.0, 340.0),
        scale: 0.8,
        id: None,
    }
}

fn text_line(narrator: &str, color: &str, text: &str, sprites: &[&str]) -> Line {
    Line::Text(TextLine {
        id: ids::next_id(),
        narrator: narrator.to_string(),
        narrator_color: color.to_string(),
        text: text.to_string(),
        sprites: sprites.iter().map(|s| s.to_string()).collect(),
        remote: BTreeSet::new(),
    })
}

fn scene_line(kind: SceneKind, media: &str, style: &str) -> Line {
    Line::Scene(SceneLine {
        id: ids::next_id(),
        scene: kind,
        media: media.to_string(),
        style: style.to_string(),
    })
}

fn sample_story() -> Story {
    let mut ann = Character {
        name: "Ann".to_string(),
        sprites: vec![
            sprite("smile", "sprite:ann-smile"),
            sprite("frown", "https://cdn.example.com/ann-frown.png"),
        ],
        id: None,
    };
    // ephemeral authoring id, must not survive encoding
    ann.sprites[0].id = Some("17".to_string());

    Story {
        characters: vec![ann],
        lines: vec![
            scene_line(SceneKind::Background, "background:classroom", "fade"),
            text_line("Ann", "#ffaa00", "Morning already?", &["Ann/smile"]),
            text_line("", "", "The bell rings.", &[]),
            scene_line(SceneKind::Audio, "audio:bell", ""),
        ],
    }
}

/// Strips the fields the transcoder is allowed to lose: line ids are
/// regenerated and sprite ids are ephemeral.
fn normalized(story: &Story) -> Story {
    let mut copy = story.clone();
    for character in &mut copy.characters {
        character.id = None;
        for sprite in &mut character.sprites {
            sprite.id = None;
        }
    }
    for line in &mut copy.lines {
        match line {
            Line::Text(t) => t.id = String::new(),
            Line::Scene(s) => s.id = String::new(),
        }
    }
    copy
}

#[test]
fn encode_then_decode_reproduces_the_story() {
    let story = sample_story();
    let decoded = decode(&encode(&story, &Passthrough)).expect("own output must decode");
    assert_eq!(normalized(&decoded), normalized(&story));
}

#[test]
fn decoded_lines_get_fresh_increasing_ids() {
    let story = sample_story();
    let decoded = decode(&encode(&story, &Passthrough)).unwrap();
    let ids: Vec<u64> = decoded
        .lines
        .iter()
        .map(|line| line.id().parse().expect("generated ids are numeric"))
        .collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn scene_lines_survive_the_round_trip_intact() {
    let story = Story {
        characters: vec![],
        lines: vec![scene_line(SceneKind::Background, "bg:sunset", "fade")],
    };
    let decoded = decode(&encode(&story, &Passthrough)).unwrap();
    match &decoded.lines[0] {
        Line::Scene(scene) => {
            assert_eq!(scene.scene, SceneKind::Background);
            assert_eq!(scene.style, "fade");
            assert_eq!(scene.media, "bg:sunset");
        }
        other => panic!("expected a scene line, got {other:?}"),
    }
}

#[test]
fn backslashes_in_text_are_lost() {
    // Known lossy transform: the Encoder never escapes, the Decoder strips.
    let story = Story {
        characters: vec![],
        lines: vec![text_line("Ann", "#fff", r"a\b and c:\d", &[])],
    };
    let decoded = decode(&encode(&story, &Passthrough)).unwrap();
    match &decoded.lines[0] {
        Line::Text(t) => assert_eq!(t.text, "ab and c:d"),
        other => panic!("expected a text line, got {other:?}"),
    }
}

#[test]
fn manifest_lists_scene_urls_in_order_with_duplicates() {
    let story = Story {
        characters: vec![],
        lines: vec![
            scene_line(SceneKind::Background, "bg:a", ""),
            scene_line(SceneKind::Audio, "audio:theme", ""),
            scene_line(SceneKind::Background, "bg:a", ""),
        ],
    };
    let text = encode(&story, &Passthrough);
    let payload = r#"["bg:a","audio:theme","bg:a"]"#;
    let expected = serde_json::to_string(payload).unwrap();
    assert!(
        text.contains(&format!("story.preloadResources({expected})")),
        "manifest stanza missing from:\n{text}"
    );
}

#[test]
fn roster_stanza_strips_ephemeral_ids() {
    let story = sample_story();
    let text = encode(&story, &Passthrough);
    assert!(!text.contains("\"id\""), "ids leaked into:\n{text}");
}

#[test]
fn empty_sprite_and_remote_lists_are_omitted() {
    let story = Story {
        characters: vec![],
        lines: vec![text_line("Ann", "#fff", "hi", &[])],
    };
    let text = encode(&story, &Passthrough);
    assert!(!text.contains(":sprites["));
    assert!(!text.contains(":remote["));
    assert!(text.contains(":narrator[Ann] :color[#fff] hi"));
}

#[test]
fn remote_tags_round_trip_as_a_set() {
    let story = Story {
        characters: vec![],
        lines: vec![Line::Text(TextLine {
            id: ids::next_id(),
            narrator: "Ann".to_string(),
            narrator_color: "#fff".to_string(),
            text: "signal".to_string(),
            sprites: vec![],
            remote: ["beta", "alpha"].iter().map(|s| s.to_string()).collect(),
        })],
    };
    let decoded = decode(&encode(&story, &Passthrough)).unwrap();
    match &decoded.lines[0] {
        Line::Text(t) => {
            let remote: Vec<&str> = t.remote.iter().map(String::as_str).collect();
            assert_eq!(remote, vec!["alpha", "beta"]);
        }
        other => panic!("expected a text line, got {other:?}"),
    }
}
