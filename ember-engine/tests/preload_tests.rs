use ember_engine::preload::{AssetLoader, AssetState, FsAssetLoader, preload};
use ember_script::story::{Character, CharacterSprite};

struct StubLoader;

impl AssetLoader for StubLoader {
    fn load(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        if url.contains("missing") {
            anyhow::bail!("404 for {url}");
        }
        Ok(url.as_bytes().to_vec())
    }
}

fn sprite(name: &str, url: &str) -> CharacterSprite {
    CharacterSprite {
        name: name.to_string(),
        url: url.to_string(),
        center: (0.0, 0.0),
        scale: 1.0,
        id: None,
    }
}

fn roster(sprites: Vec<CharacterSprite>) -> Vec<Character> {
    vec![Character {
        name: "Ann".to_string(),
        sprites,
        id: None,
    }]
}

#[test]
fn one_bad_url_never_aborts_the_batch() {
    let characters = roster(vec![
        sprite("ok", "ok.png"),
        sprite("bad", "missing.png"),
    ]);
    let cache = preload(&characters, &[], &StubLoader);

    assert_eq!(cache.len(), 2);
    assert!(!cache.get("Ann/ok").unwrap().is_failed());
    assert!(cache.get("Ann/bad").unwrap().is_failed());
}

#[test]
fn empty_addresses_are_absent_not_failed() {
    let characters = roster(vec![sprite("blank", "")]);
    let cache = preload(&characters, &[], &StubLoader);

    let entry = cache.get("Ann/blank").unwrap();
    assert_eq!(entry.state, AssetState::Absent);
    assert!(!entry.is_failed());
}

#[test]
fn manifest_entries_are_keyed_by_their_url() {
    let urls = vec!["file://bg/a.png".to_string(), "missing.ogg".to_string()];
    let cache = preload(&[], &urls, &StubLoader);

    assert_eq!(cache.len(), 2);
    let entry = cache.get("file://bg/a.png").unwrap();
    assert!(entry.sprite.is_none());
    assert!(!entry.is_failed());
    assert!(cache.get("missing.ogg").unwrap().is_failed());
}

#[test]
fn roster_entries_keep_their_sprite_metadata() {
    let characters = roster(vec![sprite("smile", "s.png")]);
    let cache = preload(&characters, &[], &StubLoader);

    let entry = cache.get("Ann/smile").unwrap();
    assert_eq!(entry.sprite.as_ref().unwrap().name, "smile");
    assert_eq!(entry.url, "s.png");
}

#[test]
fn a_large_batch_settles_completely() {
    // more jobs than workers, to exercise the pool
    let sprites: Vec<CharacterSprite> = (0..100)
        .map(|i| {
            let url = if i % 7 == 0 {
                format!("missing-{i}.png")
            } else {
                format!("asset-{i}.png")
            };
            sprite(&format!("s{i}"), &url)
        })
        .collect();
    let characters = roster(sprites);
    let cache = preload(&characters, &[], &StubLoader);

    assert_eq!(cache.len(), 100);
    let failed = cache.values().filter(|a| a.is_failed()).count();
    assert_eq!(failed, 15);
}

#[test]
fn repeated_preloads_rebuild_the_cache_from_scratch() {
    let first = preload(&roster(vec![sprite("old", "old.png")]), &[], &StubLoader);
    assert!(first.contains_key("Ann/old"));

    let second = preload(&roster(vec![sprite("new", "new.png")]), &[], &StubLoader);
    assert!(second.contains_key("Ann/new"));
    assert!(!second.contains_key("Ann/old"));
}

#[test]
fn fs_loader_reads_local_files() {
    let dir = std::env::temp_dir().join("ember-preload-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("asset.bin");
    std::fs::write(&path, b"pixels").unwrap();

    let direct = FsAssetLoader.load(path.to_str().unwrap()).unwrap();
    assert_eq!(direct, b"pixels");

    let via_url = FsAssetLoader
        .load(&format!("file://{}", path.to_str().unwrap()))
        .unwrap();
    assert_eq!(via_url, b"pixels");

    assert!(FsAssetLoader.load("file://does/not/exist").is_err());
}

#[test]
fn duplicate_manifest_urls_collapse_to_one_entry() {
    let urls = vec!["dup.png".to_string(), "dup.png".to_string()];
    let cache = preload(&[], &urls, &StubLoader);
    assert_eq!(cache.len(), 1);
}
