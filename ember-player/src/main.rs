mod config;

use std::io::{self, BufRead, Write};
use std::{env, fs};

use anyhow::{Context, Result, bail};
use ember_engine::{MediaLibrary, StoryDriver, StoryUnit, compile};
use ember_script::encode::{Passthrough, encode};
use ember_script::story::Story;

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .context("usage: ember-player <story.json | story.md>")?;
    let cfg = config::load("player.toml");

    log::info!("loading story from {}", path);
    let raw = fs::read_to_string(&path).with_context(|| format!("cannot read {path}"))?;

    let text = if path.ends_with(".json") {
        let story: Story = serde_json::from_str(&raw).context("story json is malformed")?;
        story.seed_ids();
        match MediaLibrary::open(&cfg.assets) {
            Ok(library) => encode(&story, &library),
            Err(e) => {
                log::warn!("no media library ({e}), keeping raw addresses");
                encode(&story, &Passthrough)
            }
        }
    } else {
        raw
    };

    let chunk = compile(&text)?;
    log::debug!("compiled chunk {}: {} bytes", chunk.name, chunk.source.len());

    let mut driver = StoryDriver::new();
    driver.reload_with(&chunk, cfg.preload)?;

    run(&mut driver)
}

fn run(driver: &mut StoryDriver) -> Result<()> {
    let stdin = io::stdin();
    let mut choice: Option<usize> = None;

    loop {
        let Some(unit) = driver.next(choice)? else {
            println!("~ fin ~");
            return Ok(());
        };
        choice = None;

        if let Some(options) = &unit.options {
            for option in options {
                println!("  [{}] {}", option.key, option.option);
            }
            choice = Some(prompt(&stdin, options.len())?);
            continue;
        }

        render(&unit);
    }
}

fn render(unit: &StoryUnit) {
    let tags = &unit.tags;
    if let Some(background) = &tags.background {
        println!("-- scene: {} ({})", background, tags.style.as_deref().unwrap_or("cut"));
    }
    if let Some(audio) = &tags.audio {
        println!("-- audio: {audio}");
    }
    if let Some(se) = &tags.se {
        println!("-- se: {se}");
    }
    if let Some(text) = &unit.text {
        match tags.narrator.as_deref() {
            Some(narrator) if !narrator.is_empty() => println!("{narrator}: {text}"),
            _ => println!("{text}"),
        }
    }
}

fn prompt(stdin: &io::Stdin, count: usize) -> Result<usize> {
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        if line.is_empty() {
            bail!("stdin closed while a choice was pending");
        }
        match line.trim().parse::<usize>() {
            Ok(index) if index < count => return Ok(index),
            _ => println!("pick 0..{}", count - 1),
        }
    }
}
