//! Compiler bridge: tagged script text → executable Lua chunk.
//!
//! The document is lowered into a Lua source file of the fixed shape
//!
//! ```lua
//! -- metadata blocks (run at load, firing the host callbacks)
//! return coroutine.create(function()
//!     -- one yield per narrative unit
//! end)
//! ```
//!
//! and then handed to the embedded Lua compiler under the entry-point name.
//! Whatever diagnostic the compiler produces propagates verbatim.

use mlua::Lua;

use ember_script::story::SceneKind;
use ember_script::tags;

use crate::error::{EngineError, EngineResult};
use crate::lua_glue::SELECTION_SLOT;

/// Entry point name every chunk is compiled under.
pub const ENTRY_POINT: &str = "main";

/// Opaque executable artifact produced by [`compile`].
#[derive(Debug, Clone)]
pub struct Chunk {
    pub name: String,
    pub source: String,
}

/// Compiles a tagged script document into a [`Chunk`].
pub fn compile(text: &str) -> EngineResult<Chunk> {
    let source = lower(text);
    let lua = Lua::new();
    lua.load(&source)
        .set_name(ENTRY_POINT)
        .into_function()
        .map_err(|e| EngineError::Compile {
            message: e.to_string(),
        })?;
    Ok(Chunk {
        name: ENTRY_POINT.to_string(),
        source,
    })
}

/// Tag names that travel into the unit's tag bag unchanged.
const TEXT_TAGS: [&str; 6] = ["narrator", "color", "sprites", "remote", "classes", "style"];

struct Unit {
    text: Option<String>,
    tags: Vec<(String, String)>,
}

struct ChoiceArm {
    label: String,
    body: Vec<Unit>,
}

enum Block {
    /// Fenced `lua global` code, spliced before the coroutine (runs at load).
    Global(String),
    /// Fenced `lua` code, spliced into the story body where it appears.
    Inline(String),
    Unit(Unit),
    Choice(Vec<ChoiceArm>),
}

fn lower(text: &str) -> String {
    let mut prologue = String::new();
    let mut body = String::new();

    for block in scan(text) {
        match block {
            Block::Global(code) => prologue.push_str(&code),
            Block::Inline(code) => {
                for line in code.lines() {
                    body.push_str("  ");
                    body.push_str(line);
                    body.push('\n');
                }
            }
            Block::Unit(unit) => {
                body.push_str("  coroutine.yield(");
                body.push_str(&unit_table(&unit));
                body.push_str(")\n");
            }
            Block::Choice(arms) => body.push_str(&choice_block(&arms)),
        }
    }

    format!("{prologue}return coroutine.create(function()\n{body}end)\n")
}

fn scan(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_end();

        if trimmed.trim_start().starts_with("```") {
            let info = trimmed.trim_start().trim_start_matches('`').trim();
            let global = info == "lua global";
            let lua = info.starts_with("lua");
            let mut code = String::new();
            for inner in lines.by_ref() {
                if inner.trim_start().starts_with("```") {
                    break;
                }
                code.push_str(inner);
                code.push('\n');
            }
            if global {
                blocks.push(Block::Global(code));
            } else if lua {
                blocks.push(Block::Inline(code));
            }
            // any other fence is renderer decoration and compiles to nothing
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        if let Some(label) = trimmed.strip_prefix("- ") {
            blocks.push(Block::Choice(scan_choice(label, &mut lines)));
            continue;
        }

        blocks.push(Block::Unit(parse_unit(trimmed)));
    }

    blocks
}

/// Collects one dash-prefixed option list: every `- ` line opens an arm,
/// indented lines under it form the arm's body, and the first blank or
/// unindented line ends the list.
fn scan_choice<'a, I>(first_label: &str, lines: &mut std::iter::Peekable<I>) -> Vec<ChoiceArm>
where
    I: Iterator<Item = &'a str>,
{
    let mut arms = vec![ChoiceArm {
        label: first_label.trim().to_string(),
        body: Vec::new(),
    }];

    while let Some(&next) = lines.peek() {
        let trimmed = next.trim_end();
        if let Some(label) = trimmed.strip_prefix("- ") {
            arms.push(ChoiceArm {
                label: label.trim().to_string(),
                body: Vec::new(),
            });
            lines.next();
        } else if trimmed.starts_with("  ") && !trimmed.trim().is_empty() {
            let unit = parse_unit(trimmed.trim_start());
            arms.last_mut().expect("at least one arm").body.push(unit);
            lines.next();
        } else {
            break;
        }
    }

    arms
}

fn parse_unit(line: &str) -> Unit {
    let (raw_tags, rest) = tags::tokenize(line);
    let mut unit_tags: Vec<(String, String)> = Vec::new();
    let mut scene = false;

    for tag in &raw_tags {
        if SceneKind::from_tag(&tag.name).is_some() {
            scene = true;
            unit_tags.push((tag.name.clone(), rest.to_string()));
            if !tag.value.is_empty() {
                unit_tags.push(("style".to_string(), tag.value.clone()));
            }
        } else if TEXT_TAGS.contains(&tag.name.as_str()) {
            unit_tags.push((tag.name.clone(), tag.value.clone()));
        } else {
            log::debug!("dropping unknown tag :{}[..]", tag.name);
        }
    }

    Unit {
        text: if scene { None } else { Some(rest.to_string()) },
        tags: unit_tags,
    }
}

fn unit_table(unit: &Unit) -> String {
    let mut fields = Vec::new();
    if let Some(text) = &unit.text {
        fields.push(format!("text = {}", lua_str(text)));
    }
    if !unit.tags.is_empty() {
        let tags = unit
            .tags
            .iter()
            .map(|(name, value)| format!("{name} = {}", lua_str(value)))
            .collect::<Vec<_>>()
            .join(", ");
        fields.push(format!("tags = {{ {tags} }}"));
    }
    format!("{{ {} }}", fields.join(", "))
}

fn choice_block(arms: &[ChoiceArm]) -> String {
    let options = arms
        .iter()
        .enumerate()
        .map(|(key, arm)| format!("{{ option = {}, key = {key} }}", lua_str(&arm.label)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut block = String::new();
    block.push_str("  do\n");
    block.push_str("    local sel\n");
    block.push_str("    repeat\n");
    block.push_str(&format!(
        "      coroutine.yield({{ options = {{ {options} }} }})\n"
    ));
    block.push_str(&format!("      sel = {SELECTION_SLOT}\n"));
    block.push_str("    until sel ~= nil\n");
    for (key, arm) in arms.iter().enumerate() {
        let keyword = if key == 0 { "if" } else { "elseif" };
        block.push_str(&format!("    {keyword} sel == {key} then\n"));
        for unit in &arm.body {
            block.push_str("      coroutine.yield(");
            block.push_str(&unit_table(unit));
            block.push_str(")\n");
        }
    }
    block.push_str("    end\n");
    block.push_str("  end\n");
    block
}

/// Quotes `s` as a Lua string literal.
fn lua_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
