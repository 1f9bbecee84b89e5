//! Tokenizer for the `:name[content]` tag grammar.
//!
//! Both the Decoder and the compiler bridge consume the same grammar: a run
//! of tags at the head of a line, terminated by free text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:(\w+)\[([^\]]*)\] ?").unwrap());

/// One `:name[value]` directive taken from the head of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTag {
    pub name: String,
    pub value: String,
}

/// Splits the leading tag run off `line`.
///
/// Tags are consumed left to right while the sentinel matches; whatever is
/// left over is the line's literal content.
pub fn tokenize(line: &str) -> (Vec<RawTag>, &str) {
    let mut tags = Vec::new();
    let mut rest = line;
    while let Some(caps) = TAG_RE.captures(rest) {
        tags.push(RawTag {
            name: caps[1].to_string(),
            value: caps[2].to_string(),
        });
        rest = &rest[caps.get(0).expect("whole match").end()..];
    }
    (tags, rest)
}

/// Drops leading markup a markdown renderer may have wrapped a line in,
/// so the `:` sentinel check sees the tag itself.
pub fn strip_decoration(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '>', '#', '*', '_', '`', '-'])
}
