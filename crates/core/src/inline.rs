//! Inline formatting and line-level rules.
//!
//! Line rules decide a line's block type (`> ` quote, `- ` list item) and run
//! before any inline rule, so emphasis markers can never disturb them.
//! Inline rules then turn `**bold**` and `*italic*` into typed spans. Both
//! patterns are confined to a single line and matched by a linear-time
//! engine, so unbalanced or deeply repeated asterisks cost O(n).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").expect("strong pattern is valid"));

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("emphasis pattern is valid"));

/// A formatted run of text inside a block.
///
/// Content is stored unescaped; escaping belongs to the HTML serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "camelCase")]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// `**bold**` content.
    Strong(String),
    /// `*italic*` content.
    Emphasis(String),
}

impl Inline {
    /// Raw text without formatting markers.
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(text) | Inline::Strong(text) | Inline::Emphasis(text) => text,
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(text) => {
                out.push_str("**");
                out.push_str(text);
                out.push_str("**");
            }
            Inline::Emphasis(text) => {
                out.push('*');
                out.push_str(text);
                out.push('*');
            }
        }
    }
}

/// Serialize inline spans back into author markup.
pub fn inlines_to_markup(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.write_markup(&mut out);
    }
    out
}

/// Block type implied by a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `> text` (first non-space character is `>` followed by a space).
    Quote(&'a str),
    /// `- text`, optionally indented.
    ListItem(&'a str),
    /// Anything else.
    Plain(&'a str),
}

/// Classify one line (without its line break).
///
/// # Examples
///
/// ```
/// use pressmark_core::inline::{LineKind, classify_line};
///
/// assert_eq!(classify_line("  > quoted"), LineKind::Quote("quoted"));
/// assert_eq!(classify_line("- item"), LineKind::ListItem("item"));
/// assert_eq!(classify_line(">no space"), LineKind::Plain(">no space"));
/// ```
pub fn classify_line(line: &str) -> LineKind<'_> {
    let body = line.trim_start_matches([' ', '\t']);
    if let Some(rest) = body.strip_prefix("> ") {
        LineKind::Quote(rest.trim())
    } else if let Some(rest) = body.strip_prefix("- ") {
        LineKind::ListItem(rest.trim())
    } else {
        LineKind::Plain(line)
    }
}

/// Apply bold then italic substitution to a run of plain text.
///
/// Unmatched markers stay literal. Bold content is not formatted further.
///
/// # Examples
///
/// ```
/// use pressmark_core::inline::{Inline, format_inline};
///
/// assert_eq!(
///     format_inline("a **b** *c*"),
///     vec![
///         Inline::Text("a ".into()),
///         Inline::Strong("b".into()),
///         Inline::Text(" ".into()),
///         Inline::Emphasis("c".into()),
///     ]
/// );
/// ```
pub fn format_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for caps in STRONG.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_emphasis(&text[cursor..whole.start()], &mut out);
        out.push(Inline::Strong(inner.as_str().to_string()));
        cursor = whole.end();
    }
    push_emphasis(&text[cursor..], &mut out);
    out
}

fn push_emphasis(text: &str, out: &mut Vec<Inline>) {
    let mut cursor = 0;
    for caps in EMPHASIS.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(&text[cursor..whole.start()], out);
        out.push(Inline::Emphasis(inner.as_str().to_string()));
        cursor = whole.end();
    }
    push_text(&text[cursor..], out);
}

fn push_text(text: &str, out: &mut Vec<Inline>) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}
