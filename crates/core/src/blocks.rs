//! Block assembly.
//!
//! Turns the extractor's segment stream into a flat, source-ordered
//! [`RenderTree`]. Embeds always become their own block, so they are split out
//! before text is cut on blank lines. Inside a text unit, quote and list lines
//! become standalone blocks and the remaining lines are grouped into
//! paragraphs; nothing block-level ever ends up inside a paragraph.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::directives::{Directive, Segment};
use crate::inline::{Inline, LineKind, classify_line, format_inline, inlines_to_markup};

/// A line break, optional spaces/tabs, and another line break.
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern is valid"));

/// One structural unit of rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Prose.
    Paragraph {
        /// Formatted content.
        content: Vec<Inline>,
    },
    /// A `> ` line.
    Quote {
        /// Formatted content.
        content: Vec<Inline>,
    },
    /// A `- ` line.
    ListItem {
        /// Formatted content.
        content: Vec<Inline>,
    },
    /// An embed placeholder.
    Embed {
        /// The validated directive.
        directive: Directive,
    },
}

impl Block {
    /// Inline content for text blocks, `None` for embeds.
    pub fn content(&self) -> Option<&[Inline]> {
        match self {
            Block::Paragraph { content } | Block::Quote { content } | Block::ListItem { content } => {
                Some(content)
            }
            Block::Embed { .. } => None,
        }
    }

    /// Serialize this block back into author markup.
    pub fn to_markup(&self) -> String {
        match self {
            Block::Paragraph { content } => inlines_to_markup(content),
            Block::Quote { content } => format!("> {}", inlines_to_markup(content)),
            Block::ListItem { content } => format!("- {}", inlines_to_markup(content)),
            Block::Embed { directive } => directive.to_markup(),
        }
    }
}

/// Ordered block list produced by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderTree {
    blocks: Vec<Block>,
}

impl RenderTree {
    /// Wrap an already assembled block list.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Blocks in source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the input produced no content.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consume the tree, returning its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Serialize the tree back into author markup.
    ///
    /// Re-parsing the result yields an identical tree. Embeds keep their
    /// original URL; blocks are separated by blank lines, except that
    /// consecutive list items and quotes stay on adjacent lines.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&Block> = None;
        for block in &self.blocks {
            if let Some(prev) = prev {
                let same_line_run = matches!(
                    (prev, block),
                    (Block::ListItem { .. }, Block::ListItem { .. })
                        | (Block::Quote { .. }, Block::Quote { .. })
                );
                out.push_str(if same_line_run { "\n" } else { "\n\n" });
            }
            out.push_str(&block.to_markup());
            prev = Some(block);
        }
        out
    }
}

impl<'a> IntoIterator for &'a RenderTree {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Assemble extracted segments into a [`RenderTree`].
///
/// Expects `\n` line endings; the pipeline normalizes them first.
pub fn assemble(segments: &[Segment<'_>]) -> RenderTree {
    let mut blocks = Vec::new();
    for segment in segments {
        match segment {
            Segment::Embed(directive) => blocks.push(Block::Embed {
                directive: directive.clone(),
            }),
            Segment::Text(text) => {
                for unit in BLANK_LINE.split(text) {
                    assemble_unit(unit, &mut blocks);
                }
            }
        }
    }
    log::trace!("Assembled {} blocks", blocks.len());
    RenderTree::new(blocks)
}

fn assemble_unit(unit: &str, blocks: &mut Vec<Block>) {
    let mut paragraph: Vec<&str> = Vec::new();
    for line in unit.split('\n') {
        match classify_line(line) {
            LineKind::Plain(text) => paragraph.push(text),
            LineKind::Quote(text) => {
                flush_paragraph(&mut paragraph, blocks);
                blocks.push(Block::Quote {
                    content: format_inline(text),
                });
            }
            LineKind::ListItem(text) => {
                flush_paragraph(&mut paragraph, blocks);
                blocks.push(Block::ListItem {
                    content: format_inline(text),
                });
            }
        }
    }
    flush_paragraph(&mut paragraph, blocks);
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join("\n");
    lines.clear();
    let text = joined.trim();
    if text.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph {
        content: format_inline(text),
    });
}
