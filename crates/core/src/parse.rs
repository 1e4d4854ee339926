//! Parsing pipeline and text preprocessing hooks.

use std::borrow::Cow;

use crate::blocks::{RenderTree, assemble};
use crate::directives::extract;
use crate::error::Diagnostics;
use crate::html::{RenderOptions, render_html};

/// Trait for preprocessing raw content before extraction.
pub trait TextTransform: Send + Sync {
    /// Transform the input text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str> + Send + Sync,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Rewrite `\r\n` and lone `\r` line endings to `\n`.
///
/// Borrows the input unchanged when it has no carriage returns.
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    /// Source-ordered blocks.
    pub tree: RenderTree,
    /// Degraded constructs kept as literal text.
    pub diagnostics: Diagnostics,
}

/// Rendered HTML plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    /// Escaped HTML markup.
    pub html: String,
    /// Degraded constructs kept as literal text.
    pub diagnostics: Diagnostics,
}

/// Configurable parsing pipeline: text transforms, then extract → format → assemble.
pub struct Pipeline {
    text_transforms: Vec<Box<dyn TextTransform>>,
}

impl Pipeline {
    /// Pipeline with only the line-ending normalizer.
    pub fn new() -> Self {
        let mut pipeline = Self::bare();
        pipeline.add_text_transform(normalize_line_endings);
        pipeline
    }

    /// Pipeline without any text transform.
    pub fn bare() -> Self {
        Self {
            text_transforms: Vec::new(),
        }
    }

    /// Add a text preprocessor transform, run after the existing ones.
    pub fn add_text_transform<T: TextTransform + 'static>(&mut self, transform: T) {
        self.text_transforms.push(Box::new(transform));
    }

    /// Parse raw content into a [`RenderTree`].
    ///
    /// Never fails: unrecognized markup degrades to literal text and is
    /// reported in [`ParseOutput::diagnostics`].
    pub fn parse(&self, input: &str) -> ParseOutput {
        let mut current = Cow::Borrowed(input);
        for transform in &self.text_transforms {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }

        let extraction = extract(&current);
        let tree = assemble(&extraction.segments);
        ParseOutput {
            tree,
            diagnostics: extraction.diagnostics,
        }
    }

    /// Parse and serialize to HTML in one call.
    pub fn render(&self, input: &str, options: &RenderOptions) -> RenderOutput {
        let ParseOutput { tree, diagnostics } = self.parse(input);
        RenderOutput {
            html: render_html(&tree, options),
            diagnostics,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the default pipeline.
pub fn parse(input: &str) -> ParseOutput {
    Pipeline::new().parse(input)
}

/// Parse and render with the default pipeline.
pub fn render(input: &str, options: &RenderOptions) -> RenderOutput {
    Pipeline::new().render(input, options)
}
