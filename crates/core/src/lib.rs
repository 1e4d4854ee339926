#![deny(missing_docs)]
//! Pressmark core: article markup parsing, block assembly, and safe HTML rendering.
//!
//! The same pipeline serves the editor preview, the pre-publish review, and
//! the public article page:
//!
//! ```
//! use pressmark_core::{RenderOptions, render};
//!
//! let out = render("**Breaking**\n\n- first\n- second", &RenderOptions::review());
//! assert!(out.html.contains("<p><strong>Breaking</strong></p>"));
//! assert!(out.html.contains("<ul><li>first</li><li>second</li></ul>"));
//! ```

/// Block assembly and the render tree.
pub mod blocks;
/// Embed directive extraction.
pub mod directives;
/// Error and diagnostic types.
pub mod error;
/// Escaping HTML serializer and render options.
pub mod html;
/// Inline formatting and line classification.
pub mod inline;
/// Parsing pipeline and text transforms.
pub mod parse;

pub use blocks::{Block, RenderTree, assemble};
pub use directives::{Directive, Extraction, Provider, Segment, extract};
pub use error::{ContentError, Diagnostic, DiagnosticKind, Diagnostics, SourceLocation};
pub use html::{DEFAULT_ROOT_CLASS, RenderContext, RenderOptions, escape, render_html};
pub use inline::{Inline, LineKind, classify_line, format_inline};
pub use parse::{
    ParseOutput, Pipeline, RenderOutput, TextTransform, normalize_line_endings, parse, render,
};
