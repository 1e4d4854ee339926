//! Escaping HTML serializer.
//!
//! Every piece of author text goes through [`html_escape`] before any tag
//! produced by the formatter is written around it. Embeds only contribute
//! their validated external id, and even that is attribute-escaped.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::ContentError;
use crate::blocks::{Block, RenderTree};
use crate::directives::{Directive, Provider};
use crate::inline::Inline;

/// Default class applied to the root container.
pub const DEFAULT_ROOT_CLASS: &str = "article-content";

/// Screen the markup is rendered for.
///
/// Parsing is identical in every context; the value is only exposed to
/// stylesheets and scripts via `data-render-context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderContext {
    /// Live preview next to the editor.
    Editor,
    /// Pre-publish review screen.
    Review,
    /// Final public article page.
    #[default]
    Public,
}

impl RenderContext {
    /// Attribute value for `data-render-context`.
    pub fn as_str(self) -> &'static str {
        match self {
            RenderContext::Editor => "editor",
            RenderContext::Review => "review",
            RenderContext::Public => "public",
        }
    }
}

/// Display flags for [`render_html`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Rendering context.
    pub context: RenderContext,
    /// Wrap output in a root `<div>` carrying the class and context.
    #[serde(alias = "wrapRoot")]
    pub wrap_root: bool,
    /// Class for the root container.
    #[serde(alias = "rootClass")]
    pub root_class: String,
    /// Add `loading="lazy"` to embedded players.
    #[serde(alias = "lazyEmbeds")]
    pub lazy_embeds: bool,
}

impl RenderOptions {
    /// Options for the live editor preview.
    pub fn editor() -> Self {
        Self {
            context: RenderContext::Editor,
            ..Self::default()
        }
    }

    /// Options for the pre-publish review screen.
    pub fn review() -> Self {
        Self {
            context: RenderContext::Review,
            ..Self::default()
        }
    }

    /// Options for the public article page.
    pub fn public() -> Self {
        Self::default()
    }

    /// Decode options from a JSON object; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check caller-provided values.
    pub fn validate(&self) -> Result<(), ContentError> {
        let valid = self.root_class.split_whitespace().all(|class| {
            class
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });
        if valid {
            Ok(())
        } else {
            Err(ContentError::InvalidClassName(self.root_class.clone()))
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            context: RenderContext::Public,
            wrap_root: true,
            root_class: DEFAULT_ROOT_CLASS.to_string(),
            lazy_embeds: true,
        }
    }
}

/// Escape author text for element content and quoted attributes.
pub fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Serialize a [`RenderTree`] into HTML.
///
/// Consecutive list items share one `<ul>`.
pub fn render_html(tree: &RenderTree, options: &RenderOptions) -> String {
    let mut out = String::new();
    if options.wrap_root {
        write!(
            out,
            "<div class=\"{}\" data-render-context=\"{}\">",
            escape(options.root_class.trim()),
            options.context.as_str()
        )
        .ok();
    }

    let mut in_list = false;
    for block in tree {
        let is_item = matches!(block, Block::ListItem { .. });
        if in_list && !is_item {
            out.push_str("</ul>");
        } else if !in_list && is_item {
            out.push_str("<ul>");
        }
        in_list = is_item;

        match block {
            Block::Paragraph { content } => write_wrapped("p", content, &mut out),
            Block::Quote { content } => write_wrapped("blockquote", content, &mut out),
            Block::ListItem { content } => write_wrapped("li", content, &mut out),
            Block::Embed { directive } => write_embed(directive, options, &mut out),
        }
    }
    if in_list {
        out.push_str("</ul>");
    }

    if options.wrap_root {
        out.push_str("</div>");
    }
    out
}

fn write_wrapped(tag: &str, content: &[Inline], out: &mut String) {
    write!(out, "<{tag}>").ok();
    write_inlines(content, out);
    write!(out, "</{tag}>").ok();
}

fn write_inlines(content: &[Inline], out: &mut String) {
    for inline in content {
        match inline {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(&escape(text));
                out.push_str("</strong>");
            }
            Inline::Emphasis(text) => {
                out.push_str("<em>");
                out.push_str(&escape(text));
                out.push_str("</em>");
            }
        }
    }
}

fn write_embed(directive: &Directive, options: &RenderOptions, out: &mut String) {
    let id = escape(directive.external_id());
    let provider = directive.provider();
    let class = match provider {
        Provider::Video => "embed embed-video",
        Provider::SocialPost => "embed embed-social-post",
    };
    write!(
        out,
        "<div class=\"{class}\" data-provider=\"{}\" data-id=\"{id}\">",
        provider.service()
    )
    .ok();

    match provider {
        Provider::Video => {
            let loading = if options.lazy_embeds {
                " loading=\"lazy\""
            } else {
                ""
            };
            if let Some(src) = directive.embed_url() {
                write!(
                    out,
                    "<iframe src=\"{}\" title=\"YouTube video player\" \
                     allow=\"accelerometer; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
                     allowfullscreen{loading}></iframe>",
                    escape(&src)
                )
                .ok();
            }
        }
        Provider::SocialPost => {
            // Hydrated in place by the provider's widget script.
            let href = directive.canonical_url();
            let href = escape(&href);
            write!(
                out,
                "<blockquote class=\"twitter-tweet\"><a href=\"{href}\">{href}</a></blockquote>"
            )
            .ok();
        }
    }
    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> RenderOptions {
        RenderOptions {
            wrap_root: false,
            ..RenderOptions::default()
        }
    }

    fn para(inlines: Vec<Inline>) -> Block {
        Block::Paragraph { content: inlines }
    }

    #[test]
    fn text_is_escaped_before_tags_are_added() {
        let tree = RenderTree::new(vec![para(vec![
            Inline::Text("a < b & ".into()),
            Inline::Strong("<i>".into()),
        ])]);
        assert_eq!(
            render_html(&tree, &bare()),
            "<p>a &lt; b &amp; <strong>&lt;i&gt;</strong></p>"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let tree = RenderTree::new(vec![para(vec![Inline::Text("\"x\" 'y'".into())])]);
        let html = render_html(&tree, &bare());
        assert!(!html.contains('"'), "{html}");
        assert!(!html.contains('\''), "{html}");
    }

    #[test]
    fn adjacent_list_items_share_a_list() {
        let item = |t: &str| Block::ListItem {
            content: vec![Inline::Text(t.into())],
        };
        let tree = RenderTree::new(vec![
            item("a"),
            item("b"),
            para(vec![Inline::Text("mid".into())]),
            item("c"),
        ]);
        assert_eq!(
            render_html(&tree, &bare()),
            "<ul><li>a</li><li>b</li></ul><p>mid</p><ul><li>c</li></ul>"
        );
    }

    #[test]
    fn root_wrapper_carries_context() {
        let html = render_html(&RenderTree::default(), &RenderOptions::editor());
        assert_eq!(
            html,
            "<div class=\"article-content\" data-render-context=\"editor\"></div>"
        );
    }

    #[test]
    fn options_from_json_use_defaults() {
        let options = RenderOptions::from_json(r#"{"context":"review","lazyEmbeds":false}"#)
            .expect("valid options");
        assert_eq!(options.context, RenderContext::Review);
        assert!(!options.lazy_embeds);
        assert!(options.wrap_root);
        assert_eq!(options.root_class, DEFAULT_ROOT_CLASS);
    }

    #[test]
    fn options_reject_bad_class_names() {
        let err = RenderOptions::from_json(r#"{"root_class":"x\" onload=\"y"}"#).unwrap_err();
        assert!(matches!(err, ContentError::InvalidClassName(_)));
        let err = RenderOptions::from_json("{not json").unwrap_err();
        assert!(matches!(err, ContentError::InvalidOptions(_)));
    }

    #[test]
    fn multiple_root_classes_are_allowed() {
        let options = RenderOptions::from_json(r#"{"rootClass":"article body-2"}"#).unwrap();
        let html = render_html(&RenderTree::default(), &options);
        assert!(html.starts_with("<div class=\"article body-2\""));
    }
}
