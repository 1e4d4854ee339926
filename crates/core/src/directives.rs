//! Embed directive extraction.
//!
//! Authors reference external media with a fixed bracket syntax:
//!
//! ```text
//! [YOUTUBE]https://www.youtube.com/watch?v=abc123[/YOUTUBE]
//! [TWITTER]https://twitter.com/someone/status/1234567890[/TWITTER]
//! ```
//!
//! [`extract`] splits raw content into an interleaved stream of literal text
//! and validated [`Directive`]s. Anything that does not match a provider
//! pattern stays in the text stream untouched, so pasting a bare URL or a
//! half-typed tag never loses content.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Diagnostic, Diagnostics, LocationTracker};

/// Complete bracket span. The payload cannot contain brackets, so spans never
/// overlap and a stray opening tag is never swallowed by a later closer.
static DIRECTIVE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(YOUTUBE|TWITTER)\]([^\[\]]*)\[/([A-Z]+)\]")
        .expect("directive span pattern is valid")
});

static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(YOUTUBE|TWITTER)\]").expect("opening tag pattern is valid")
});

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^https?://(?:www\.|m\.)?youtube\.com/watch\?(?:[^\s"'<>]*?&)?v=([A-Za-z0-9_-]+)(?:[&#][^\s"'<>]*)?$"#,
    )
    .expect("video url pattern is valid")
});

static SOCIAL_POST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^https?://(?:www\.|mobile\.)?(?:twitter|x)\.com/[A-Za-z0-9_]+/status/([0-9]+)(?:[/?#][^\s"'<>]*)?$"#,
    )
    .expect("social post url pattern is valid")
});

/// Embed provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Video reference (`[YOUTUBE]…[/YOUTUBE]`).
    Video,
    /// Social post reference (`[TWITTER]…[/TWITTER]`).
    SocialPost,
}

impl Provider {
    /// Bracket tag name used in the stored markup.
    pub fn tag(self) -> &'static str {
        match self {
            Provider::Video => "YOUTUBE",
            Provider::SocialPost => "TWITTER",
        }
    }

    /// Look up a provider by its exact (case-sensitive) tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "YOUTUBE" => Some(Provider::Video),
            "TWITTER" => Some(Provider::SocialPost),
            _ => None,
        }
    }

    /// Service name emitted in `data-provider` attributes.
    pub fn service(self) -> &'static str {
        match self {
            Provider::Video => "youtube",
            Provider::SocialPost => "twitter",
        }
    }

    fn url_pattern(self) -> &'static Regex {
        match self {
            Provider::Video => &VIDEO_URL,
            Provider::SocialPost => &SOCIAL_POST_URL,
        }
    }
}

/// A validated embed reference.
///
/// Only [`Directive::parse`] builds one, so `external_id` always comes from a
/// successful provider pattern match and is limited to `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    provider: Provider,
    external_id: String,
    original_url: String,
}

impl Directive {
    /// Validate `url` against the provider pattern and capture its id.
    ///
    /// Surrounding whitespace is ignored. Returns `None` for anything that is
    /// not a recognized URL shape (shortened links, playlists, profiles...).
    pub fn parse(provider: Provider, url: &str) -> Option<Self> {
        let url = url.trim();
        let caps = provider.url_pattern().captures(url)?;
        let id = caps.get(1)?.as_str();
        Some(Self {
            provider,
            external_id: id.to_string(),
            original_url: url.to_string(),
        })
    }

    /// Provider family.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Provider-specific identifier (video id, numeric status id).
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// URL exactly as the author wrote it (trimmed).
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Canonical public URL rebuilt from the external id.
    pub fn canonical_url(&self) -> String {
        match self.provider {
            Provider::Video => format!("https://www.youtube.com/watch?v={}", self.external_id),
            Provider::SocialPost => format!("https://twitter.com/i/status/{}", self.external_id),
        }
    }

    /// URL for an embedded player frame (video only).
    pub fn embed_url(&self) -> Option<String> {
        match self.provider {
            Provider::Video => Some(format!(
                "https://www.youtube.com/embed/{}",
                self.external_id
            )),
            Provider::SocialPost => None,
        }
    }

    /// Serialize back into bracket markup using the original URL.
    pub fn to_markup(&self) -> String {
        let tag = self.provider.tag();
        format!("[{tag}]{}[/{tag}]", self.original_url)
    }
}

/// One item of the extractor's token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal author text, borrowed from the input.
    Text(&'a str),
    /// A recognized embed directive.
    Embed(Directive),
}

/// Result of [`extract`]: source-ordered segments plus degraded-directive diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction<'a> {
    /// Text and embed segments in source order. Adjacent text is merged.
    pub segments: Vec<Segment<'a>>,
    /// Malformed and unterminated directives that were kept as text.
    pub diagnostics: Diagnostics,
}

impl Extraction<'_> {
    /// Iterate over the extracted directives.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Embed(directive) => Some(directive),
            Segment::Text(_) => None,
        })
    }
}

/// Split raw content into literal text and validated embed directives.
///
/// Total over all inputs: malformed or unterminated directives are left as
/// text and reported through [`Extraction::diagnostics`].
pub fn extract(raw: &str) -> Extraction<'_> {
    let mut out = Extraction::default();
    let mut tracker = LocationTracker::new(raw);
    // Start of the literal run not yet flushed; degraded spans stay inside it.
    let mut text_start = 0usize;
    let mut cursor = 0usize;

    for caps in DIRECTIVE_SPAN.captures_iter(raw) {
        let Some(span) = caps.get(0) else { continue };
        report_unterminated(raw, cursor, span.start(), &mut tracker, &mut out.diagnostics);
        cursor = span.end();

        let open = &caps[1];
        let payload = &caps[2];
        let close = &caps[3];

        let directive = Provider::from_tag(open)
            .filter(|_| open == close)
            .and_then(|provider| Directive::parse(provider, payload));

        match directive {
            Some(directive) => {
                if text_start < span.start() {
                    out.segments.push(Segment::Text(&raw[text_start..span.start()]));
                }
                out.segments.push(Segment::Embed(directive));
                text_start = span.end();
            }
            None => {
                let location = tracker.locate(span.start());
                let message = if open != close {
                    format!("[{open}] closed by [/{close}]")
                } else {
                    format!("unsupported {open} url: {:?}", payload.trim())
                };
                log::debug!("Keeping directive as literal text at {location}: {message}");
                out.diagnostics.push(Diagnostic::malformed(message, location));
            }
        }
    }

    report_unterminated(raw, cursor, raw.len(), &mut tracker, &mut out.diagnostics);
    if text_start < raw.len() {
        out.segments.push(Segment::Text(&raw[text_start..]));
    }
    log::trace!(
        "Extracted {} segments ({} diagnostics)",
        out.segments.len(),
        out.diagnostics.len()
    );
    out
}

fn report_unterminated(
    raw: &str,
    start: usize,
    end: usize,
    tracker: &mut LocationTracker<'_>,
    diagnostics: &mut Diagnostics,
) {
    for tag in OPENING_TAG.find_iter(&raw[start..end]) {
        let location = tracker.locate(start + tag.start());
        let name = &tag.as_str()[1..tag.as_str().len() - 1];
        log::debug!("Unterminated [{name}] at {location}");
        diagnostics.push(Diagnostic::unterminated(
            format!("[{name}] has no matching [/{name}]"),
            location,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DiagnosticKind, SourceLocation};

    fn only_directive(input: &str) -> Directive {
        let out = extract(input);
        let found: Vec<_> = out.directives().cloned().collect();
        assert_eq!(found.len(), 1, "expected one directive in {input:?}");
        found.into_iter().next().unwrap()
    }

    #[test]
    fn plain_text_is_a_single_segment() {
        let input = "no embeds here, just [brackets] and https://example.com";
        let out = extract(input);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn empty_input_has_no_segments() {
        let out = extract("");
        assert!(out.segments.is_empty());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn video_id_is_captured() {
        let d = only_directive("[YOUTUBE]https://www.youtube.com/watch?v=abc123[/YOUTUBE]");
        assert_eq!(d.provider(), Provider::Video);
        assert_eq!(d.external_id(), "abc123");
        assert_eq!(d.original_url(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn video_id_param_may_follow_other_params() {
        let d = only_directive(
            "[YOUTUBE]https://youtube.com/watch?feature=share&v=A-b_9&t=42s[/YOUTUBE]",
        );
        assert_eq!(d.external_id(), "A-b_9");
    }

    #[test]
    fn payload_whitespace_is_trimmed() {
        let d = only_directive("[YOUTUBE]  https://m.youtube.com/watch?v=xyz \n[/YOUTUBE]");
        assert_eq!(d.external_id(), "xyz");
        assert_eq!(d.original_url(), "https://m.youtube.com/watch?v=xyz");
    }

    #[test]
    fn shortened_and_playlist_urls_stay_literal() {
        for input in [
            "[YOUTUBE]https://youtu.be/abc123[/YOUTUBE]",
            "[YOUTUBE]https://www.youtube.com/playlist?list=PL123[/YOUTUBE]",
            "[YOUTUBE]https://www.youtube.com/embed/abc123[/YOUTUBE]",
            "[YOUTUBE]https://www.youtube.com/watch?vv=abc123[/YOUTUBE]",
        ] {
            let out = extract(input);
            assert_eq!(out.segments, vec![Segment::Text(input)], "{input}");
            assert_eq!(
                out.diagnostics.count_of(DiagnosticKind::MalformedDirective),
                1
            );
        }
    }

    #[test]
    fn social_post_keeps_only_numeric_id() {
        let d = only_directive("[TWITTER]https://twitter.com/news_desk/status/1234567890[/TWITTER]");
        assert_eq!(d.provider(), Provider::SocialPost);
        assert_eq!(d.external_id(), "1234567890");
        assert!(!d.external_id().contains("news_desk"));
    }

    #[test]
    fn social_post_accepts_trailing_query() {
        let d = only_directive("[TWITTER]https://x.com/a/status/77?s=20[/TWITTER]");
        assert_eq!(d.external_id(), "77");
    }

    #[test]
    fn social_post_requires_digits() {
        let input = "[TWITTER]https://twitter.com/someone/status/abc[/TWITTER]";
        let out = extract(input);
        assert_eq!(out.directives().count(), 0);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
    }

    #[test]
    fn tag_names_are_case_sensitive() {
        let input = "[youtube]https://www.youtube.com/watch?v=abc[/youtube]";
        let out = extract(input);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn multiple_directives_keep_order() {
        let input = "intro [YOUTUBE]https://www.youtube.com/watch?v=one[/YOUTUBE] middle \
                     [TWITTER]https://twitter.com/a/status/2[/TWITTER] outro";
        let out = extract(input);
        assert_eq!(out.segments.len(), 5);
        assert_eq!(out.segments[0], Segment::Text("intro "));
        assert!(matches!(&out.segments[1], Segment::Embed(d) if d.external_id() == "one"));
        assert_eq!(out.segments[2], Segment::Text(" middle "));
        assert!(matches!(&out.segments[3], Segment::Embed(d) if d.external_id() == "2"));
        assert_eq!(out.segments[4], Segment::Text(" outro"));
    }

    #[test]
    fn malformed_payload_reports_location() {
        let out = extract("line one\n  [YOUTUBE]not a url[/YOUTUBE]");
        assert_eq!(
            out.segments,
            vec![Segment::Text("line one\n  [YOUTUBE]not a url[/YOUTUBE]")]
        );
        let diag = out.diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::MalformedDirective);
        assert_eq!(diag.location, SourceLocation::new(2, 3));
    }

    #[test]
    fn mismatched_closer_is_malformed() {
        let input = "[YOUTUBE]https://www.youtube.com/watch?v=abc[/TWITTER]";
        let out = extract(input);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
        let diag = out.diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::MalformedDirective);
        assert!(diag.message.contains("[/TWITTER]"));
    }

    #[test]
    fn unterminated_opening_is_literal() {
        let input = "watch [YOUTUBE]https://www.youtube.com/watch?v=abc";
        let out = extract(input);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
        let diag = out.diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::UnterminatedDirective);
        assert_eq!(diag.location, SourceLocation::new(1, 7));
    }

    #[test]
    fn opening_before_other_kind_is_not_partially_consumed() {
        let input = "[YOUTUBE]dangling [TWITTER]https://twitter.com/a/status/9[/TWITTER]";
        let out = extract(input);
        assert_eq!(out.segments.len(), 2);
        assert_eq!(out.segments[0], Segment::Text("[YOUTUBE]dangling "));
        assert!(matches!(&out.segments[1], Segment::Embed(d) if d.external_id() == "9"));
        assert_eq!(
            out.diagnostics.count_of(DiagnosticKind::UnterminatedDirective),
            1
        );
    }

    #[test]
    fn degraded_text_merges_with_neighbours() {
        let input = "a [YOUTUBE]nope[/YOUTUBE] b";
        let out = extract(input);
        assert_eq!(out.segments, vec![Segment::Text(input)]);
    }

    #[test]
    fn markup_round_trips_through_parse() {
        let d = only_directive("[TWITTER] https://twitter.com/a/status/5 [/TWITTER]");
        assert_eq!(d.to_markup(), "[TWITTER]https://twitter.com/a/status/5[/TWITTER]");
        assert_eq!(only_directive(&d.to_markup()), d);
    }

    #[test]
    fn long_runs_of_open_tags_are_handled() {
        let input = "[YOUTUBE]".repeat(20_000);
        let out = extract(&input);
        assert_eq!(out.segments, vec![Segment::Text(input.as_str())]);
        assert_eq!(out.diagnostics.len(), 20_000);
    }
}
