use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use pressmark_core::{Diagnostics, Pipeline, RenderOptions, RenderTree};

// ============================================================================
// Options
// ============================================================================

/// Decodes render options passed from JavaScript.
///
/// `undefined`/`null` fall back to `defaults`; present fields override them
/// through `RenderOptions`' serde defaults, then get validated.
fn parse_options(options: JsValue, defaults: RenderOptions) -> Result<RenderOptions, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(defaults);
    }
    let options: RenderOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?;
    options
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(options)
}

// ============================================================================
// Render API
// ============================================================================

/// Result of rendering article markup.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    /// Escaped HTML, safe to attach to the document.
    pub html: String,
    /// Directives that were kept as literal text, with their positions.
    pub diagnostics: Diagnostics,
}

fn render_with(source: &str, options: &RenderOptions) -> Result<JsValue, JsError> {
    let output = Pipeline::new().render(source, options);
    if !output.diagnostics.is_empty() {
        log::debug!(
            "Rendered {} bytes with {} diagnostics",
            source.len(),
            output.diagnostics.len()
        );
    }
    let result = RenderResult {
        html: output.html,
        diagnostics: output.diagnostics,
    };
    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Renders article markup to HTML.
///
/// # Arguments
///
/// * `source` - Raw author text (draft or stored article body)
/// * `options` - Optional object: `{ context, wrapRoot, rootClass, lazyEmbeds }`
///
/// # Returns
///
/// `{ html, diagnostics }` where each diagnostic is
/// `{ kind, message, location: { line, column } }`.
///
/// # Example (JavaScript)
///
/// ```javascript
/// import { render } from './pressmark_wasm';
///
/// const { html } = render('**Breaking**\n\n- first', { context: 'review' });
/// // html = '<div class="article-content" data-render-context="review">' +
/// //        '<p><strong>Breaking</strong></p><ul><li>first</li></ul></div>'
/// ```
#[wasm_bindgen]
pub fn render(source: &str, options: JsValue) -> Result<JsValue, JsError> {
    let options = parse_options(options, RenderOptions::public())?;
    render_with(source, &options)
}

/// Renders for the live editor preview. Re-run on every edit.
#[wasm_bindgen(js_name = renderPreview)]
pub fn render_preview(source: &str) -> Result<JsValue, JsError> {
    render_with(source, &RenderOptions::editor())
}

/// Renders for the pre-publish review screen.
#[wasm_bindgen(js_name = renderReview)]
pub fn render_review(source: &str) -> Result<JsValue, JsError> {
    render_with(source, &RenderOptions::review())
}

/// Renders for the public article page.
#[wasm_bindgen(js_name = renderArticle)]
pub fn render_article(source: &str) -> Result<JsValue, JsError> {
    render_with(source, &RenderOptions::public())
}

// ============================================================================
// Block API
// ============================================================================

/// Result of parsing article markup into blocks.
#[derive(Debug, Clone, Serialize)]
pub struct BlocksResult {
    /// Source-ordered blocks.
    pub blocks: RenderTree,
    /// Directives that were kept as literal text.
    pub diagnostics: Diagnostics,
}

/// Parses article markup into typed blocks without producing HTML.
///
/// Each block is one of:
/// - `{type: "paragraph", content: [...]}`
/// - `{type: "quote", content: [...]}`
/// - `{type: "listItem", content: [...]}`
/// - `{type: "embed", directive: {provider, externalId, originalUrl}}`
///
/// Inline content items are `{type: "text" | "strong" | "emphasis", text}`.
#[wasm_bindgen(js_name = parse_blocks)]
pub fn parse_blocks(source: &str) -> Result<JsValue, JsError> {
    let output = Pipeline::new().parse(source);
    let result = BlocksResult {
        blocks: output.tree,
        diagnostics: output.diagnostics,
    };
    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
