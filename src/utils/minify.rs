//! HTML minification.
//!
//! Provides a `minify` function that is enabled or disabled by `[render] minify`.

use crate::config::RenderConfig;
use std::borrow::Cow;

/// Minify rendered HTML based on config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify<'a>(html: &'a str, config: &RenderConfig) -> Cow<'a, str> {
    if !config.minify {
        return Cow::Borrowed(html);
    }
    let minified = minify_html_inner(html.as_bytes());
    // minify-html only removes bytes between tokens, so UTF-8 survives
    Cow::Owned(String::from_utf8_lossy(&minified).into_owned())
}

/// Minify an HTML fragment using `minify_html` crate.
///
/// Comments are kept: the overview index looks for
/// `<!--summary-start-->` / `<!--summary-end-->` markers in built content.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_comments = true;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}
