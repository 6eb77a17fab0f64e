//! Markdown to minified HTML.

use crate::config::RenderConfig;
use crate::utils::minify::minify;
use pulldown_cmark::{Options, Parser, html};

/// Render a markdown body to HTML, minified when `[render] minify` is set.
///
/// Raw HTML in the markdown (including `<!--summary-start-->` markers) is
/// passed through untouched.
pub fn render(markdown: &str, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options(config)));
    minify(&out, config).into_owned()
}

fn options(config: &RenderConfig) -> Options {
    let mut options = Options::empty();
    options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
    options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
    options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
    options.set(Options::ENABLE_TABLES, config.tables);
    options.set(Options::ENABLE_TASKLISTS, config.tasklists);
    options
}
