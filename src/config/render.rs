//! `[render]` section configuration.
//!
//! Controls markdown extensions and HTML minification for the build stage.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[render]` section in folio.toml.
///
/// # Example
/// ```toml
/// [render]
/// minify = true
/// smart_punctuation = false
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Minify rendered HTML.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Curly quotes, en/em dashes and ellipses.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub smart_punctuation: bool,

    /// GitHub-style tables.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub tables: bool,

    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub footnotes: bool,

    /// `~~strikethrough~~`
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub strikethrough: bool,

    /// `- [x] done` list items.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub tasklists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let render = RenderConfig::default();
        assert!(render.minify);
        assert!(render.smart_punctuation);
        assert!(render.tables);
        assert!(render.footnotes);
        assert!(render.strikethrough);
        assert!(render.tasklists);
    }

    #[test]
    fn test_render_partial_override() {
        let render: RenderConfig = toml::from_str("minify = false").unwrap();
        assert!(!render.minify);
        assert!(render.tables);
    }
}
