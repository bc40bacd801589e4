use serde::Deserialize;

/// How the HTML emitter attaches its base stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetMode {
    /// A `<style id="wahy-base">` block inside the head (live preview).
    #[default]
    Inline,
    /// A `<link rel="stylesheet">` pointing at `stylesheet_href` (desktop export).
    External,
}

/// Interpreter settings. Every field has a default, so an empty TOML table
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub stylesheet: StylesheetMode,
    pub stylesheet_href: String,
    /// Title used when a content command opens the page implicitly.
    pub default_title: String,
    /// Title of the fallback document built when HTML produced no page.
    pub document_title: String,
    /// Reject sources larger than this many bytes. Zero disables the check.
    pub max_source_bytes: usize,
}

pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            stylesheet: StylesheetMode::Inline,
            stylesheet_href: "wahy.css".to_string(),
            default_title: "صفحة وحي".to_string(),
            document_title: "مشروع وحي".to_string(),
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}
