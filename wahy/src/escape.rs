use std::fmt;

/// Text that has already been HTML-entity-escaped.
///
/// Only [`escape_html`] constructs this type, so a value can be escaped at
/// most once no matter how many emitter methods it is handed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped(String);

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `& < > " '` for embedding in HTML text or attribute values.
pub fn escape_html(text: &str) -> Escaped {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    Escaped(out)
}
