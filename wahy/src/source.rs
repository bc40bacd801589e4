use std::ops::Range;

/// One physical line of Wahy source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original document.
    pub number: usize,
    /// Line text without its terminator.
    pub text: String,
    /// Byte range of `text` in the original document.
    pub span: Range<usize>,
}

/// Split a document into numbered lines, keeping byte spans for diagnostics.
/// Both `\n` and `\r\n` terminators are accepted.
pub fn source_lines(source: &str) -> Vec<SourceLine> {
    let mut offset = 0;
    source
        .split('\n')
        .enumerate()
        .map(|(index, raw)| {
            let start = offset;
            offset += raw.len() + 1;
            let text = raw.strip_suffix('\r').unwrap_or(raw);
            SourceLine {
                number: index + 1,
                text: text.to_string(),
                span: start..start + text.len(),
            }
        })
        .collect()
}
