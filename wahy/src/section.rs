use std::fmt;

use tracing::debug;

use crate::source::{SourceLine, source_lines};

/// The language a section of source is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Html,
    Css,
    JavaScript,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Html => "HTML",
            Target::Css => "CSS",
            Target::JavaScript => "JavaScript",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A contiguous run of source lines earmarked for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSection {
    pub target: Target,
    /// Lines keep their numbers and spans from the full document.
    pub lines: Vec<SourceLine>,
}

impl SourceSection {
    pub fn body(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

enum Marker {
    Start(Target),
    End,
}

const HTML_START: &[&str] = &["ابدأ_HTML", "بداية_HTML", "<!-- HTML -->", "start_html"];
const HTML_END: &[&str] = &["أنهِ_HTML", "نهاية_HTML", "end_html"];
const CSS_START: &[&str] = &["ابدأ_CSS", "بداية_CSS", "/* CSS */", "start_css"];
const CSS_END: &[&str] = &["أنهِ_CSS", "نهاية_CSS", "end_css"];
const JS_START: &[&str] = &[
    "ابدأ_JS",
    "بداية_JS",
    "ابدأ_JavaScript",
    "// JavaScript",
    "start_js",
];
const JS_END: &[&str] = &["أنهِ_JS", "نهاية_JS", "أنهِ_JavaScript", "end_js"];

fn marker(line: &str) -> Option<Marker> {
    let line = line.trim();
    if HTML_START.contains(&line) {
        Some(Marker::Start(Target::Html))
    } else if CSS_START.contains(&line) {
        Some(Marker::Start(Target::Css))
    } else if JS_START.contains(&line) {
        Some(Marker::Start(Target::JavaScript))
    } else if HTML_END.contains(&line) || CSS_END.contains(&line) || JS_END.contains(&line) {
        Some(Marker::End)
    } else {
        None
    }
}

/// True when `line` is one of the section delimiter lines.
pub fn is_marker(line: &str) -> bool {
    marker(line).is_some()
}

/// Split a document into target sections.
///
/// Lines outside any delimited block belong to HTML. A start marker flushes
/// the lines gathered so far and switches target; an end marker flushes and
/// reverts to HTML. Marker lines are dropped. Runs of blank lines do not
/// produce sections.
pub fn split_sections(source: &str) -> Vec<SourceSection> {
    let mut sections = Vec::new();
    let mut target = Target::Html;
    let mut buffer: Vec<SourceLine> = Vec::new();

    for line in source_lines(source) {
        match marker(&line.text) {
            Some(Marker::Start(next)) => {
                flush(&mut sections, target, &mut buffer);
                target = next;
            }
            Some(Marker::End) => {
                flush(&mut sections, target, &mut buffer);
                target = Target::Html;
            }
            None => buffer.push(line),
        }
    }
    flush(&mut sections, target, &mut buffer);

    sections
}

fn flush(sections: &mut Vec<SourceSection>, target: Target, buffer: &mut Vec<SourceLine>) {
    let lines = std::mem::take(buffer);
    if lines.iter().all(|l| l.text.trim().is_empty()) {
        return;
    }
    debug!(
        section = %target,
        first_line = lines[0].number,
        count = lines.len(),
        "flushing source section"
    );
    sections.push(SourceSection { target, lines });
}
