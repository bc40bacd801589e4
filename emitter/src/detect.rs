use std::fmt;

use wahy::section::is_marker;
use wahy::{Target, source_lines, tokenize};

use crate::css::is_css_command;
use crate::html::is_html_command;
use crate::javascript::is_js_command;

/// Best guess at what a source file is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedTarget {
    Html,
    Css,
    JavaScript,
    /// Commands from more than one vocabulary, or explicit section markers.
    Mixed,
}

impl From<Target> for DetectedTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Html => DetectedTarget::Html,
            Target::Css => DetectedTarget::Css,
            Target::JavaScript => DetectedTarget::JavaScript,
        }
    }
}

impl fmt::Display for DetectedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedTarget::Html => f.write_str("html"),
            DetectedTarget::Css => f.write_str("css"),
            DetectedTarget::JavaScript => f.write_str("javascript"),
            DetectedTarget::Mixed => f.write_str("mixed"),
        }
    }
}

/// Score every line against the three command tables.
///
/// A key known to several vocabularies scores for each of them but never
/// makes the source `Mixed` on its own; that takes unambiguous lines from
/// two vocabularies. Ties go to the earlier of HTML, CSS, JavaScript.
pub fn detect_target(source: &str) -> DetectedTarget {
    let mut scores = [0usize; 3];
    let mut exclusive = [false; 3];

    for line in source_lines(source) {
        if is_marker(&line.text) {
            return DetectedTarget::Mixed;
        }
        let Some(command) = tokenize(&line.text) else {
            continue;
        };

        let hits = [
            is_html_command(&command.key),
            is_css_command(&command.key),
            is_js_command(&command.key),
        ];
        let matched = hits.iter().filter(|hit| **hit).count();
        for (index, hit) in hits.iter().enumerate() {
            if *hit {
                scores[index] += 1;
                if matched == 1 {
                    exclusive[index] = true;
                }
            }
        }
    }

    if exclusive.iter().filter(|e| **e).count() > 1 {
        return DetectedTarget::Mixed;
    }

    let targets = [Target::Html, Target::Css, Target::JavaScript];
    let best = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > 0)
        .max_by_key(|(index, score)| (**score, std::cmp::Reverse(*index)));

    match best {
        Some((index, _)) => targets[index].into(),
        None => DetectedTarget::Html,
    }
}
