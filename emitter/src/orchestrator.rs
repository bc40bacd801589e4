use tracing::{debug, info_span, warn};
use wahy::{SourceSection, Target, split_sections};

use crate::config::InterpreterConfig;
use crate::css::CssEmitter;
use crate::driver::run_emitter;
use crate::error::EmitError;
use crate::html::HtmlEmitter;
use crate::javascript::JsEmitter;
use crate::result::{CompositeResult, EmitterResult};

/// Heading of the document built when HTML produced no page of its own.
pub const FALLBACK_HEADING: &str = "مرحباً بك في لغة وحي";

/// Entry point: split a document into sections, run one emitter per target
/// and merge the outputs into a single page.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Interpreter { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn interpret(&self, source: &str) -> CompositeResult {
        let _span = info_span!("interpret", bytes = source.len()).entered();

        let limit = self.config.max_source_bytes;
        if limit > 0 && source.len() > limit {
            let error = EmitError::InputTooLarge {
                size: source.len(),
                limit,
            };
            warn!(%error, "source rejected");
            return CompositeResult::rejected(error.to_string());
        }

        let sections = split_sections(source);
        debug!(sections = sections.len(), "source split");

        let html = of_target(&sections, Target::Html)
            .map(|s| run_emitter(HtmlEmitter::new(&self.config), &s));
        let css = of_target(&sections, Target::Css).map(|s| run_emitter(CssEmitter::new(), &s));
        let javascript =
            of_target(&sections, Target::JavaScript).map(|s| run_emitter(JsEmitter::new(), &s));

        self.compose(html, css, javascript)
    }

    fn compose(
        &self,
        html: Option<EmitterResult>,
        css: Option<EmitterResult>,
        javascript: Option<EmitterResult>,
    ) -> CompositeResult {
        let css_out = css.as_ref().map(|r| r.output.as_str());
        let js_out = javascript.as_ref().map(|r| r.output.as_str());

        let combined = html
            .as_ref()
            .and_then(|r| merge(&r.output, css_out, js_out))
            .unwrap_or_else(|| self.fallback_document(css_out, js_out));

        let first_error = html.as_ref().and_then(|r| r.first_error()).cloned();
        let sections: Vec<EmitterResult> = [html, css, javascript].into_iter().flatten().collect();

        let mut result = CompositeResult {
            success: first_error.is_none(),
            html: None,
            css: None,
            javascript: None,
            combined_output: Some(combined),
            error: first_error.as_ref().map(|e| e.message.clone()),
            line_number: first_error.as_ref().map(|e| e.line),
            warnings: Vec::new(),
            sections,
        };

        result.warnings = result
            .warning_diagnostics()
            .into_iter()
            .map(|(target, diagnostic)| format!("[{}] {}", target, diagnostic))
            .collect();

        for section in &result.sections {
            let output = Some(section.output.clone());
            match section.target {
                Target::Html => result.html = output,
                Target::Css => result.css = output,
                Target::JavaScript => result.javascript = output,
            }
        }

        debug!(
            success = result.success,
            warnings = result.warnings.len(),
            "composite document assembled"
        );
        result
    }

    fn fallback_document(&self, css: Option<&str>, javascript: Option<&str>) -> String {
        let title = wahy::escape_html(&self.config.document_title);
        let mut lines = vec![
            "<!DOCTYPE html>".to_string(),
            "<html dir=\"rtl\" lang=\"ar\">".to_string(),
            "<head>".to_string(),
            "  <meta charset=\"UTF-8\">".to_string(),
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
                .to_string(),
            format!("  <title>{}</title>", title),
        ];
        if let Some(css) = css {
            lines.push(style_block(css));
        }
        lines.push("</head>".to_string());
        lines.push("<body>".to_string());
        lines.push(format!("  <h1>{}</h1>", FALLBACK_HEADING));
        if let Some(javascript) = javascript {
            lines.push(script_block(javascript));
        }
        lines.push("</body>".to_string());
        lines.push("</html>".to_string());
        lines.join("\n")
    }
}

/// Interpret `source` with the default configuration.
pub fn interpret(source: &str) -> CompositeResult {
    Interpreter::default().interpret(source)
}

fn of_target(sections: &[SourceSection], target: Target) -> Option<Vec<&SourceSection>> {
    let matching: Vec<&SourceSection> = sections.iter().filter(|s| s.target == target).collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching)
    }
}

fn style_block(css: &str) -> String {
    format!("  <style>\n{}\n  </style>", escape_end_tag(css, "style"))
}

fn script_block(javascript: &str) -> String {
    format!(
        "  <script>\n{}\n  </script>",
        escape_end_tag(javascript, "script")
    )
}

/// Rewrite every `</tag` (any case) inside raw element text as `<\/tag`,
/// so generated code can never close its own `<style>` or `<script>`.
fn escape_end_tag(text: &str, tag: &str) -> String {
    let needle = format!("</{}", tag);
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for (at, _) in lower.match_indices(&needle) {
        out.push_str(&text[copied..at]);
        out.push_str("<\\/");
        copied = at + 2;
    }
    out.push_str(&text[copied..]);
    out
}

/// Splice CSS before the first `</head>` and JavaScript before the first
/// `</body>`. Returns `None` when the page lacks either marker, or they are
/// out of order.
pub fn merge(html: &str, css: Option<&str>, javascript: Option<&str>) -> Option<String> {
    let head_end = html.find("</head>")?;
    let body_end = html.find("</body>")?;
    if head_end > body_end {
        return None;
    }

    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..head_end]);
    if let Some(css) = css {
        out.push_str(&style_block(css));
        out.push('\n');
    }
    out.push_str(&html[head_end..body_end]);
    if let Some(javascript) = javascript {
        out.push_str(&script_block(javascript));
        out.push('\n');
    }
    out.push_str(&html[body_end..]);
    Some(out)
}
