use serde::Serialize;
use wahy::{LineDiagnostic, Target};

/// Outcome of running one emitter over its sections.
#[derive(Debug, Clone)]
pub struct EmitterResult {
    pub target: Target,
    pub success: bool,
    /// Generated source. Always well formed, even after an error.
    pub output: String,
    pub errors: Vec<LineDiagnostic>,
    pub warnings: Vec<LineDiagnostic>,
}

impl EmitterResult {
    pub fn first_error(&self) -> Option<&LineDiagnostic> {
        self.errors.first()
    }
}

/// Final result of one `interpret()` call.
///
/// Serializes to the JSON shape served to the editor:
/// `{ success, html?, css?, javascript?, combinedOutput?, error?, lineNumber?, warnings? }`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_output: Option<String>,
    /// First fatal message, without its line prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Per-emitter detail, for callers that render their own diagnostics.
    #[serde(skip)]
    pub sections: Vec<EmitterResult>,
}

impl CompositeResult {
    /// A result for input rejected before any emitter ran.
    pub fn rejected(message: impl Into<String>) -> Self {
        CompositeResult {
            success: false,
            html: None,
            css: None,
            javascript: None,
            combined_output: None,
            error: Some(message.into()),
            line_number: None,
            warnings: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn section(&self, target: Target) -> Option<&EmitterResult> {
        self.sections.iter().find(|s| s.target == target)
    }

    /// Every diagnostic with the target it came from. CSS and JavaScript
    /// errors are reported as warnings because they never block the document.
    pub fn diagnostics(&self) -> Vec<(Target, LineDiagnostic)> {
        let mut out = Vec::new();
        for section in &self.sections {
            for error in &section.errors {
                let diagnostic = if section.target == Target::Html {
                    error.clone()
                } else {
                    error.clone().into_warning()
                };
                out.push((section.target, diagnostic));
            }
            for warning in &section.warnings {
                out.push((section.target, warning.clone()));
            }
        }
        out.sort_by_key(|(_, d)| d.line);
        out
    }

    pub fn warning_diagnostics(&self) -> Vec<(Target, LineDiagnostic)> {
        self.diagnostics()
            .into_iter()
            .filter(|(_, d)| d.is_warning())
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":{}}}",
                serde_json::Value::String(e.to_string())
            )
        })
    }
}
