use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

pub use codespan_reporting::diagnostic::Severity;

use crate::source::SourceLine;

/// An error or warning attached to one source line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub span: Range<usize>,
    pub severity: Severity,
    pub message: String,
}

impl LineDiagnostic {
    pub fn error(line: &SourceLine, message: impl Into<String>) -> Self {
        Self::at(line.number, line.span.clone(), Severity::Error, message)
    }

    pub fn warning(line: &SourceLine, message: impl Into<String>) -> Self {
        Self::at(line.number, line.span.clone(), Severity::Warning, message)
    }

    pub fn at(
        line: usize,
        span: Range<usize>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        LineDiagnostic {
            line,
            span,
            severity,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Re-tag this diagnostic as a warning (used when a non-structural
    /// section fails and must not block the composite document).
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(file_id, self.span.clone())])
    }
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
