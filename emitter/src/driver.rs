use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};
use wahy::{LineDiagnostic, ParsedCommand, Severity, SourceSection, Target, tokenize};

use crate::error::EmitError;
use crate::result::EmitterResult;

/// Whether an emitter recognized a command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Unknown,
}

/// Warning sink scoped to the line currently being interpreted.
pub struct Warnings<'a> {
    line: usize,
    span: Range<usize>,
    sink: &'a mut Vec<LineDiagnostic>,
}

impl<'a> Warnings<'a> {
    pub fn new(line: usize, span: Range<usize>, sink: &'a mut Vec<LineDiagnostic>) -> Self {
        Warnings { line, span, sink }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(line = self.line, %message, "emitter warning");
        self.sink.push(LineDiagnostic::at(
            self.line,
            self.span.clone(),
            Severity::Warning,
            message,
        ));
    }
}

/// A stateful per-target translator from parsed commands to target lines.
pub trait Emitter {
    fn target(&self) -> Target;

    /// Interpret one command. Structural errors abort the rest of the run.
    fn execute(
        &mut self,
        command: &ParsedCommand,
        warnings: &mut Warnings<'_>,
    ) -> Result<Dispatch, EmitError>;

    /// Close whatever is still open and return the generated source.
    fn finish(&mut self, warnings: &mut Warnings<'_>) -> String;
}

/// Feed every line of `sections` through `emitter`, in order.
///
/// Unknown keys produce one warning each and are skipped. The first error
/// stops interpretation; the emitter is still finished so the partial
/// output stays well formed. A panic inside the emitter is reported as
/// [`EmitError::Internal`] on the line that caused it.
pub fn run_emitter<E: Emitter>(mut emitter: E, sections: &[&SourceSection]) -> EmitterResult {
    let target = emitter.target();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut last_line = 0;
    let mut last_span = 0..0;

    debug!(emitter = %target, sections = sections.len(), "emitter started");

    'sections: for section in sections {
        for line in &section.lines {
            last_line = line.number;
            last_span = line.span.clone();

            let Some(command) = tokenize(&line.text) else {
                continue;
            };

            let outcome = {
                let mut scope = Warnings::new(line.number, line.span.clone(), &mut warnings);
                panic::catch_unwind(AssertUnwindSafe(|| emitter.execute(&command, &mut scope)))
                    .unwrap_or_else(|payload| Err(EmitError::Internal(panic_message(payload))))
            };

            match outcome {
                Ok(Dispatch::Handled) => {}
                Ok(Dispatch::Unknown) => {
                    let message = if command.key.is_empty() {
                        "expected a command before the quoted text".to_string()
                    } else {
                        format!("unknown {} command: {}", target, command.key)
                    };
                    warn!(line = line.number, %message, "skipping line");
                    warnings.push(LineDiagnostic::warning(line, message));
                }
                Err(error) => {
                    if error.is_structural() {
                        warn!(line = line.number, %error, "{} section aborted", target);
                    } else {
                        error!(line = line.number, %error, "{} emitter failed", target);
                    }
                    errors.push(LineDiagnostic::error(line, error.to_string()));
                    break 'sections;
                }
            }
        }
    }

    let output = {
        let mut scope = Warnings::new(last_line, last_span, &mut warnings);
        panic::catch_unwind(AssertUnwindSafe(|| emitter.finish(&mut scope)))
    };
    let output = output.unwrap_or_else(|payload| {
        errors.push(LineDiagnostic::at(
            last_line,
            0..0,
            Severity::Error,
            EmitError::Internal(panic_message(payload)).to_string(),
        ));
        String::new()
    });

    debug!(emitter = %target, errors = errors.len(), warnings = warnings.len(), "emitter finished");

    EmitterResult {
        target,
        success: errors.is_empty(),
        output,
        errors,
        warnings,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "emitter panicked".to_string()
    }
}
