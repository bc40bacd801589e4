pub mod diagnostic;
pub mod escape;
pub mod section;
pub mod source;
pub mod tokenizer;

pub use diagnostic::{LineDiagnostic, Severity};
pub use escape::{Escaped, escape_html};
pub use section::{SourceSection, Target, split_sections};
pub use source::{SourceLine, source_lines};
pub use tokenizer::{Arg, ParsedCommand, tokenize};
