pub mod config;
pub mod css;
pub mod detect;
pub mod driver;
pub mod error;
pub mod html;
pub mod javascript;
pub mod orchestrator;
pub mod result;
pub mod state;

pub use config::{InterpreterConfig, StylesheetMode};
pub use detect::{DetectedTarget, detect_target};
pub use error::EmitError;
pub use orchestrator::{Interpreter, interpret};
pub use result::{CompositeResult, EmitterResult};
