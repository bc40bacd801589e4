use std::path::{Path, PathBuf};

use emitter::InterpreterConfig;
use tracing::debug;

/// Name of the config file picked up next to a source file.
pub const CONFIG_FILE_NAME: &str = "wahy.toml";

/// Load interpreter settings.
///
/// An explicit path must exist and parse. Without one, `wahy.toml` beside
/// the source file is used when present; otherwise defaults apply.
pub fn load_config(explicit: Option<&Path>, source_file: &Path) -> Result<InterpreterConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match sibling_config(source_file) {
            Some(path) => path,
            None => return Ok(InterpreterConfig::default()),
        },
    };

    debug!(path = %path.display(), "loading config");
    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read config '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}

fn sibling_config(source_file: &Path) -> Option<PathBuf> {
    let dir = source_file.parent().unwrap_or_else(|| Path::new("."));
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
