//! Tutor options from TOML and asset directory resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use tutor_model::TutorOptions;

/// Load options from `path`, or the defaults when no file is given.
///
/// Keys missing from the file keep their default values.
pub fn load_options(path: Option<&Path>) -> Result<TutorOptions> {
    let Some(path) = path else {
        return Ok(TutorOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let options: TutorOptions = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded tutor options");
    Ok(options)
}

/// Asset references resolve against `assets`, else the tutorial file's directory.
pub fn assets_dir(tutorial: &Path, assets: Option<&Path>) -> PathBuf {
    match assets {
        Some(dir) => dir.to_path_buf(),
        None => tutorial
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    }
}
