use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{CastError, CastResult};

/// Resolve the cast file to an absolute path, failing (with the resolved
/// path in the message) when it does not exist. The file content is not
/// inspected; a malformed cast only fails later, inside the player.
pub fn resolve_cast_path(path: &Path) -> CastResult<PathBuf> {
    let abs = absolute(path)?;
    if !abs.is_file() {
        return Err(CastError::input(format!(
            "cast file not found: {}",
            abs.display()
        )));
    }
    Ok(abs)
}

/// Resolve the output path to an absolute path. It does not have to exist;
/// ffmpeg creates it at the end of the recording.
pub fn resolve_output_path(path: &Path) -> CastResult<PathBuf> {
    absolute(path)
}

fn absolute(path: &Path) -> CastResult<PathBuf> {
    let abs = std::path::absolute(path)
        .with_context(|| format!("resolve path '{}'", path.display()))?;
    Ok(abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_resolves_to_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let cast = dir.path().join("demo.cast");
        std::fs::write(&cast, "{\"version\": 2}\n").unwrap();

        let resolved = resolve_cast_path(&cast).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::path::absolute(&cast).unwrap());
    }

    #[test]
    fn missing_file_error_names_the_resolved_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.cast");

        let err = resolve_cast_path(&missing).unwrap_err();
        let expected = std::path::absolute(&missing).unwrap();
        assert!(err.to_string().contains(&expected.display().to_string()));
    }

    #[test]
    fn relative_output_becomes_absolute() {
        let out = resolve_output_path(Path::new("output.mp4")).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("output.mp4"));
    }
}
