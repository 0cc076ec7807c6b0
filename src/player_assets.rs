use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{CastError, CastResult};

/// Bundled script filename inside the asciinema-player distribution.
pub const PLAYER_JS: &str = "asciinema-player.min.js";
/// Bundled stylesheet filename inside the asciinema-player distribution.
pub const PLAYER_CSS: &str = "asciinema-player.css";

/// Environment override for the player distribution directory.
pub const PLAYER_DIST_ENV: &str = "ASCIINEMA_PLAYER_DIST";

/// Verbatim text of the player bundle, embedded wholesale into the
/// generated page.
#[derive(Clone, Debug)]
pub struct PlayerAssets {
    pub js: String,
    pub css: String,
}

impl PlayerAssets {
    /// Locate the installed asciinema-player distribution and read its
    /// script and stylesheet. The first candidate directory containing both
    /// files wins.
    pub fn load() -> CastResult<Self> {
        let candidates = candidate_dirs();
        for dir in &candidates {
            if dir.join(PLAYER_JS).is_file() && dir.join(PLAYER_CSS).is_file() {
                return Self::load_from_dir(dir);
            }
        }

        let searched = candidates
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(CastError::assets(format!(
            "asciinema-player bundle not found (set {PLAYER_DIST_ENV} or install \
             the asciinema-player npm package); searched: {searched}"
        )))
    }

    /// Read both bundle files from one directory.
    pub fn load_from_dir(dir: &Path) -> CastResult<Self> {
        let js_path = dir.join(PLAYER_JS);
        let css_path = dir.join(PLAYER_CSS);
        let js = std::fs::read_to_string(&js_path)
            .with_context(|| format!("read player script '{}'", js_path.display()))?;
        let css = std::fs::read_to_string(&css_path)
            .with_context(|| format!("read player stylesheet '{}'", css_path.display()))?;
        Ok(Self { js, css })
    }
}

/// Candidate locations for the player distribution, in precedence order:
/// explicit env override, the npm layout under the working directory, and a
/// share directory next to the executable.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = std::env::var_os(PLAYER_DIST_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    dirs.push(PathBuf::from("node_modules/asciinema-player/dist/bundle"));
    if let Ok(exe) = std::env::current_exe()
        && let Some(bin_dir) = exe.parent()
    {
        dirs.push(bin_dir.join("../share/cast2mp4/asciinema-player"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_both_files_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLAYER_JS), "console.log('player');").unwrap();
        std::fs::write(dir.path().join(PLAYER_CSS), ".ap-player { color: red }").unwrap();

        let assets = PlayerAssets::load_from_dir(dir.path()).unwrap();
        assert_eq!(assets.js, "console.log('player');");
        assert_eq!(assets.css, ".ap-player { color: red }");
    }

    #[test]
    fn missing_stylesheet_fails_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLAYER_JS), "js").unwrap();

        let err = PlayerAssets::load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains(PLAYER_CSS));
    }
}
