// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for saved strips

use crate::constants::DEFAULT_SAVE_FOLDER;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default directory for saved strips (~/Pictures/Photobooth)
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_SAVE_FOLDER)
}

/// File name for a strip saved now
pub fn strip_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("photostrip_{}.png", timestamp)
}

/// Pick a path in `dir` for `file_name` that does not exist yet
///
/// Two strips saved within the same second get a numeric suffix.
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Write an encoded strip into `dir`, creating it if necessary
pub async fn save_strip(dir: &Path, png: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = unique_path(dir, &strip_file_name());
    debug!(path = %path.display(), size_kb = png.len() / 1024, "Writing strip");
    tokio::fs::write(&path, png).await?;
    info!(path = %path.display(), "Strip saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_file_name_shape() {
        let name = strip_file_name();
        assert!(name.starts_with("photostrip_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_default_output_dir_ends_with_folder() {
        assert!(default_output_dir().ends_with(DEFAULT_SAVE_FOLDER));
    }

    #[tokio::test]
    async fn test_save_strip_creates_dir_and_avoids_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("strips");

        let first = save_strip(&dir, b"one").await.unwrap();
        let second = save_strip(&dir, b"two").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }
}
