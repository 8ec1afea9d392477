use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));

/// The encoded story audio on local disk.
///
/// The file name is `<sanitised id>-<random>.mp3`, unique per request. The
/// file is removed when the value is dropped unless [`Artifact::retain`] was
/// called.
#[derive(Debug)]
pub struct Artifact {
    path: TempPath,
}

impl Artifact {
    pub fn create(dir: &Path, story_id: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize(story_id)))
            .suffix(".mp3")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file on disk and return where it lives
    pub fn retain(self) -> std::io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}

fn sanitize(story_id: &str) -> String {
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(story_id, "_");
    let truncated: String = cleaned.chars().take(64).collect();
    if truncated.is_empty() {
        "story".to_string()
    } else {
        truncated
    }
}
