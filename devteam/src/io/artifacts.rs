//! File-write collaborator for generated artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::errors::PersistenceFailure;

/// Abstraction over artifact persistence.
pub trait ArtifactWriter {
    /// Create or overwrite the artifact `name` with exactly `contents`.
    fn write(&self, name: &str, contents: &str) -> Result<()>;
}

/// Writes artifacts as `<dir>/<name>.<extension>`.
#[derive(Debug, Clone)]
pub struct FsArtifactWriter {
    dir: PathBuf,
    extension: String,
}

impl FsArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Path an artifact name resolves to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        if self.extension.is_empty() {
            return self.dir.join(name);
        }
        self.dir.join(format!("{name}.{}", self.extension))
    }
}

impl ArtifactWriter for FsArtifactWriter {
    fn write(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.path_for(name);
        write_text(&self.dir, &path, contents).map_err(|cause| PersistenceFailure {
            name: name.to_string(),
            cause,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "artifact written");
        Ok(())
    }
}

fn write_text(dir: &Path, path: &Path, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
