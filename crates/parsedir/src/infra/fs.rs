//! Reading template files and writing rendered files.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::scan::ScanResult;
use crate::domain::model::{FileUnit, RenderedUnit};

/// Read every renderable file of a scan into [`FileUnit`]s, keeping scan order.
///
/// Files that turn out not to be UTF-8 are skipped with a warning; the scan only sniffs
/// the head of each file. Any other read failure is an error.
pub fn read_file_units(scan: &ScanResult) -> Result<Vec<FileUnit>> {
    let mut units = Vec::new();
    for file in scan.renderable() {
        let bytes = fs::read(&file.path)
            .with_context(|| format!("could not read template {}", file.path.display()))?;
        match String::from_utf8(bytes) {
            Ok(content) => units.push(FileUnit::new(file.display_path.clone(), content)),
            Err(err) => {
                tracing::warn!(
                    path = %file.path.display(),
                    error = %err.utf8_error(),
                    "template is not valid UTF-8; skipping"
                );
            }
        }
    }
    Ok(units)
}

/// Writes rendered files below an output root.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a rendered path below the output root, refusing anything that would escape it.
    pub fn target_for(&self, relative: &str) -> io::Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "rendered path '{}' points outside the output directory",
                    relative.display()
                ),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// Write one rendered file, creating parent directories and overwriting existing files.
    pub fn write(&self, unit: &RenderedUnit) -> io::Result<PathBuf> {
        let target = self.target_for(&unit.path)?;
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, unit.content.as_bytes())?;
        tracing::debug!(path = %target.display(), bytes = unit.content.len(), "generated file");
        Ok(target)
    }
}
