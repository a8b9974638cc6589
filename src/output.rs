use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::figure::{Figure, ImageFormat};

/// Saves figures as `<dir>/<chart name>.<ext>`.
#[derive(Debug, Clone)]
pub struct FigureWriter {
    dir: PathBuf,
    format: ImageFormat,
}

impl FigureWriter {
    pub fn new(dir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, self.format.extension()))
    }

    pub fn write(&self, name: &str, figure: &Figure) -> Result<PathBuf> {
        let path = self.path_for(name);
        write_figure(&path, figure, Some(self.format))?;
        Ok(path)
    }
}

/// Creates missing parent directories, then saves. Without an explicit
/// format the path's extension decides.
pub fn write_figure(path: &Path, figure: &Figure, format: Option<ImageFormat>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match format {
        Some(format) => figure.save_as(path, format),
        None => figure.save(path),
    }
}
