//! Temporary upload files
//!
//! Each request writes its upload to a uniquely named file that is removed
//! again when the guard is dropped.

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An uploaded image on disk, deleted on drop
#[derive(Debug)]
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    /// Write upload bytes to a fresh file in `dir`
    pub fn write(dir: &Path, bytes: &[u8], extension: &str) -> Result<Self> {
        let path = dir.join(format!("upload_{}.{}", uuid::Uuid::new_v4().simple(), extension));

        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload to {:?}", path))?;
        debug!("Stored upload ({} bytes) at {:?}", bytes.len(), path);

        Ok(Self { path })
    }

    /// Path of the temp file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the stored file as an image
    pub fn decode(&self) -> Result<DynamicImage> {
        image::ImageReader::open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?
            .with_guessed_format()
            .context("Failed to read image header")?
            .decode()
            .context("Failed to decode image")
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp file {:?}: {}", self.path, e);
            }
        }
    }
}
