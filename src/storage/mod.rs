//! Storage Layer
//!
//! Application directories and per-request temporary upload files.

pub mod temp_image;

use anyhow::Result;
use std::path::PathBuf;

pub use temp_image::TempImage;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "lingolens", "LingoLens")
        .ok_or_else(|| anyhow::anyhow!("Could not determine application directories"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Get the directory used for upload temp files
pub fn get_upload_dir(configured: Option<&PathBuf>) -> Result<PathBuf> {
    let dir = match configured {
        Some(dir) => dir.clone(),
        None => get_data_dir()?.join("uploads"),
    };
    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}
