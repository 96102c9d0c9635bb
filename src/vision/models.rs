//! Model management for ONNX Runtime
//!
//! Resolves the detector model on disk, downloading it once when a URL is
//! configured, and wraps the loaded ONNX Runtime session.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use ort::session::{builder::GraphOptimizationLevel, Session};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::DetectionConfig;

/// Location and provenance of the detector model file
#[derive(Debug, Clone)]
pub struct ModelStore {
    model_path: PathBuf,
    download_url: Option<String>,
    expected_sha256: Option<String>,
}

impl ModelStore {
    /// Create a model store for a local path with an optional download source
    pub fn new(model_path: PathBuf, download_url: Option<String>, expected_sha256: Option<String>) -> Self {
        Self {
            model_path,
            download_url,
            expected_sha256: expected_sha256.map(|h| h.to_lowercase()),
        }
    }

    /// Create a model store from detection settings
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.model_path.clone(),
            config.model_url.clone(),
            config.model_sha256.clone(),
        )
    }

    /// Check if the model file is present and non-empty
    pub fn is_available(&self) -> bool {
        std::fs::metadata(&self.model_path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Make sure the model exists locally, downloading it if possible
    /// Returns the path to the model file
    pub async fn ensure(&self) -> Result<PathBuf> {
        if self.is_available() {
            info!("Detector model available at {:?}", self.model_path);
            return Ok(self.model_path.clone());
        }

        let Some(url) = self.download_url.as_deref() else {
            anyhow::bail!(
                "Detector model not found at {:?} and no model_url is configured",
                self.model_path
            );
        };

        info!("Downloading detector model from {}", url);
        self.download(url).await?;
        info!("Detector model saved to {:?}", self.model_path);

        Ok(self.model_path.clone())
    }

    /// Stream the model into a temp file, verify it, then move it into place
    async fn download(&self, url: &str) -> Result<()> {
        if let Some(parent) = self.model_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create model directory {:?}", parent))?;
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(600))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client
            .get(url)
            .send()
            .await
            .context("Failed to send download request")?;

        if !response.status().is_success() {
            anyhow::bail!("Download failed with status {}: {}", response.status(), url);
        }

        let total_size = response.content_length();
        debug!("Download size: {:?} bytes", total_size);

        let temp_path = self.model_path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).context("Failed to create temp file")?;

        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading download stream")?;

            file.write_all(&chunk).context("Failed to write to temp file")?;

            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
        }

        file.flush().context("Failed to flush temp file")?;
        drop(file);
        debug!("Downloaded {} bytes", downloaded);

        let hash = format!("{:x}", hasher.finalize());
        if let Err(e) = self.verify_checksum(&hash) {
            std::fs::remove_file(&temp_path).ok();
            return Err(e);
        }

        std::fs::rename(&temp_path, &self.model_path)
            .context("Failed to move downloaded file to final location")?;

        Ok(())
    }

    /// Compare a hex digest against the configured checksum, if any
    fn verify_checksum(&self, actual: &str) -> Result<()> {
        match &self.expected_sha256 {
            Some(expected) if expected != actual => anyhow::bail!(
                "Checksum mismatch for {:?}: expected {}, got {}",
                self.model_path,
                expected,
                actual
            ),
            Some(_) => {
                info!("Checksum verified for {:?}", self.model_path);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// ONNX Runtime session wrapper
pub struct OnnxSession {
    session: Session,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OnnxSession {
    /// Create a new ONNX session from a model file
    pub fn new(model_path: &Path) -> Result<Self> {
        info!("Loading ONNX model from {:?}", model_path);

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)?
            .with_intra_threads(4)
            .map_err(ort::Error::<()>::from)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model {:?}", model_path))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        info!(
            "Model loaded. Inputs: {:?}, Outputs: {:?}",
            input_names, output_names
        );

        Ok(Self {
            session,
            input_names,
            output_names,
        })
    }

    /// Get the underlying session mutably for running inference
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Get input names
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Get output names
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
