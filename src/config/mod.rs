//! Application Configuration
//!
//! Service settings stored in TOML format, with environment overrides for
//! secrets.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::DEFAULT_CONFIDENCE_THRESHOLD;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Local detector settings
    pub detection: DetectionConfig,
    /// Generative API settings
    pub gemini: GeminiConfig,
    /// Temporary file settings
    pub storage: StorageConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 120,
        }
    }
}

/// Local object detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the YOLO ONNX model
    pub model_path: PathBuf,
    /// Where to fetch the model from when it is missing
    pub model_url: Option<String>,
    /// Expected SHA-256 of the downloaded model (hex)
    pub model_sha256: Option<String>,
    /// Confidence at or above which the detector's label is trusted
    pub confidence_threshold: f32,
    /// Square model input size in pixels
    pub input_size: u32,
    /// Minimum box score kept by the detector itself
    pub min_confidence: f32,
    /// NMS IoU threshold
    pub iou_threshold: f32,
    /// Maximum boxes per image
    pub max_detections: usize,
    /// Class names for custom models (defaults to COCO)
    pub class_names: Option<Vec<String>>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./yolo11m.onnx"),
            model_url: None,
            model_sha256: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            input_size: 640,
            min_confidence: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            class_names: None,
        }
    }
}

/// Gemini API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name used for both text and vision calls
    pub model: String,
    /// API key (usually supplied through GOOGLE_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// HTTP timeout for a single call in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Temporary upload storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for upload temp files (defaults to the data directory)
    pub temp_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key.trim().to_string());
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
