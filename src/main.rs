//! LingoLens - Image-to-vocabulary service
//!
//! Detects the main object in an uploaded image and answers with its English
//! name, Chinese translation, pinyin and a simple explanatory sentence.

mod analysis;
mod config;
mod gemini;
mod lexicon;
mod server;
mod storage;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::{AnalysisRequest, Analyzer};
use crate::config::AppConfig;
use crate::gemini::GeminiClient;
use crate::server::AppState;
use crate::vision::{ModelStore, YoloDetector, YoloParams};

/// LingoLens - object detection with bilingual answers
#[derive(Parser, Debug)]
#[command(name = "lingo-lens")]
#[command(about = "Identify the object in an image and describe it in English and Chinese")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to the YOLO ONNX model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Detector confidence needed to skip the vision fallback
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Analyse a single image, print the result and exit
    #[arg(long)]
    image: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match load_env_file(Path::new(".env")) {
        Ok(true) => info!("Loaded environment from .env"),
        Ok(false) => {}
        Err(e) => warn!("Could not read .env file: {:#}", e),
    }

    let mut config = load_or_default_config(args.config.as_deref())?;
    config.apply_env();
    apply_args(&mut config, &args);

    if args.print_config {
        print!("{}", printable_config(&config)?);
        return Ok(());
    }

    info!("LingoLens starting...");
    let analyzer = build_analyzer(&config).await?;

    if let Some(path) = &args.image {
        return analyze_file(&analyzer, path).await;
    }

    let upload_dir = storage::get_upload_dir(config.storage.temp_dir.as_ref())?;
    info!("Upload temp files go to {:?}", upload_dir);

    let state = Arc::new(AppState {
        analyzer,
        upload_dir,
    });
    let router = server::router(state, &config.server);
    server::serve(router, &config.server.bind).await?;

    info!("LingoLens shutdown complete");
    Ok(())
}

/// Load configuration from an explicit path, the default location, or defaults
fn load_or_default_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            let config = config::load_config(&config_path)
                .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }

        // Leave a template behind for the next run
        let config = AppConfig::default();
        match config::save_config(&config, &config_path) {
            Ok(()) => info!("Wrote default configuration to {:?}", config_path),
            Err(e) => warn!("Could not write default configuration: {}", e),
        }
        return Ok(config);
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

/// Load `KEY=value` pairs from an env file; existing variables win
fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to load {:?}", path))),
    }
}

/// Effective configuration as TOML, without the API key
fn printable_config(config: &AppConfig) -> Result<String> {
    let mut config = config.clone();
    config.gemini.api_key = None;
    Ok(toml::to_string_pretty(&config)?)
}

/// Command-line flags win over the file
fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(model) = &args.model {
        config.detection.model_path = model.clone();
    }
    if let Some(threshold) = args.threshold {
        config.detection.confidence_threshold = threshold;
    }
}

async fn build_analyzer(config: &AppConfig) -> Result<Analyzer> {
    let model_path = ModelStore::from_config(&config.detection).ensure().await?;

    let params = YoloParams::from(&config.detection);
    let class_names = config.detection.class_names.clone();
    let detector = tokio::task::spawn_blocking(move || {
        YoloDetector::new(&model_path, params, class_names)
    })
    .await
    .context("Detector loading task failed")??;

    let gemini = Arc::new(GeminiClient::new(&config.gemini)?);
    info!("Using Gemini model {}", config.gemini.model);

    let analyzer = Analyzer::new(
        Arc::new(detector),
        gemini.clone(),
        gemini,
        config.detection.confidence_threshold,
    );
    info!("Detector confidence threshold: {}", analyzer.threshold());
    Ok(analyzer)
}

/// One-shot analysis of a local file
async fn analyze_file(analyzer: &Analyzer, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode {:?}", path))?;
    let mime_type = image::guess_format(&bytes)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "image/jpeg".to_string());

    let result = analyzer
        .analyze(AnalysisRequest {
            image,
            bytes,
            mime_type,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "lingo-lens",
            "--bind",
            "127.0.0.1:9999",
            "--model",
            "models/custom.onnx",
            "--threshold",
            "0.5",
        ]);

        let mut config = AppConfig::default();
        apply_args(&mut config, &args);

        assert_eq!(config.server.bind, "127.0.0.1:9999");
        assert_eq!(config.detection.model_path, PathBuf::from("models/custom.onnx"));
        assert!((config.detection.confidence_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_args_keeps_config() {
        let args = Args::parse_from(["lingo-lens"]);
        let mut config = AppConfig::default();
        apply_args(&mut config, &args);

        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert!((config.detection.confidence_threshold - 0.65).abs() < f32::EPSILON);
        assert!(!args.print_config);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        assert!(load_or_default_config(Some(Path::new("/nonexistent/lingo.toml"))).is_err());
    }

    #[test]
    fn test_printed_config_hides_api_key() {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some("secret-key-123".to_string());

        let printed = printable_config(&config).unwrap();
        assert!(!printed.contains("secret-key-123"));
        assert!(!printed.contains("api_key"));
        assert!(printed.contains("gemini-2.5-flash"));

        // Caller's config is untouched
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret-key-123"));
    }

    #[test]
    fn test_env_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(&dir.path().join(".env")).unwrap());

        let path = dir.path().join(".env");
        std::fs::write(&path, "LINGO_LENS_ENV_FILE_TEST=from-file\n").unwrap();
        assert!(load_env_file(&path).unwrap());
        assert_eq!(
            std::env::var("LINGO_LENS_ENV_FILE_TEST").unwrap(),
            "from-file"
        );
    }
}
