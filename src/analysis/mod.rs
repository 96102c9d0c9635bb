//! Analysis Layer
//!
//! Turns detector output into a bilingual vocabulary record. A confident
//! local detection is translated from the lexicon and described by the text
//! model; anything else is handed to the vision model whole.

pub mod assembler;
pub mod fallback;
pub mod pipeline;
pub mod sentence;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gemini::GeminiError;
use crate::vision::Detection;

pub use pipeline::{AnalysisRequest, Analyzer};

/// Default confidence at or above which the detector is trusted
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.65;

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Local detector label plus a generated sentence
    #[serde(rename = "YOLO+Gemini(Text)")]
    DetectorWithText,
    /// Label, translation and sentence all from the vision model
    #[serde(rename = "Gemini Vision Fallback")]
    VisionFallback,
}

/// Final record returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub object: String,
    pub chinese: String,
    pub pinyin: String,
    pub sentence: String,
    pub source: Source,
}

/// Processing branch chosen for a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route<'a> {
    /// Trust the detector's label
    Known(&'a Detection),
    /// Ask the vision model instead
    Fallback,
}

/// Choose a path for the best detection; the threshold is inclusive
pub fn route(best: Option<&Detection>, threshold: f32) -> Route<'_> {
    match best {
        Some(detection) if detection.confidence >= threshold => Route::Known(detection),
        _ => Route::Fallback,
    }
}

/// Why an analysis failed
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Object detection failed: {0:#}")]
    Detector(anyhow::Error),
    #[error(transparent)]
    Generative(#[from] GeminiError),
}
