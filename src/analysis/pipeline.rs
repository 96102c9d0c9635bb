//! Request pipeline
//!
//! detect → select → route → (sentence | vision fallback) → assemble.
//! Exactly one generative call is made per request.

use image::DynamicImage;
use std::sync::Arc;
use tracing::info;

use super::{assembler, fallback, route, sentence, AnalysisError, AnalysisResult, Route};
use crate::gemini::{TextGenerator, VisionGenerator};
use crate::vision::{select_best, Detector};

/// One image to analyse
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Decoded image for the detector
    pub image: DynamicImage,
    /// Original upload bytes for the vision model
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub mime_type: String,
}

/// Runs the analysis flow over its collaborators
#[derive(Clone)]
pub struct Analyzer {
    detector: Arc<dyn Detector>,
    text: Arc<dyn TextGenerator>,
    vision: Arc<dyn VisionGenerator>,
    threshold: f32,
}

impl Analyzer {
    pub fn new(
        detector: Arc<dyn Detector>,
        text: Arc<dyn TextGenerator>,
        vision: Arc<dyn VisionGenerator>,
        threshold: f32,
    ) -> Self {
        Self {
            detector,
            text,
            vision,
            threshold,
        }
    }

    /// Confidence threshold in use
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Analyse one image
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let AnalysisRequest {
            image,
            bytes,
            mime_type,
        } = request;

        // Inference is CPU bound
        let detector = Arc::clone(&self.detector);
        let batches = tokio::task::spawn_blocking(move || detector.detect(&image))
            .await
            .map_err(|e| AnalysisError::Detector(anyhow::anyhow!("detector task failed: {}", e)))?
            .map_err(AnalysisError::Detector)?;

        let best = select_best(&batches);
        match best {
            Some(d) => info!("Best detection: {} ({:.3})", d.label, d.confidence),
            None => info!("No detections"),
        }

        match route(best, self.threshold) {
            Route::Known(detection) => {
                info!("Using detector label '{}'", detection.label);
                let sentence = sentence::compose(self.text.as_ref(), &detection.label).await?;
                Ok(assembler::from_detection(&detection.label, sentence))
            }
            Route::Fallback => {
                info!("Falling back to vision model ({})", mime_type);
                let outcome = fallback::resolve(self.vision.as_ref(), &bytes, &mime_type).await?;
                Ok(assembler::from_vision(outcome))
            }
        }
    }
}
