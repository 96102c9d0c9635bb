//! Vision Layer
//!
//! Object detection on uploaded images. The detector itself sits behind the
//! [`Detector`] trait; the YOLO/ONNX implementation lives in [`yolo`].

pub mod models;
pub mod preprocess;
pub mod yolo;

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

pub use models::{ModelStore, OnnxSession};
pub use yolo::{YoloDetector, YoloParams};

/// One candidate object identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Raw detector class name
    pub label: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Detections for a single image
pub type DetectionBatch = Vec<Detection>;

/// Anything that turns an image into labelled detections
pub trait Detector: Send + Sync {
    /// Run detection, returning one batch per analysed image
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBatch>>;
}

/// Pick the single most confident detection across all batches
///
/// Ties keep the first maximum seen. Returns `None` when nothing scored above
/// zero.
pub fn select_best(batches: &[DetectionBatch]) -> Option<&Detection> {
    let mut best_confidence = 0.0f32;
    let mut best = None;

    for detection in batches.iter().flatten() {
        if detection.confidence > best_confidence {
            best_confidence = detection.confidence;
            best = Some(detection);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_best_across_batches() {
        let batches = vec![
            vec![Detection::new("cup", 0.4), Detection::new("dog", 0.7)],
            vec![Detection::new("cat", 0.9), Detection::new("bowl", 0.2)],
        ];

        let best = select_best(&batches).unwrap();
        assert_eq!(best.label, "cat");
        assert!((best.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_select_best_tie_keeps_first() {
        let batches = vec![vec![
            Detection::new("fork", 0.8),
            Detection::new("knife", 0.8),
            Detection::new("spoon", 0.3),
        ]];

        assert_eq!(select_best(&batches).unwrap().label, "fork");
    }

    #[test]
    fn test_select_best_empty() {
        assert!(select_best(&[]).is_none());
        assert!(select_best(&[vec![], vec![]]).is_none());
    }

    #[test]
    fn test_select_best_ignores_non_positive() {
        let batches = vec![vec![
            Detection::new("ghost", 0.0),
            Detection::new("shadow", -0.5),
            Detection::new("nan", f32::NAN),
        ]];

        assert!(select_best(&batches).is_none());
    }

    #[test]
    fn test_select_best_passes_custom_labels_through() {
        let batches = vec![vec![Detection::new("Red Panda", 0.95)]];
        assert_eq!(select_best(&batches).unwrap().label, "Red Panda");
    }
}
