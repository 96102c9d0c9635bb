//! YOLO object detector
//!
//! Runs an Ultralytics YOLO (v8/v11 style) ONNX export through ONNX Runtime.
//! The export produces a single `[1, 4 + classes, anchors]` tensor holding
//! (cx, cy, w, h) followed by one score per class for every anchor.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayView3, Ix3};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use super::preprocess;
use super::{Detection, DetectionBatch, Detector};
use crate::config::DetectionConfig;

/// COCO dataset class names, in model output order
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Inference parameters
#[derive(Debug, Clone)]
pub struct YoloParams {
    /// Square model input size in pixels
    pub input_size: u32,
    /// Minimum class score for a box to be kept (0.0 - 1.0)
    pub min_confidence: f32,
    /// IoU above which overlapping boxes of the same class are suppressed
    pub iou_threshold: f32,
    /// Maximum number of boxes returned per image
    pub max_detections: usize,
}

impl From<&DetectionConfig> for YoloParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            input_size: config.input_size,
            min_confidence: config.min_confidence,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        }
    }
}

impl YoloParams {
    /// Reject settings the preprocessing and decoding cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            anyhow::bail!("input_size must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!("iou_threshold must be within 0.0 - 1.0, got {}", self.iou_threshold);
        }
        Ok(())
    }
}

/// Raw box decoded from the model output, in model input coordinates
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    class_id: usize,
    score: f32,
    /// [x_min, y_min, x_max, y_max]
    bbox: [f32; 4],
}

/// YOLO detector backed by an ONNX Runtime session
pub struct YoloDetector {
    session: Mutex<super::OnnxSession>,
    params: YoloParams,
    class_names: Vec<String>,
}

impl YoloDetector {
    /// Load a detector from an ONNX model file
    pub fn new(model_path: &Path, params: YoloParams, class_names: Option<Vec<String>>) -> Result<Self> {
        params.validate()?;

        let session = super::OnnxSession::new(model_path)?;
        if session.input_names().len() != 1 || session.output_names().is_empty() {
            anyhow::bail!(
                "Unexpected YOLO model signature: inputs {:?}, outputs {:?}",
                session.input_names(),
                session.output_names()
            );
        }

        let class_names = class_names
            .unwrap_or_else(|| COCO_CLASSES.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            session: Mutex::new(session),
            params,
            class_names,
        })
    }

    /// Name for a class index; indices past the list get a generic name
    fn class_name(&self, class_id: usize) -> String {
        label_for(&self.class_names, class_id)
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionBatch>> {
        let start = Instant::now();

        let (input, geometry) = preprocess::prepare(image, self.params.input_size);
        let tensor = Tensor::from_array(input).context("Failed to build input tensor")?;

        let candidates = {
            let mut session = self.session.lock();
            let outputs = session
                .session_mut()
                .run(ort::inputs![tensor])
                .context("Failed to run YOLO model")?;

            if outputs.len() == 0 {
                anyhow::bail!("YOLO model returned no outputs");
            }

            let raw = outputs[0]
                .try_extract_array::<f32>()
                .context("YOLO output is not an f32 tensor")?;
            let raw = raw
                .into_dimensionality::<Ix3>()
                .context("YOLO output is not a rank-3 tensor")?;

            decode_output(raw, self.class_names.len(), self.params.min_confidence)?
        };

        let kept = non_maximum_suppression(
            candidates,
            self.params.iou_threshold,
            self.params.max_detections,
        );

        let batch: DetectionBatch = kept
            .into_iter()
            .map(|c| Detection::new(self.class_name(c.class_id), c.score))
            .collect();

        debug!(
            "YOLO inference complete in {:?}: {} boxes (scale {:.3}, pad {}x{})",
            start.elapsed(),
            batch.len(),
            geometry.scale,
            geometry.pad_x,
            geometry.pad_y
        );

        Ok(vec![batch])
    }
}

fn label_for(class_names: &[String], class_id: usize) -> String {
    class_names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// Decode `[1, 4 + classes, anchors]` (or its transpose) into scored boxes
fn decode_output(
    output: ArrayView3<'_, f32>,
    num_classes: usize,
    min_confidence: f32,
) -> Result<Vec<Candidate>> {
    let (_, d1, d2) = output.dim();
    let features = 4 + num_classes;

    // Normalize to (feature, anchor) indexing
    let view = if d1 == features {
        output.index_axis(ndarray::Axis(0), 0)
    } else if d2 == features {
        output.index_axis(ndarray::Axis(0), 0).reversed_axes()
    } else {
        anyhow::bail!(
            "Unexpected YOLO output shape {:?} for {} classes",
            output.shape(),
            num_classes
        );
    };

    let anchors = view.shape()[1];
    let mut candidates = Vec::new();

    for i in 0..anchors {
        let mut best_score = 0.0f32;
        let mut best_class = 0usize;

        for class_id in 0..num_classes {
            let score = view[[4 + class_id, i]];
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }

        if best_score < min_confidence {
            continue;
        }

        let cx = view[[0, i]];
        let cy = view[[1, i]];
        let w = view[[2, i]];
        let h = view[[3, i]];

        candidates.push(Candidate {
            class_id: best_class,
            score: best_score,
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
        });
    }

    Ok(candidates)
}

/// Class-wise non-maximum suppression, highest scores first
fn non_maximum_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }

        let suppressed = kept.iter().any(|existing| {
            existing.class_id == candidate.class_id && iou(&existing.bbox, &candidate.bbox) > iou_threshold
        });

        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

/// Intersection over union of two [x_min, y_min, x_max, y_max] boxes
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}
