//! Result assembly
//!
//! The detector path never trusts an external translation. The vision path
//! prefers the lexicon but falls back to the model's own translation before
//! using the unknown placeholders.

use super::fallback::{VisionOutcome, VisionRecord};
use super::{AnalysisResult, Source};
use crate::lexicon::{self, UNKNOWN_CHINESE, UNKNOWN_PINYIN};

/// Label used when a parsed vision record has no `object`
const MISSING_OBJECT: &str = "unknown";

/// Build the record for a trusted detector label
pub fn from_detection(label: &str, sentence: String) -> AnalysisResult {
    let entry = lexicon::lookup_or_unknown(&label.to_lowercase());

    AnalysisResult {
        object: label.to_string(),
        chinese: entry.chinese.to_string(),
        pinyin: entry.pinyin.to_string(),
        sentence,
        source: Source::DetectorWithText,
    }
}

/// Build the record from the vision model's answer
pub fn from_vision(outcome: VisionOutcome) -> AnalysisResult {
    // Degraded replies keep the placeholder label as-is
    let normalize = matches!(outcome, VisionOutcome::Parsed(_));
    let VisionRecord {
        object,
        chinese,
        pinyin,
        sentence,
    } = outcome.into_record();

    let object = match object {
        Some(object) if normalize => object.to_lowercase(),
        Some(object) => object,
        None => MISSING_OBJECT.to_string(),
    };

    let (chinese, pinyin) = match lexicon::lookup(&object) {
        Some(entry) => (entry.chinese.to_string(), entry.pinyin.to_string()),
        None => (
            chinese.unwrap_or_else(|| UNKNOWN_CHINESE.to_string()),
            pinyin.unwrap_or_else(|| UNKNOWN_PINYIN.to_string()),
        ),
    };

    AnalysisResult {
        object,
        chinese,
        pinyin,
        sentence: sentence.unwrap_or_default(),
        source: Source::VisionFallback,
    }
}
