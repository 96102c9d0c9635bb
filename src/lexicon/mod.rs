//! Vocabulary Layer
//!
//! Immutable English → Chinese lookup and the living/object split used to pick
//! a sentence style. Both tables are built once and only read afterwards.

mod table;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use table::{LIVING_LABELS, TRANSLATIONS};

/// Chinese placeholder for labels without a translation
pub const UNKNOWN_CHINESE: &str = "未知";
/// Pinyin placeholder for labels without a translation
pub const UNKNOWN_PINYIN: &str = "---";

/// Chinese rendering of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Simplified Chinese text
    pub chinese: &'static str,
    /// Pinyin with tone marks
    pub pinyin: &'static str,
}

impl TranslationEntry {
    /// Placeholder entry for labels outside the vocabulary
    pub const UNKNOWN: TranslationEntry = TranslationEntry {
        chinese: UNKNOWN_CHINESE,
        pinyin: UNKNOWN_PINYIN,
    };
}

static TRANSLATION_INDEX: LazyLock<HashMap<&'static str, TranslationEntry>> =
    LazyLock::new(|| entries().collect());

static LIVING_INDEX: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| LIVING_LABELS.iter().copied().collect());

/// Look up a lowercase label in the translation table
pub fn lookup(label: &str) -> Option<TranslationEntry> {
    TRANSLATION_INDEX.get(label).copied()
}

/// Look up a label, falling back to the unknown placeholders
pub fn lookup_or_unknown(label: &str) -> TranslationEntry {
    lookup(label).unwrap_or(TranslationEntry::UNKNOWN)
}

/// Whether a label names a person or an animal (case-insensitive)
pub fn is_living(label: &str) -> bool {
    LIVING_INDEX.contains(label.to_lowercase().as_str())
}

/// Iterate over every vocabulary entry in table order
pub fn entries() -> impl Iterator<Item = (&'static str, TranslationEntry)> {
    TRANSLATIONS.iter().copied()
}
