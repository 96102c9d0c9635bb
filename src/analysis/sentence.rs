//! Explanatory sentences for detected labels
//!
//! People and animals get a "what it does" description, objects get a list of
//! everyday uses.

use crate::gemini::{GeminiError, TextGenerator};
use crate::lexicon;

/// Prompt for a living subject
pub fn living_prompt(label: &str) -> String {
    format!(
        "Explain what a {label} is in very simple English. \
         Talk about what it does or how it lives. \
         Use easy daily words like explaining to a child. \
         response should be of max 2 lines. \
         Do NOT say 'used for'. \
         Do not mention colors, size, or images."
    )
}

/// Prompt for an object
pub fn object_prompt(label: &str) -> String {
    format!(
        "Explain what a {label} is used for using very simple English. \
         List common uses separated by commas. \
         Use easy daily words. \
         response should be of max 2 lines. \
         Do not use technical words. \
         Do not mention color, size, or images."
    )
}

/// Pick the prompt template for a label
pub fn build_prompt(label: &str) -> String {
    if lexicon::is_living(label) {
        living_prompt(label)
    } else {
        object_prompt(label)
    }
}

/// Ask the text model for a sentence about `label`
pub async fn compose(generator: &dyn TextGenerator, label: &str) -> Result<String, GeminiError> {
    let prompt = build_prompt(label);
    let text = generator.generate_text(&prompt).await?;
    Ok(text.trim().to_string())
}
