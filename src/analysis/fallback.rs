//! Vision fallback
//!
//! Asks the vision model to name the main object, translate it and write the
//! sentence in one go. A reply that does not parse is kept as
//! [`VisionOutcome::Degraded`] instead of failing the request.

use serde::Deserialize;

use crate::gemini::{GeminiError, VisionGenerator};

/// Label reported when the vision reply could not be parsed
pub const DEGRADED_OBJECT: &str = "Unknown";
/// Chinese reported when the vision reply could not be parsed
pub const DEGRADED_CHINESE: &str = "未知";
/// Pinyin reported when the vision reply could not be parsed
pub const DEGRADED_PINYIN: &str = "wèizhī";

/// Structured prompt requesting a strict JSON record
pub const VISION_PROMPT: &str = "Identify the main object in this image and return ONLY valid JSON:\n\
{\"object\":\"English name\",\
\"chinese\":\"Chinese (simplified)\",\
\"pinyin\":\"Pinyin with tones\",\
\"sentence\":\"Very simple sentence using easy daily words. \
If the object is a thing, explain what people use it for in real life. \
If the object is a person or animal, explain what it does or how it lives. \
Use short phrases separated by commas. \
No technical or formal words.\"}\n\
Rules:\n\
- Use very easy English (like explaining to a child)\n\
- For people or animals, do NOT say 'used for'\n\
- Do NOT use scientific or technical words\n\
- Do NOT mention color, size, or the image\n\
- Keep it practical and simple\n\
- response should be of max 2 lines.";

/// Record parsed from the vision reply; any key may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VisionRecord {
    pub object: Option<String>,
    pub chinese: Option<String>,
    pub pinyin: Option<String>,
    pub sentence: Option<String>,
}

/// Result of interpreting a vision reply
#[derive(Debug, Clone, PartialEq)]
pub enum VisionOutcome {
    /// The reply was a JSON object
    Parsed(VisionRecord),
    /// The reply was not usable JSON; holds the trimmed raw text
    Degraded(String),
}

impl VisionOutcome {
    /// Flatten into a record, filling the fixed placeholders when degraded
    pub fn into_record(self) -> VisionRecord {
        match self {
            VisionOutcome::Parsed(record) => record,
            VisionOutcome::Degraded(raw) => VisionRecord {
                object: Some(DEGRADED_OBJECT.to_string()),
                chinese: Some(DEGRADED_CHINESE.to_string()),
                pinyin: Some(DEGRADED_PINYIN.to_string()),
                sentence: Some(raw),
            },
        }
    }
}

/// Remove Markdown code fence markers from a reply
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret a vision reply; never fails
pub fn parse_reply(text: &str) -> VisionOutcome {
    // Only a JSON object counts, never a positional array
    let parsed = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
        &strip_code_fences(text),
    )
    .and_then(|map| serde_json::from_value::<VisionRecord>(serde_json::Value::Object(map)));

    match parsed {
        Ok(record) => VisionOutcome::Parsed(record),
        Err(e) => {
            tracing::warn!("Vision reply is not valid JSON ({}), using raw text", e);
            VisionOutcome::Degraded(text.trim().to_string())
        }
    }
}

/// Send the image to the vision model and interpret the reply
pub async fn resolve(
    generator: &dyn VisionGenerator,
    image: &[u8],
    mime_type: &str,
) -> Result<VisionOutcome, GeminiError> {
    let text = generator
        .generate_from_image(image, mime_type, VISION_PROMPT)
        .await?;
    Ok(parse_reply(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"object\":\"cat\",\"chinese\":\"猫\",\"pinyin\":\"māo\",\"sentence\":\"x\"}\n```";

        let outcome = parse_reply(reply);
        assert_eq!(
            outcome,
            VisionOutcome::Parsed(VisionRecord {
                object: Some("cat".to_string()),
                chinese: Some("猫".to_string()),
                pinyin: Some("māo".to_string()),
                sentence: Some("x".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_plain_text_degrades() {
        let outcome = parse_reply("I think it's a cat.");
        assert_eq!(outcome, VisionOutcome::Degraded("I think it's a cat.".to_string()));

        let record = outcome.into_record();
        assert_eq!(record.object.as_deref(), Some("Unknown"));
        assert_eq!(record.chinese.as_deref(), Some("未知"));
        assert_eq!(record.pinyin.as_deref(), Some("wèizhī"));
        assert_eq!(record.sentence.as_deref(), Some("I think it's a cat."));
    }

    #[test]
    fn test_degraded_keeps_raw_text_with_fences() {
        let reply = "  ```json\nnot json\n```  ";
        assert_eq!(
            parse_reply(reply),
            VisionOutcome::Degraded("```json\nnot json\n```".to_string())
        );
    }

    #[test]
    fn test_parse_tolerates_missing_and_extra_keys() {
        let outcome = parse_reply("{\"object\":\"Kettle\",\"confidence\":\"high\"}");
        let VisionOutcome::Parsed(record) = outcome else {
            panic!("expected parsed record");
        };
        assert_eq!(record.object.as_deref(), Some("Kettle"));
        assert!(record.chinese.is_none());
        assert!(record.sentence.is_none());
    }

    #[test]
    fn test_non_object_json_degrades() {
        assert!(matches!(parse_reply("[1, 2, 3]"), VisionOutcome::Degraded(_)));
        assert_eq!(
            parse_reply("[\"cat\", \"猫\", \"māo\", \"x\"]"),
            VisionOutcome::Degraded("[\"cat\", \"猫\", \"māo\", \"x\"]".to_string())
        );
        assert!(matches!(parse_reply("\"cat\""), VisionOutcome::Degraded(_)));
        assert!(matches!(
            parse_reply("{\"object\": 42}"),
            VisionOutcome::Degraded(_)
        ));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}```"), "{}");
        assert_eq!(strip_code_fences(" {} "), "{}");
    }

    #[test]
    fn test_prompt_requests_all_fields() {
        for key in ["\"object\"", "\"chinese\"", "\"pinyin\"", "\"sentence\""] {
            assert!(VISION_PROMPT.contains(key), "prompt is missing {}", key);
        }
        assert!(VISION_PROMPT.contains("do NOT say 'used for'"));
    }
}
