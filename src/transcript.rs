/*!
 * Recognizer output: timed tokens and the transcript file adapter.
 *
 * Recognition engines report word timing in different shapes. Google's
 * Speech-to-Text JSON uses duration strings ("1.500s") or `{seconds, nanos}`
 * objects, Whisper exports use plain float seconds. Everything is normalised
 * to `f64` seconds here, before tokens reach the segmentation passes.
 */

use std::path::{Path, PathBuf};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*s?\s*$").unwrap()
});

/// One recognized word or sub-phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text, kept verbatim
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Token {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Anything that yields an ordered token stream
pub trait TokenSource {
    /// Load every token, ordered by start time
    fn load_tokens(&self) -> Result<Vec<Token>, AppError>;
}

impl TokenSource for Vec<Token> {
    fn load_tokens(&self) -> Result<Vec<Token>, AppError> {
        Ok(self.clone())
    }
}

/// JSON transcript written by an external recognizer
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    path: PathBuf,
}

impl TranscriptFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TranscriptFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse transcript JSON text into tokens
    pub fn parse_str(content: &str) -> Result<Vec<Token>, AppError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| AppError::Recognition(format!("Invalid transcript JSON: {}", e)))?;

        let words = collect_words(&json)?;
        words
            .iter()
            .enumerate()
            .map(|(i, word)| parse_word(i, word))
            .collect()
    }
}

impl TokenSource for TranscriptFile {
    fn load_tokens(&self) -> Result<Vec<Token>, AppError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::Recognition(format!("Failed to read transcript {}: {}", self.path.display(), e))
        })?;
        let tokens = Self::parse_str(&content)?;
        debug!("Loaded {} tokens from {}", tokens.len(), self.path.display());
        Ok(tokens)
    }
}

// @returns: The word objects of every supported transcript shape, in order
fn collect_words(json: &Value) -> Result<Vec<&Value>, AppError> {
    if let Some(words) = json.as_array() {
        return Ok(words.iter().collect());
    }

    if let Some(words) = json.get("words").and_then(Value::as_array) {
        return Ok(words.iter().collect());
    }

    // Google Speech-to-Text: first alternative of each result
    if let Some(results) = json.get("results").and_then(Value::as_array) {
        return Ok(results
            .iter()
            .filter_map(|r| r.get("alternatives").and_then(Value::as_array))
            .filter_map(|alts| alts.first())
            .filter_map(|alt| alt.get("words").and_then(Value::as_array))
            .flatten()
            .collect());
    }

    // Whisper: word lists nested in segments
    if let Some(segments) = json.get("segments").and_then(Value::as_array) {
        return Ok(segments
            .iter()
            .filter_map(|s| s.get("words").and_then(Value::as_array))
            .flatten()
            .collect());
    }

    Err(AppError::Recognition(
        "Transcript has no word list (expected an array, \"words\", \"results\" or \"segments\")".to_string(),
    ))
}

fn parse_word(index: usize, word: &Value) -> Result<Token, AppError> {
    let text = word
        .get("word")
        .or_else(|| word.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Recognition(format!("Word {} has no text", index)))?;

    let start = field_seconds(word, &["start", "startTime", "startOffset"])
        .ok_or_else(|| AppError::Recognition(format!("Word {} has no valid start time", index)))?;
    let end = field_seconds(word, &["end", "endTime", "endOffset"])
        .ok_or_else(|| AppError::Recognition(format!("Word {} has no valid end time", index)))?;

    Ok(Token::new(text, start, end))
}

fn field_seconds(word: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| word.get(*key)).and_then(seconds_from_value)
}

/// Normalise a time value to seconds
///
/// Accepts a number, a duration string like "1.500s", or an object with
/// `seconds` plus `nanos` or `microseconds`.
pub fn seconds_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => DURATION_REGEX
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        Value::Object(map) => {
            let seconds = map.get("seconds").map_or(Some(0.0), number_like)?;
            let fraction = if let Some(nanos) = map.get("nanos") {
                number_like(nanos)? / 1e9
            } else if let Some(micros) = map.get("microseconds") {
                number_like(micros)? / 1e6
            } else {
                0.0
            };
            Some(seconds + fraction)
        }
        _ => None,
    }
}

// Protobuf JSON encodes int64 seconds as strings
fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
