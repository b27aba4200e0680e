use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

// @module: Subtitle cues, SRT timestamps and SRT output

// @const: SRT timestamp regex, comma or dot before the milliseconds
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})$").unwrap()
});

// @const: Tolerance when converting seconds to whole milliseconds
const MS_EPSILON: f64 = 1e-6;

// @struct: Timed subtitle unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    // @field: Display text
    pub text: String,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Recognition confidence
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl Cue {
    /// Creates a cue with full confidence
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Cue {
            text: text.into(),
            start,
            end,
            confidence: default_confidence(),
        }
    }

    /// Creates a cue with an explicit confidence
    pub fn with_confidence(text: impl Into<String>, start: f64, end: f64, confidence: f64) -> Self {
        Cue {
            text: text.into(),
            start,
            end,
            confidence,
        }
    }

    /// Display duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Length of the text in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Same timing and confidence, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Cue {
            text: text.into(),
            start: self.start,
            end: self.end,
            confidence: self.confidence,
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end)
    }

    // @validates: Finite, non-negative, start <= end
    pub(crate) fn check_timing(&self, index: usize) -> Result<(), SubtitleError> {
        check_time_range(index, self.start, self.end)
    }
}

/// Rejects negative, non-finite or inverted time ranges
pub(crate) fn check_time_range(index: usize, start: f64, end: f64) -> Result<(), SubtitleError> {
    for value in [start, end] {
        if !value.is_finite() || value < 0.0 {
            return Err(SubtitleError::NegativeTime { index, value });
        }
    }
    if end < start {
        return Err(SubtitleError::InvalidTimeRange { index, start, end });
    }
    Ok(())
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
///
/// Hours are not capped. Milliseconds are truncated, never rounded, so a value
/// such as 0.9995 stays in the same second. Negative and NaN input format as zero.
pub fn format_timestamp(seconds: f64) -> String {
    // The epsilon absorbs representation error, e.g. 1.001 * 1000 = 1000.9999...
    let total_ms = (seconds.max(0.0) * 1000.0 + MS_EPSILON).floor() as u64;

    let millis = total_ms % 1000;
    let whole = total_ms / 1000;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp (HH:MM:SS,mmm) to seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64, SubtitleError> {
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());
    let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;

    let field = |i: usize| -> Result<u64, SubtitleError> {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(invalid)
    };
    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let whole = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok(whole as f64 + millis as f64 / 1000.0)
}

/// Ordered list of finished cues, ready to be written as SRT
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Transcript the cues were generated from
    pub source_file: PathBuf,

    /// Cues in display order
    pub cues: Vec<Cue>,

    /// Language of the cue text
    pub language: String,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf, language: String, cues: Vec<Cue>) -> Self {
        SubtitleCollection {
            source_file,
            cues,
            language,
        }
    }

    /// Serialize the cues as SRT text
    pub fn to_srt_string(&self) -> String {
        cues_to_srt(&self.cues)
    }

    /// Write subtitles to an SRT file and return the written path
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(self.to_srt_string().as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        debug!("Wrote {} cues to {}", self.cues.len(), path.display());
        Ok(path.to_path_buf())
    }

    /// Time from the first cue's start to the last cue's end
    pub fn span_seconds(&self) -> f64 {
        match (self.cues.first(), self.cues.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        }
    }
}

/// Serialize cues as SRT, numbering blocks from 1
pub fn cues_to_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        out.push_str(&SrtBlock { index: i + 1, cue }.to_string());
    }
    out
}

// @struct: One numbered SRT block
struct SrtBlock<'a> {
    index: usize,
    cue: &'a Cue,
}

impl fmt::Display for SrtBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.cue.format_start_time(), self.cue.format_end_time())?;
        writeln!(f, "{}", self.cue.text)?;
        writeln!(f)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
