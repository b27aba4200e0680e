use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the recognized speech (ISO, optional region subtag)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language of the generated subtitles (ISO, optional region subtag)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Cue segmentation thresholds
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Thresholds for grouping tokens into cues and merging cues
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// A draft cue is closed once it lasts this many seconds
    #[serde(default = "default_max_segment_duration")]
    pub max_segment_duration: f64,

    /// Character limit for draft cues and for merged cues
    #[serde(default = "default_max_chars_per_segment")]
    pub max_chars_per_segment: usize,

    /// Cues shorter than this many seconds absorb their successor
    #[serde(default = "default_min_segment_duration")]
    pub min_segment_duration: f64,

    /// Cues separated by less than this many seconds may merge
    #[serde(default = "default_min_gap_between_subtitles")]
    pub min_gap_between_subtitles: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segment_duration: default_max_segment_duration(),
            max_chars_per_segment: default_max_chars_per_segment(),
            min_segment_duration: default_min_segment_duration(),
            min_gap_between_subtitles: default_min_gap_between_subtitles(),
        }
    }
}

impl SegmentationConfig {
    /// Reject thresholds the segmentation passes cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.max_segment_duration > 0.0) {
            return Err(anyhow!("max_segment_duration must be positive, got {}", self.max_segment_duration));
        }
        if self.max_chars_per_segment == 0 {
            return Err(anyhow!("max_chars_per_segment must be at least 1"));
        }
        if !(self.min_segment_duration >= 0.0) {
            return Err(anyhow!("min_segment_duration must not be negative, got {}", self.min_segment_duration));
        }
        if !(self.min_gap_between_subtitles >= 0.0) {
            return Err(anyhow!(
                "min_gap_between_subtitles must not be negative, got {}",
                self.min_gap_between_subtitles
            ));
        }
        Ok(())
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Whether cues are translated before they are written
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key for the translation service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,

    /// Maximum number of cues per translation request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per batch before giving up
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            endpoint: default_google_endpoint(),
            batch_size: default_batch_size(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }

        std::env::var(API_KEY_ENV).unwrap_or_default()
    }

    /// Get the endpoint, falling back to the public Google endpoint
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.trim().is_empty() {
            default_google_endpoint()
        } else {
            self.endpoint.clone()
        }
    }
}

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "ja".to_string()
}

fn default_target_language() -> String {
    "zh-CN".to_string()
}

fn default_max_segment_duration() -> f64 {
    5.0
}

fn default_max_chars_per_segment() -> usize {
    80
}

fn default_min_segment_duration() -> f64 {
    1.0
}

fn default_min_gap_between_subtitles() -> f64 {
    1.0
}

fn default_batch_size() -> usize {
    128 // Google Translate v2 accepts up to 128 segments per request
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_tag(&self.source_language)?;
        crate::language_utils::validate_language_tag(&self.target_language)?;

        self.segmentation.validate()?;

        if self.translation.enabled {
            if self.translation.batch_size == 0 {
                return Err(anyhow!("Translation batch_size must be at least 1"));
            }
            if self.translation.retry_count == 0 {
                return Err(anyhow!("Translation retry_count must be at least 1"));
            }
            if self.translation.get_api_key().is_empty() {
                return Err(anyhow!(
                    "Translation API key is required (set translation.api_key or {})",
                    API_KEY_ENV
                ));
            }
        }

        Ok(())
    }

    /// Load the first config file that exists, or create a default one
    ///
    /// `explicit` is tried first, then `fallback`. When neither exists the
    /// default is written to `fallback` (or to `explicit` without a fallback),
    /// so it does not land among the transcripts of the working directory.
    /// Returns the config and the file it came from.
    pub fn load_or_create(explicit: &Path, fallback: Option<&Path>) -> Result<(Config, PathBuf)> {
        let existing = [Some(explicit), fallback]
            .into_iter()
            .flatten()
            .find(|path| path.exists());

        if let Some(path) = existing {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok((config, path.to_path_buf()));
        }

        let target = fallback.unwrap_or(explicit);
        warn!("Config file not found at {:?}, creating default config at {:?}", explicit, target);

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(target, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", target))?;
        info!("Default config written to {:?}", target);

        Ok((config, target.to_path_buf()))
    }

    /// Config file in the user's config directory, if one can be located
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yasg").join("conf.json"))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            segmentation: SegmentationConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
