/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use yasg::app_config::{API_KEY_ENV, Config, LogLevel, SegmentationConfig, TranslationConfig};
use crate::common;

fn config_with_key() -> Config {
    Config {
        translation: TranslationConfig {
            api_key: "test-key".to_string(),
            ..TranslationConfig::default()
        },
        ..Config::default()
    }
}

/// Test the default values
#[test]
fn test_default_config_withNoInput_shouldHaveDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "ja");
    assert_eq!(config.target_language, "zh-CN");
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(config.segmentation.max_segment_duration, 5.0);
    assert_eq!(config.segmentation.max_chars_per_segment, 80);
    assert_eq!(config.segmentation.min_segment_duration, 1.0);
    assert_eq!(config.segmentation.min_gap_between_subtitles, 1.0);

    assert!(config.translation.enabled);
    assert_eq!(config.translation.batch_size, 128);
    assert_eq!(config.translation.retry_count, 3);
    assert_eq!(config.translation.retry_backoff_ms, 1000);
    assert_eq!(config.translation.endpoint, "https://translation.googleapis.com");
}

/// Test missing JSON fields fall back to defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "target_language": "zh-TW",
        "segmentation": {"max_chars_per_segment": 42},
        "translation": {"enabled": false},
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.source_language, "ja");
    assert_eq!(config.target_language, "zh-TW");
    assert_eq!(config.segmentation.max_chars_per_segment, 42);
    assert_eq!(config.segmentation.max_segment_duration, 5.0);
    assert!(!config.translation.enabled);
    assert_eq!(config.translation.batch_size, 128);
    assert_eq!(config.log_level, LogLevel::Debug);
}

/// Test serialization round trip
#[test]
fn test_serialize_withDefaultConfig_shouldRoundTrip() {
    let config = config_with_key();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.segmentation, config.segmentation);
    assert_eq!(restored.translation.api_key, "test-key");
}

/// Test a valid configuration
#[test]
fn test_validate_withApiKey_shouldSucceed() {
    assert!(config_with_key().validate().is_ok());
}

/// Test translation may be disabled without a key
#[test]
fn test_validate_withTranslationDisabled_shouldNotNeedKey() {
    let mut config = Config::default();
    config.translation.enabled = false;

    assert!(config.validate().is_ok());
}

/// Test a missing key is rejected unless the environment provides one
#[test]
fn test_validate_withoutApiKey_shouldFailUnlessEnvSet() {
    let result = Config::default().validate();

    if std::env::var(API_KEY_ENV).map(|k| k.is_empty()).unwrap_or(true) {
        assert!(result.is_err());
    } else {
        assert!(result.is_ok());
    }
}

/// Test invalid language tags are rejected
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = config_with_key();
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());

    let mut config = config_with_key();
    config.source_language = "ja-J".to_string();
    assert!(config.validate().is_err());
}

/// Test invalid translation settings are rejected
#[test]
fn test_validate_withZeroBatchOrRetries_shouldFail() {
    let mut config = config_with_key();
    config.translation.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = config_with_key();
    config.translation.retry_count = 0;
    assert!(config.validate().is_err());
}

/// Test invalid segmentation thresholds are rejected
#[test]
fn test_segmentation_validate_withInvalidThresholds_shouldFail() {
    let valid = SegmentationConfig::default();
    assert!(valid.validate().is_ok());

    let zero_chars = SegmentationConfig { max_chars_per_segment: 0, ..valid.clone() };
    assert!(zero_chars.validate().is_err());

    let zero_duration = SegmentationConfig { max_segment_duration: 0.0, ..valid.clone() };
    assert!(zero_duration.validate().is_err());

    let nan_gap = SegmentationConfig { min_gap_between_subtitles: f64::NAN, ..valid };
    assert!(nan_gap.validate().is_err());
}

/// Test the endpoint fallback
#[test]
fn test_get_endpoint_withBlankEndpoint_shouldUseGoogle() {
    let config = TranslationConfig {
        endpoint: "  ".to_string(),
        ..TranslationConfig::default()
    };

    assert_eq!(config.get_endpoint(), "https://translation.googleapis.com");
}

/// Test the configured key wins over the environment
#[test]
fn test_get_api_key_withConfiguredKey_shouldUseIt() {
    assert_eq!(config_with_key().translation.get_api_key(), "test-key");
}

/// Test log level mapping
#[test]
fn test_log_level_to_level_filter_withEachLevel_shouldMap() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

/// Test an existing config file is read
#[test]
fn test_load_or_create_withExistingFile_shouldLoadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let explicit = common::create_test_file(temp_dir.path(), "conf.json", r#"{"target_language": "en"}"#)?;
    let fallback = temp_dir.path().join("user").join("conf.json");

    let (config, path) = Config::load_or_create(&explicit, Some(fallback.as_path()))?;

    assert_eq!(config.target_language, "en");
    assert_eq!(path, explicit);
    assert!(!fallback.exists());
    Ok(())
}

/// Test the user config is used when the explicit file is missing
#[test]
fn test_load_or_create_withOnlyFallback_shouldLoadFallback() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let fallback = common::create_test_file(temp_dir.path(), "user.json", r#"{"source_language": "ko"}"#)?;

    let (config, path) = Config::load_or_create(&temp_dir.path().join("conf.json"), Some(fallback.as_path()))?;

    assert_eq!(config.source_language, "ko");
    assert_eq!(path, fallback);
    Ok(())
}

/// Test a missing config creates the default outside the working folder
#[test]
fn test_load_or_create_withNoFiles_shouldWriteDefaultToFallback() -> Result<()> {
    let work_dir = common::create_temp_dir()?;
    let user_dir = common::create_temp_dir()?;
    let explicit = work_dir.path().join("conf.json");
    let fallback = user_dir.path().join("yasg").join("conf.json");

    let (config, path) = Config::load_or_create(&explicit, Some(fallback.as_path()))?;

    assert_eq!(path, fallback);
    assert!(fallback.exists());
    assert!(!explicit.exists());
    assert_eq!(config.target_language, "zh-CN");

    let written: Config = serde_json::from_str(&std::fs::read_to_string(&fallback)?)?;
    assert_eq!(written.segmentation, SegmentationConfig::default());
    Ok(())
}

/// Test without a user config directory the default is written to the given path
#[test]
fn test_load_or_create_withoutFallback_shouldWriteDefaultToExplicit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let explicit = temp_dir.path().join("conf.json");

    let (_, path) = Config::load_or_create(&explicit, None)?;

    assert_eq!(path, explicit);
    assert!(explicit.exists());
    Ok(())
}

/// Test an unreadable config is an error
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let explicit = common::create_test_file(temp_dir.path(), "conf.json", "{ broken")?;

    assert!(Config::load_or_create(&explicit, None).is_err());
    Ok(())
}
