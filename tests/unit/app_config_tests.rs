/*!
 * Tests for application configuration
 */

use anyhow::Result;
use subforge::app_config::{ColorTrack, Config, TranslationProvider};

/// Test default configuration values
#[test]
fn test_default_config_withNoOverrides_shouldUseExpectedDefaults() {
    let config = Config::default();

    assert_eq!(config.merge.threshold_ms, 1000);
    assert_eq!(config.merge.shift_a_ms, 0);
    assert_eq!(config.merge.shift_b_ms, 0);
    assert_eq!(config.merge.shift_global_ms, 0);
    assert_eq!(config.merge.color_track, ColorTrack::TrackB);
    assert_eq!(config.merge.color_hex, "#ffff54");
    assert_eq!(config.merge.track_b_keyword, "FR");

    assert_eq!(config.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(config.translation.endpoint, "http://localhost:1234/v1");
    assert_eq!(config.translation.batch_size, 10);
    assert_eq!(config.translation.source_language, "English");
    assert_eq!(config.translation.target_language, "French");
}

/// Test the default configuration validates
#[test]
fn test_validate_withDefaultConfig_shouldPass() {
    assert!(Config::default().validate().is_ok());
}

/// Test a negative threshold is rejected at the boundary
#[test]
fn test_validate_withNegativeThreshold_shouldFail() {
    let mut config = Config::default();
    config.merge.threshold_ms = -1;
    assert!(config.validate().is_err());
}

/// Test a bad color is rejected
#[test]
fn test_validate_withInvalidColor_shouldFail() {
    let mut config = Config::default();
    config.merge.color_hex = "#12345".to_string();
    assert!(config.validate().is_err());

    config.merge.color_hex = "not-a-color".to_string();
    assert!(config.validate().is_err());
}

/// Test a bad color is tolerated when coloring is disabled
#[test]
fn test_validate_withInvalidColorButNoColoring_shouldPass() {
    let mut config = Config::default();
    config.merge.color_track = ColorTrack::None;
    config.merge.color_hex = "not-a-color".to_string();
    assert!(config.validate().is_ok());
}

/// Test a zero batch size is rejected
#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.translation.batch_size = 0;
    assert!(config.validate().is_err());
}

/// Test a malformed endpoint is rejected
#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Test JSON round trip keeps all fields
#[test]
fn test_serde_withRoundTrip_shouldPreserveConfig() -> Result<()> {
    let mut config = Config::default();
    config.merge.threshold_ms = 750;
    config.merge.shift_b_ms = -250;
    config.merge.color_track = ColorTrack::TrackA;
    config.translation.target_language = "Spanish".to_string();

    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed.merge.threshold_ms, 750);
    assert_eq!(parsed.merge.shift_b_ms, -250);
    assert_eq!(parsed.merge.color_track, ColorTrack::TrackA);
    assert_eq!(parsed.translation.target_language, "Spanish");
    Ok(())
}

/// Test an empty JSON object deserializes to full defaults
#[test]
fn test_serde_withEmptyObject_shouldUseDefaults() -> Result<()> {
    let config: Config = serde_json::from_str("{}")?;
    assert_eq!(config.merge.threshold_ms, 1000);
    assert_eq!(config.translation.batch_size, 10);
    Ok(())
}

/// Test provider and color track string parsing
#[test]
fn test_from_str_withValidNames_shouldParse() {
    assert_eq!(
        "lmstudio".parse::<TranslationProvider>().unwrap(),
        TranslationProvider::LMStudio
    );
    assert!("nonsense".parse::<TranslationProvider>().is_err());

    assert_eq!("track_b".parse::<ColorTrack>().unwrap(), ColorTrack::TrackB);
    assert_eq!("a".parse::<ColorTrack>().unwrap(), ColorTrack::TrackA);
    assert!("purple".parse::<ColorTrack>().is_err());
}
