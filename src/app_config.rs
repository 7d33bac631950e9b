use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Merge and sync settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Merge configuration surface
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MergeConfig {
    /// Maximum start-time difference in milliseconds for two cues to match.
    /// Stored signed so a bad value can be rejected with a clear error
    /// instead of wrapping at parse time.
    #[serde(default = "default_threshold_ms")]
    pub threshold_ms: i64,

    /// Track A shift in milliseconds, may be negative
    #[serde(default)]
    pub shift_a_ms: i64,

    /// Track B shift in milliseconds, may be negative
    #[serde(default)]
    pub shift_b_ms: i64,

    /// Global shift applied after merging, may be negative
    #[serde(default)]
    pub shift_global_ms: i64,

    /// Which track gets the color tag: "none", "track_a" or "track_b"
    #[serde(default)]
    pub color_track: ColorTrack,

    /// 24-bit color as a 6-hex-digit string
    #[serde(default = "default_color_hex")]
    pub color_hex: String,

    /// Filename keyword identifying the track B file within an episode pair
    #[serde(default = "default_track_b_keyword")]
    pub track_b_keyword: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            threshold_ms: default_threshold_ms(),
            shift_a_ms: 0,
            shift_b_ms: 0,
            shift_global_ms: 0,
            color_track: ColorTrack::default(),
            color_hex: default_color_hex(),
            track_b_keyword: default_track_b_keyword(),
        }
    }
}

/// Color target selector
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorTrack {
    // @variant: No coloring
    None,
    // @variant: Color track A
    TrackA,
    // @variant: Color track B (the secondary language)
    #[default]
    TrackB,
}

impl std::fmt::Display for ColorTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::TrackA => "track_a",
            Self::TrackB => "track_b",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ColorTrack {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "track_a" | "a" => Ok(Self::TrackA),
            "track_b" | "b" => Ok(Self::TrackB),
            _ => Err(anyhow!("Invalid color track: {}", s)),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: LM Studio (OpenAI-compatible local server)
    #[default]
    LMStudio,
    // @provider: Mock, for tests
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LMStudio => "LM Studio",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LMStudio => "lmstudio",
            Self::Mock => "mock",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lmstudio" => Ok(Self::LMStudio),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model identifier as loaded in the serving backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Source language name, free text passed to the model
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language name, free text passed to the model
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Free-text show context given to the model with every batch
    #[serde(default)]
    pub context: String,

    /// Number of cue texts per translation batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of retry attempts per batch request
    #[serde(default = "default_retry_count")]
    pub max_retries: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub backoff_base_ms: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: default_model(),
            endpoint: default_endpoint(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            context: String::new(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_retry_count(),
            backoff_base_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

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

fn default_threshold_ms() -> i64 {
    1000
}

fn default_color_hex() -> String {
    "#ffff54".to_string()
}

fn default_track_b_keyword() -> String {
    "FR".to_string()
}

fn default_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "French".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Merge configuration is rejected here, before any document is touched
        if self.merge.threshold_ms < 0 {
            return Err(anyhow!(
                "Merge threshold must be >= 0 ms, got {}",
                self.merge.threshold_ms
            ));
        }

        let digits = self
            .merge
            .color_hex
            .strip_prefix('#')
            .unwrap_or(&self.merge.color_hex);
        if self.merge.color_track != ColorTrack::None
            && (digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(anyhow!("Invalid color value: {}", self.merge.color_hex));
        }

        // Translation configuration
        if self.translation.batch_size == 0 {
            return Err(anyhow!("Translation batch size must be at least 1"));
        }

        if self.translation.provider == TranslationProvider::LMStudio {
            if self.translation.endpoint.is_empty() {
                return Err(anyhow!("Translation endpoint cannot be empty"));
            }
            url::Url::parse(&self.translation.endpoint)
                .map_err(|e| anyhow!("Invalid translation endpoint: {}", e))?;
        }

        if self.translation.source_language.trim().is_empty()
            || self.translation.target_language.trim().is_empty()
        {
            return Err(anyhow!("Source and target languages cannot be empty"));
        }

        Ok(())
    }
}
