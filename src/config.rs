//! Run configuration: reference clip, cast profiles, gateway settings.
//!
//! Configurations are loaded from YAML files using [`load_config`]. Every
//! section has built-in defaults (the bundled demo cast), so the
//! CLI works without a file.

use crate::error::{Result, TtsError};
use crate::profile::{EmotionGroup, ProfileBook, ToneProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
/// Reference voice asset settings.
pub struct ReferenceConfig {
    /// Path to the reference clip. `hf://` and `https://` sources are
    /// resolved through the downloader.
    pub path: Option<String>,
    /// Leading-window bound applied when loading the clip.
    pub max_duration_seconds: f64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_duration_seconds: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
/// Settings for the external GPT-SoVITS HTTP gateway.
pub struct GatewayConfig {
    /// Candidate `/tts` endpoints, probed in order.
    pub endpoints: Vec<String>,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Language of the text being synthesized.
    pub text_lang: String,
    /// Language of the reference prompt.
    pub prompt_lang: String,
    /// Transcript of the reference prompt.
    pub prompt_text: String,
    /// Sampling top-k.
    pub top_k: u32,
    /// Sampling top-p.
    pub top_p: f32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Server-side speed factor (independent of local tone shaping).
    pub speed_factor: f32,
    /// Sampling seed; -1 lets the server pick.
    pub seed: i64,
    /// Requested response media type.
    pub media_type: String,
    /// Pause between consecutive requests, to avoid flooding the server.
    pub request_pause_seconds: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "http://localhost:9880/tts".to_string(),
                "http://localhost:9871/tts".to_string(),
                "http://localhost:9872/tts".to_string(),
                "http://127.0.0.1:9880/tts".to_string(),
            ],
            timeout_seconds: 20,
            text_lang: "ko".to_string(),
            prompt_lang: "ko".to_string(),
            prompt_text: "안녕하세요".to_string(),
            top_k: 15,
            top_p: 1.0,
            temperature: 1.0,
            speed_factor: 1.0,
            seed: -1,
            media_type: "wav".to_string(),
            request_pause_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
/// Top-level configuration.
pub struct AppConfig {
    /// Reference clip settings.
    pub reference: ReferenceConfig,
    /// Speaker name to base tone profile.
    pub speakers: BTreeMap<String, ToneProfile>,
    /// Emotion groups, in priority order.
    pub emotions: Vec<EmotionGroup>,
    /// Gateway settings.
    pub gateway: GatewayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceConfig::default(),
            speakers: crate::profile::default_speakers(),
            emotions: crate::profile::default_groups(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the resolver tables from this configuration.
    pub fn profile_book(&self) -> ProfileBook {
        ProfileBook::new(self.speakers.clone(), self.emotions.clone())
    }
}

/// Load a YAML configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TtsError::AssetNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|e| TtsError::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig};
    use crate::error::TtsError;
    use tempfile::tempdir;

    #[test]
    fn defaults_cover_the_builtin_cast() {
        let config = AppConfig::default();
        assert!(config.speakers.contains_key("hyunjung"));
        assert_eq!(config.emotions.len(), 3);
        assert_eq!(config.emotions[0].name, "excited");
        assert!((config.reference.max_duration_seconds - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_overrides_only_named_sections() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "reference:\n  max_duration_seconds: 2.0\nspeakers:\n  solo: {pitch: 1.0, speed: 1.0, volume: 0.5}\n",
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        assert_eq!(config.speakers.len(), 1);
        assert!((config.reference.max_duration_seconds - 2.0).abs() < f64::EPSILON);
        // Unnamed sections keep their defaults.
        assert_eq!(config.emotions.len(), 3);
        assert!(!config.gateway.endpoints.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "bogus_section: 1\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, TtsError::Configuration(_)));
    }

    #[test]
    fn missing_config_is_asset_not_found() {
        let err = load_config("nope/config.yaml").unwrap_err();
        assert!(matches!(err, TtsError::AssetNotFound(_)));
    }
}
