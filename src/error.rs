//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, TtsError>;

/// Errors surfaced by the tone-shaping pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum TtsError {
    /// A referenced file does not exist on disk.
    #[error("asset not found: {0}")]
    AssetNotFound(PathBuf),

    /// A file exists but cannot be parsed as audio.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// A tone factor is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No tone profile is configured for the requested speaker.
    #[error("unknown speaker: {0}")]
    UnknownSpeaker(String),

    /// The TTS gateway could not be reached at all.
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The TTS gateway answered with a non-success status.
    #[error("gateway rejected request with status {status}")]
    GatewayRejected {
        /// HTTP status code returned by the gateway.
        status: u16,
    },

    /// A model asset could not be fetched from any configured source.
    #[error("download failed: {0}")]
    Download(String),

    /// A script failed validation before rendering started.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
