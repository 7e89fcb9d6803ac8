//! Blocking HTTP client for a GPT-SoVITS inference server.
//!
//! The server is an external collaborator: we send text plus a reference
//! audio path and get raw audio bytes back. A non-success status is a
//! [`TtsError::GatewayRejected`]; a transport failure is a
//! [`TtsError::GatewayUnavailable`]. Neither is retried here; the renderer
//! records them per line.

use crate::config::GatewayConfig;
use crate::error::{Result, TtsError};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// JSON body of a `/tts` request, matching the GPT-SoVITS API server.
#[derive(Debug, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
    pub text_lang: &'a str,
    pub ref_audio_path: &'a str,
    pub aux_ref_audio_paths: &'a [String],
    pub prompt_text: &'a str,
    pub prompt_lang: &'a str,
    pub top_k: u32,
    pub top_p: f32,
    pub temperature: f32,
    pub text_split_method: &'a str,
    pub batch_size: u32,
    pub speed_factor: f32,
    pub seed: i64,
    pub media_type: &'a str,
    pub streaming_mode: bool,
}

/// Client bound to one gateway configuration.
pub struct GatewayClient {
    agent: ureq::Agent,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: GatewayConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build();
        Self { agent, config }
    }

    /// The configured candidate endpoints.
    pub fn endpoints(&self) -> &[String] {
        &self.config.endpoints
    }

    /// Find the first candidate endpoint that answers at all.
    ///
    /// Any HTTP response counts as alive, even an error status: the probe
    /// only checks reachability, not TTS health.
    pub fn probe(&self) -> Result<String> {
        for endpoint in &self.config.endpoints {
            let base = endpoint.trim_end_matches("/tts");
            match self.agent.get(base).call() {
                Ok(_) | Err(ureq::Error::Status(_, _)) => {
                    log::info!("gateway endpoint answered: {endpoint}");
                    return Ok(endpoint.clone());
                }
                Err(ureq::Error::Transport(t)) => {
                    log::debug!("endpoint {endpoint} unreachable: {t}");
                }
            }
        }
        Err(TtsError::GatewayUnavailable(format!(
            "no endpoint answered out of {} candidates",
            self.config.endpoints.len()
        )))
    }

    /// Synthesize one line of text against `endpoint`, using `ref_audio` as
    /// the voice reference. Returns the raw audio bytes on HTTP 200.
    pub fn synthesize(
        &self,
        endpoint: &str,
        text: &str,
        ref_audio: &Path,
    ) -> Result<Vec<u8>> {
        let ref_audio_path = ref_audio.to_string_lossy();
        let request = TtsRequest {
            text,
            text_lang: &self.config.text_lang,
            ref_audio_path: &ref_audio_path[..],
            aux_ref_audio_paths: &[],
            prompt_text: &self.config.prompt_text,
            prompt_lang: &self.config.prompt_lang,
            top_k: self.config.top_k,
            top_p: self.config.top_p,
            temperature: self.config.temperature,
            text_split_method: "cut5",
            batch_size: 1,
            speed_factor: self.config.speed_factor,
            seed: self.config.seed,
            media_type: &self.config.media_type,
            streaming_mode: false,
        };

        let response = self
            .agent
            .post(endpoint)
            .send_json(&request)
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => TtsError::GatewayRejected { status },
                ureq::Error::Transport(t) => TtsError::GatewayUnavailable(t.to_string()),
            })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| TtsError::GatewayUnavailable(e.to_string()))?;
        Ok(bytes)
    }
}
