//! Script rendering: one output file per dialogue line, best effort.
//!
//! The reference clip is loaded before anything is written; a load failure
//! aborts the whole run and leaves no output directory behind. After that
//! point, per-line failures are recorded in the report and the remaining
//! lines still render. Lines go strictly in index order; there is no
//! shared mutable state between them beyond the read-only reference buffer.

use crate::audio::io::WavIo;
use crate::audio::transform::ToneShaper;
use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::gateway::GatewayClient;
use crate::profile::ProfileBook;
use crate::script::{DialogueLine, Script};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a single line fared.
#[derive(Debug)]
pub struct LineOutcome {
    /// Script index of the line.
    pub index: u32,
    /// Speaker of the line.
    pub speaker: String,
    /// Emotion label of the line.
    pub emotion: String,
    /// Output file on success, error text on failure.
    pub result: std::result::Result<PathBuf, String>,
}

/// Aggregate result of a render run.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// One outcome per attempted line, in script order.
    pub outcomes: Vec<LineOutcome>,
}

impl RenderReport {
    /// Number of lines that produced an output file.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of lines that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// When set, rendered lines go through the external TTS gateway instead of
/// being written directly from the shaped reference.
pub struct GatewayMode {
    /// Client used for synthesis calls.
    pub client: GatewayClient,
    /// Endpoint to POST to (usually from [`GatewayClient::probe`]).
    pub endpoint: String,
    /// Pause inserted between consecutive requests.
    pub request_pause: Duration,
}

/// Inputs for one render run.
pub struct RenderOptions {
    /// Where to read the reference clip from.
    pub reference_path: PathBuf,
    /// Leading-window bound on the reference clip, in seconds.
    pub max_duration_seconds: Option<f64>,
    /// Directory receiving the per-line output files.
    pub output_dir: PathBuf,
    /// Optional gateway routing.
    pub gateway: Option<GatewayMode>,
    /// Checked between lines; set by the Ctrl-C handler.
    pub interrupted: Arc<AtomicBool>,
}

impl RenderOptions {
    /// Plain local rendering into `output_dir`.
    pub fn local(reference_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_path: reference_path.into(),
            max_duration_seconds: Some(3.0),
            output_dir: output_dir.into(),
            gateway: None,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Output file name for a line: `NN_speaker_emotion.wav`.
fn output_name(line: &DialogueLine) -> String {
    format!("{:02}_{}_{}.wav", line.index, line.speaker, line.emotion)
}

/// Render every line of `script`, returning the per-line report.
///
/// Fatal errors (reference load failure, before any output exists) return
/// `Err`; everything after that is per-line and lands in the report.
pub fn render_script(
    script: &Script,
    profiles: &ProfileBook,
    options: &RenderOptions,
) -> Result<RenderReport> {
    // Load the reference before touching the output directory, so a decode
    // failure leaves no partial run behind.
    let reference = WavIo::read_mono(&options.reference_path, options.max_duration_seconds)?;
    log::info!(
        "loaded reference clip: {} samples at {} Hz ({:.2}s)",
        reference.len(),
        reference.sample_rate,
        reference.duration_seconds()
    );

    std::fs::create_dir_all(&options.output_dir)?;

    let mut report = RenderReport::default();
    for (position, line) in script.lines().iter().enumerate() {
        if options.interrupted.load(Ordering::SeqCst) {
            log::warn!("interrupted after {} of {} lines", position, script.len());
            break;
        }
        let result = render_line(line, &reference, profiles, options)
            .map_err(|e| e.to_string());
        match &result {
            Ok(path) => log::info!("line {:02} {} -> {}", line.index, line.speaker, path.display()),
            Err(e) => log::warn!("line {:02} {} failed: {e}", line.index, line.speaker),
        }
        report.outcomes.push(LineOutcome {
            index: line.index,
            speaker: line.speaker.clone(),
            emotion: line.emotion.clone(),
            result,
        });
        if let Some(gateway) = &options.gateway {
            if position + 1 < script.len() && !gateway.request_pause.is_zero() {
                std::thread::sleep(gateway.request_pause);
            }
        }
    }
    Ok(report)
}

fn render_line(
    line: &DialogueLine,
    reference: &AudioBuffer,
    profiles: &ProfileBook,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let profile = profiles.resolve(&line.speaker, &line.emotion)?;
    let shaped = ToneShaper::shape(reference, &profile)?;
    let output = options.output_dir.join(output_name(line));

    match &options.gateway {
        None => {
            WavIo::write_mono(&output, &shaped)?;
        }
        Some(gateway) => {
            // The shaped clip becomes the per-line voice reference for the
            // external synthesis call.
            let shaped_ref = shaped_reference_path(&options.output_dir, line);
            WavIo::write_mono(&shaped_ref, &shaped)?;
            let result = gateway.client.synthesize(&gateway.endpoint, &line.text, &shaped_ref);
            let _ = std::fs::remove_file(&shaped_ref);
            std::fs::write(&output, result?)?;
        }
    }
    Ok(output)
}

fn shaped_reference_path(output_dir: &Path, line: &DialogueLine) -> PathBuf {
    output_dir.join(format!(".ref_{:02}_{}.wav", line.index, line.speaker))
}
