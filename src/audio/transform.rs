//! The tone-shaping transform: speed, simulated pitch, volume, clipping.
//!
//! The pitch step is a plain resample, so it shifts pitch and duration
//! together. That is deliberate: the goal is a cheap per-character tone
//! variation, not a phase-vocoder pitch shift, and tests depend on the
//! exact interpolation arithmetic staying as written.

use crate::audio::AudioBuffer;
use crate::error::{Result, TtsError};
use crate::profile::ToneProfile;

#[derive(Debug, Default)]
pub struct ToneShaper;

impl ToneShaper {
    /// Produce a new buffer shaped by `profile`.
    ///
    /// Steps, in order:
    /// 1. speed: resample to `floor(len / speed)` samples (1.0 is an exact
    ///    no-op copy);
    /// 2. pitch simulation: resample to `floor(len * pitch)` samples,
    ///    skipped entirely at 1.0;
    /// 3. volume: multiply every sample by `volume`;
    /// 4. clip to `[-1.0, 1.0]`.
    ///
    /// The sample rate is never altered. Fails with
    /// [`TtsError::InvalidParameter`] when `speed <= 0`, `pitch <= 0`, or
    /// `volume < 0`.
    pub fn shape(buffer: &AudioBuffer, profile: &ToneProfile) -> Result<AudioBuffer> {
        validate(profile)?;

        let mut samples = if profile.speed == 1.0 {
            buffer.samples.clone()
        } else {
            let new_len = (buffer.len() as f64 / profile.speed as f64).floor() as usize;
            resample_linear(&buffer.samples, new_len)
        };

        if profile.pitch != 1.0 {
            let pitch_len = (samples.len() as f64 * profile.pitch as f64).floor() as usize;
            samples = resample_linear(&samples, pitch_len);
        }

        // Multiplying by 1.0 and clamping an in-range value are both exact,
        // so the identity profile still returns a bitwise copy.
        for value in &mut samples {
            *value = (*value * profile.volume).clamp(-1.0, 1.0);
        }

        Ok(AudioBuffer::new(samples, buffer.sample_rate))
    }
}

fn validate(profile: &ToneProfile) -> Result<()> {
    if !(profile.speed > 0.0) {
        return Err(TtsError::InvalidParameter(format!(
            "speed factor must be > 0, got {}",
            profile.speed
        )));
    }
    if !(profile.pitch > 0.0) {
        return Err(TtsError::InvalidParameter(format!(
            "pitch factor must be > 0, got {}",
            profile.pitch
        )));
    }
    if !(profile.volume >= 0.0) {
        return Err(TtsError::InvalidParameter(format!(
            "volume factor must be >= 0, got {}",
            profile.volume
        )));
    }
    Ok(())
}

/// Resample to `new_len` evenly spaced positions over `[0, len-1]` with
/// linear interpolation. Endpoints are included, so the first and last
/// output samples equal the first and last input samples.
fn resample_linear(samples: &[f32], new_len: usize) -> Vec<f32> {
    if new_len == 0 || samples.is_empty() {
        return Vec::new();
    }
    if samples.len() == 1 || new_len == 1 {
        return vec![samples[0]; new_len];
    }

    let last = (samples.len() - 1) as f64;
    let step = last / (new_len - 1) as f64;
    let mut output = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let position = step * i as f64;
        let index = position.floor() as usize;
        let fraction = position - index as f64;
        let value = if index + 1 < samples.len() {
            samples[index] as f64 * (1.0 - fraction) + samples[index + 1] as f64 * fraction
        } else {
            samples[samples.len() - 1] as f64
        };
        output.push(value as f32);
    }
    output
}
