//! WAV reading and writing for reference clips and rendered lines.
//!
//! Multi-channel input is reduced to mono by taking the FIRST channel, a
//! fixed policy, chosen so the same input always yields the same reference
//! signal. Output is always 16-bit PCM mono.

use crate::audio::AudioBuffer;
use crate::error::{Result, TtsError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

#[derive(Debug, Default)]
pub struct WavIo;

impl WavIo {
    /// Read a WAV file into a mono [`AudioBuffer`].
    ///
    /// Multi-channel files contribute only their first channel. When
    /// `max_duration_seconds` is set and the decoded clip is longer, it is
    /// truncated to exactly `max_duration_seconds * sample_rate` leading
    /// samples.
    pub fn read_mono(
        path: impl AsRef<Path>,
        max_duration_seconds: Option<f64>,
    ) -> Result<AudioBuffer> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TtsError::AssetNotFound(path.to_path_buf()));
        }
        let mut reader =
            WavReader::open(path).map_err(|e| TtsError::Decode(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        let mut samples = Vec::new();

        match spec.sample_format {
            SampleFormat::Float => {
                for (idx, sample) in reader.samples::<f32>().enumerate() {
                    let value = sample.map_err(|e| TtsError::Decode(e.to_string()))?;
                    if idx % channels == 0 {
                        samples.push(value);
                    }
                }
            }
            SampleFormat::Int => {
                let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                for (idx, sample) in reader.samples::<i32>().enumerate() {
                    let value = sample.map_err(|e| TtsError::Decode(e.to_string()))?;
                    if idx % channels == 0 {
                        samples.push(value as f32 / max);
                    }
                }
            }
        }

        if let Some(limit) = max_duration_seconds {
            let max_samples = (limit * spec.sample_rate as f64) as usize;
            samples.truncate(max_samples);
        }

        Ok(AudioBuffer::new(samples, spec.sample_rate))
    }

    /// Write a mono buffer as a 16-bit PCM WAV file.
    ///
    /// Samples are clamped to `[-1.0, 1.0]` before integer scaling.
    pub fn write_mono(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: buffer.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer =
            WavWriter::create(path, spec).map_err(|e| TtsError::Decode(e.to_string()))?;
        for &value in &buffer.samples {
            let scaled = (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| TtsError::Decode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| TtsError::Decode(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::WavIo;
    use crate::audio::AudioBuffer;
    use crate::error::TtsError;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_stereo(path: &std::path::Path, left: &[f32], right: &[f32], rate: u32) {
        let spec = WavSpec {
            channels: 2,
            sample_rate: rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec).expect("create wav");
        for (l, r) in left.iter().zip(right) {
            writer.write_sample(*l).expect("write sample");
            writer.write_sample(*r).expect("write sample");
        }
        writer.finalize().expect("finalize");
    }

    #[test]
    fn missing_file_is_asset_not_found() {
        let err = WavIo::read_mono("does/not/exist.wav", None).unwrap_err();
        assert!(matches!(err, TtsError::AssetNotFound(_)));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"not a riff header").expect("write garbage");
        let err = WavIo::read_mono(&path, None).unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));
    }

    #[test]
    fn stereo_input_takes_first_channel() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");
        write_stereo(&path, &[0.1, 0.2, 0.3], &[0.9, 0.9, 0.9], 16000);

        let buffer = WavIo::read_mono(&path, None).expect("read");
        assert_eq!(buffer.sample_rate, 16000);
        assert_eq!(buffer.samples, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn duration_bound_truncates_leading_samples() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("long.wav");
        let buffer = AudioBuffer::new(vec![0.25; 32000], 16000);
        WavIo::write_mono(&path, &buffer).expect("write");

        let truncated = WavIo::read_mono(&path, Some(1.0)).expect("read");
        assert_eq!(truncated.len(), 16000);
    }

    #[test]
    fn mono_roundtrip_preserves_length_and_rate() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("mono.wav");
        let buffer = AudioBuffer::new(vec![0.0, 0.5, -0.25, 1.0], 24000);
        WavIo::write_mono(&path, &buffer).expect("write");

        let decoded = WavIo::read_mono(&path, None).expect("read");
        assert_eq!(decoded.sample_rate, 24000);
        assert_eq!(decoded.len(), 4);
        assert!((decoded.samples[1] - 0.5).abs() < 1e-3);
    }
}
