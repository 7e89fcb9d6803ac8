//! Audio buffers, WAV I/O, and the tone-shaping transform.
//!
//! Everything here is deterministic: transforms return new buffers and never
//! mutate their input, so one shared reference clip can back any number of
//! rendered lines.

pub mod io;
pub mod transform;

/// A mono audio clip: samples at a fixed rate.
///
/// Sample values are conceptually bounded to `[-1.0, 1.0]`; every transform
/// that can push them outside that range clips its output.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Mono samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap raw samples at the given rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples in the clip.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the clip holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
