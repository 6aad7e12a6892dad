//! Typed audio signal passed between the loading and analysis stages.

use tracing::debug;

/// Analysis window divisor: `sample_rate / 40` samples is a 25 ms frame.
pub const FRAME_DIVISOR: u32 = 40;

/// A contiguous block of mono PCM samples at a known sample rate.
///
/// Derived signals (resampled, framed) are new values; a `Signal` is never
/// mutated in place once constructed.
#[derive(Debug, Clone)]
pub struct Signal {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g. 8000, 22050, 44100).
    pub sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Returns the duration of this signal in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the signal contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nominal analysis frame length at this rate: `sample_rate / 40`.
    pub fn frame_len(&self) -> usize {
        (self.sample_rate / FRAME_DIVISOR) as usize
    }
}

/// Extract the analysis frame from the temporal midpoint of `signal`.
///
/// The frame is `sample_rate / 40` samples (25 ms) starting at index
/// `len / 2`. When the signal ends before the window does, the frame is
/// truncated to whatever remains and the shortfall is logged at debug;
/// spectral and predictive analysis then operate on the shorter frame.
/// Samples are widened to f64 for analysis.
pub fn analysis_frame(signal: &Signal) -> Vec<f64> {
    let start = signal.samples.len() / 2;
    let want = signal.frame_len();
    let end = (start + want).min(signal.samples.len());
    let frame: Vec<f64> = signal.samples[start..end]
        .iter()
        .map(|&s| f64::from(s))
        .collect();
    if frame.len() < want {
        debug!(
            have = frame.len(),
            want, "analysis frame truncated by short signal"
        );
    }
    frame
}
