//! Fundamental-frequency estimation.
//!
//! The `PitchTracker` trait is the primary extensibility point: swap in
//! `Yin` (default) or any future estimator without touching the
//! pipeline, which only consumes per-frame `F0Frame` values and reduces
//! them to a `PitchStats` summary.

pub mod yin;

pub use yin::{Yin, YinConfig};

use crate::error::Result;
use crate::signal::Signal;

/// MIDI note number of C2, the conventional floor of the speaking range.
pub const MIDI_C2: u8 = 36;
/// MIDI note number of C7, the conventional ceiling of the search range.
pub const MIDI_C7: u8 = 96;

/// Frequency in Hz of a MIDI note number (equal temperament, A4 = 440 Hz).
pub fn midi_note_hz(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((f64::from(note) - 69.0) / 12.0)
}

/// One analysis frame's fundamental-frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F0Frame {
    /// Start time of the frame in seconds.
    pub time_secs: f64,
    /// Estimated fundamental in Hz; `None` when the frame carries no
    /// measurable periodicity (silence or other degenerate input).
    pub f0_hz: Option<f64>,
}

/// Trait for all fundamental-frequency estimators.
///
/// Implementors may be stateful between frames of one signal, but each
/// `track` call stands alone.
pub trait PitchTracker: Send + 'static {
    /// Produce one `F0Frame` per analysis hop over `signal`.
    ///
    /// Returns an empty vector when the signal is shorter than one frame.
    ///
    /// # Errors
    /// Implementations reject configurations that cannot express their
    /// search range at the signal's sample rate.
    fn track(&mut self, signal: &Signal) -> Result<Vec<F0Frame>>;
}

/// Scalar summary of a pitch track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchStats {
    /// Arithmetic mean of the voiced frames' estimates, in Hz.
    pub mean_f0_hz: f64,
    /// Reciprocal of the mean fundamental, in seconds.
    pub period_secs: f64,
    /// Number of frames that produced an estimate.
    pub voiced_frames: usize,
    /// Total number of analysis frames.
    pub total_frames: usize,
}

impl PitchStats {
    /// Reduce a pitch track to its scalar summary.
    ///
    /// Returns `None` when no frame produced an estimate; the undefined
    /// mean and reciprocal are never formed, so callers get an explicit
    /// "no pitch detected" outcome instead of a NaN.
    pub fn from_frames(frames: &[F0Frame]) -> Option<Self> {
        let voiced: Vec<f64> = frames.iter().filter_map(|f| f.f0_hz).collect();
        if voiced.is_empty() {
            return None;
        }
        let mean_f0_hz = voiced.iter().sum::<f64>() / voiced.len() as f64;
        Some(Self {
            mean_f0_hz,
            period_secs: 1.0 / mean_f0_hz,
            voiced_frames: voiced.len(),
            total_frames: frames.len(),
        })
    }
}
