//! YIN pitch estimator (de Cheveigne and Kawahara, 2002).
//!
//! ## Algorithm (per frame)
//!
//! 1. Difference function `d(tau) = sum_j (x[j] - x[j + tau])^2` over the
//!    first half of the frame, for lags covering the configured range.
//! 2. Cumulative-mean normalization
//!    `d'(tau) = d(tau) * tau / sum_{1..=tau} d(j)`, with `d'(0) = 1`,
//!    which removes the bias toward short lags.
//! 3. Absolute threshold: walk lags from the shortest period upward and
//!    take the bottom of the first trough that dips below the threshold.
//!    When nothing dips below it, the global minimum over the search
//!    range is used instead.
//! 4. Parabolic interpolation around the winning lag refines the period
//!    to sub-sample precision; `f0 = rate / tau`.
//!
//! A frame whose cumulative difference is zero (silence, or any constant
//! input) has no defined normalization and yields an unvoiced `None`.

use tracing::debug;

use super::{midi_note_hz, F0Frame, PitchTracker, MIDI_C2, MIDI_C7};
use crate::error::{Result, SonitusError};
use crate::signal::Signal;

/// Parameters for the YIN estimator.
#[derive(Debug, Clone)]
pub struct YinConfig {
    /// Analysis frame length in samples. Default: `1024`.
    pub frame_length: usize,
    /// Hop between frame starts in samples. Default: `frame_length / 4`.
    pub hop_length: usize,
    /// Lower bound of the search range in Hz. Default: C2 (about 65 Hz).
    pub fmin_hz: f64,
    /// Upper bound of the search range in Hz. Default: C7 (about 2093 Hz).
    pub fmax_hz: f64,
    /// Absolute threshold on the normalized difference. Default: `0.1`.
    pub threshold: f64,
}

impl Default for YinConfig {
    fn default() -> Self {
        let frame_length = 1024;
        Self {
            frame_length,
            hop_length: frame_length / 4,
            fmin_hz: midi_note_hz(MIDI_C2),
            fmax_hz: midi_note_hz(MIDI_C7),
            threshold: 0.1,
        }
    }
}

/// YIN estimator. Stateless between frames; owns its configuration.
#[derive(Debug, Clone, Default)]
pub struct Yin {
    config: YinConfig,
}

impl Yin {
    pub fn new(config: YinConfig) -> Self {
        Self { config }
    }
}

impl PitchTracker for Yin {
    fn track(&mut self, signal: &Signal) -> Result<Vec<F0Frame>> {
        let cfg = &self.config;
        if cfg.frame_length < 4 || cfg.hop_length == 0 {
            return Err(SonitusError::InvalidPitchConfig(format!(
                "frame_length {} / hop_length {} cannot frame a signal",
                cfg.frame_length, cfg.hop_length
            )));
        }
        if !(0.0 < cfg.fmin_hz && cfg.fmin_hz < cfg.fmax_hz) {
            return Err(SonitusError::InvalidPitchRange {
                fmin_hz: cfg.fmin_hz,
                fmax_hz: cfg.fmax_hz,
                sample_rate: signal.sample_rate,
            });
        }

        let sr = f64::from(signal.sample_rate);
        let win = cfg.frame_length / 2;
        // Period bounds in samples, clamped to the lags the difference
        // window can actually reach.
        let tau_min = ((sr / cfg.fmax_hz).floor() as usize).max(1);
        let tau_max = ((sr / cfg.fmin_hz).ceil() as usize).min(win.saturating_sub(1));
        if tau_min >= tau_max {
            return Err(SonitusError::InvalidPitchRange {
                fmin_hz: cfg.fmin_hz,
                fmax_hz: cfg.fmax_hz,
                sample_rate: signal.sample_rate,
            });
        }

        let mut frames = Vec::new();
        let mut frame = vec![0.0f64; cfg.frame_length];
        let mut start = 0;
        while start + cfg.frame_length <= signal.samples.len() {
            for (dst, src) in frame
                .iter_mut()
                .zip(&signal.samples[start..start + cfg.frame_length])
            {
                *dst = f64::from(*src);
            }
            frames.push(F0Frame {
                time_secs: start as f64 / sr,
                f0_hz: estimate_frame(&frame, win, tau_min, tau_max, cfg.threshold, sr),
            });
            start += cfg.hop_length;
        }

        debug!(
            frames = frames.len(),
            voiced = frames.iter().filter(|f| f.f0_hz.is_some()).count(),
            "pitch track complete"
        );
        Ok(frames)
    }
}

/// Run steps 1-4 on a single frame.
fn estimate_frame(
    frame: &[f64],
    win: usize,
    tau_min: usize,
    tau_max: usize,
    threshold: f64,
    sample_rate: f64,
) -> Option<f64> {
    // Difference function for lags 1..=tau_max.
    let mut diff = vec![0.0; tau_max + 1];
    for (tau, d) in diff.iter_mut().enumerate().skip(1) {
        let mut acc = 0.0;
        for j in 0..win {
            let delta = frame[j] - frame[j + tau];
            acc += delta * delta;
        }
        *d = acc;
    }

    // Cumulative-mean-normalized difference; d'(0) = 1 by definition.
    let mut cmndf = vec![1.0; tau_max + 1];
    let mut running_sum = 0.0;
    for tau in 1..=tau_max {
        running_sum += diff[tau];
        if running_sum > 0.0 {
            cmndf[tau] = diff[tau] * tau as f64 / running_sum;
        }
    }
    if running_sum <= 0.0 {
        // Constant frame: every lag predicts perfectly, nothing is voiced.
        return None;
    }

    // First trough below the threshold, descended to its bottom.
    let mut best_tau = None;
    let mut tau = tau_min;
    while tau <= tau_max {
        if cmndf[tau] < threshold {
            while tau + 1 <= tau_max && cmndf[tau + 1] < cmndf[tau] {
                tau += 1;
            }
            best_tau = Some(tau);
            break;
        }
        tau += 1;
    }
    // Nothing dipped below the threshold: take the global minimum over
    // the search range instead of declaring the frame unvoiced.
    let tau = best_tau.unwrap_or_else(|| {
        (tau_min..=tau_max)
            .min_by(|&a, &b| cmndf[a].total_cmp(&cmndf[b]))
            .unwrap_or(tau_min)
    });

    Some(sample_rate / refine_parabolic(&cmndf, tau, tau_min, tau_max))
}

/// Fit a parabola through the normalized difference at `tau - 1`, `tau`,
/// `tau + 1` and return the abscissa of its vertex, clamped to half a lag
/// either side.
fn refine_parabolic(cmndf: &[f64], tau: usize, tau_min: usize, tau_max: usize) -> f64 {
    if tau <= tau_min || tau >= tau_max {
        return tau as f64;
    }
    let (left, mid, right) = (cmndf[tau - 1], cmndf[tau], cmndf[tau + 1]);
    let denom = left - 2.0 * mid + right;
    if denom.abs() < 1e-12 {
        return tau as f64;
    }
    let delta = 0.5 * (left - right) / denom;
    tau as f64 + delta.clamp(-0.5, 0.5)
}
