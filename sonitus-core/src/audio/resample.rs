//! Sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Recordings are decoded at whatever rate their WAV header declares, then
//! brought to the load rate, and later to the analysis rate for spectral
//! work. Unlike a live capture path there is no streaming constraint: the
//! whole signal is available up front, so the converter feeds rubato
//! fixed-size chunks, flushes the final partial chunk, drains the filter
//! delay, and trims the output to the exact `round(len * ratio)` length.
//! Offline conversions are therefore sample-count exact.
//!
//! When the rates already match the input is cloned unchanged; no rubato
//! session is created at all.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{Result, SonitusError};
use crate::signal::Signal;

/// Input frame count per rubato call.
const CHUNK_SIZE: usize = 1024;

/// Convert `signal` to `target_rate`, returning a new `Signal`.
///
/// The output holds exactly `round(len * target_rate / source_rate)`
/// samples; an empty input yields an empty output at the target rate.
///
/// # Errors
/// Returns `SonitusError::Resample` when rubato refuses the rate pair or
/// fails mid-stream.
pub fn resample(signal: &Signal, target_rate: u32) -> Result<Signal> {
    if signal.sample_rate == target_rate {
        return Ok(signal.clone());
    }
    if signal.is_empty() {
        return Ok(Signal::new(Vec::new(), target_rate));
    }

    let ratio = target_rate as f64 / signal.sample_rate as f64;
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio, no dynamic adjustment
        PolynomialDegree::Cubic,
        CHUNK_SIZE,
        1, // mono
    )
    .map_err(|e| SonitusError::Resample(format!("init: {e}")))?;

    let expected = (signal.samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
    let mut out: Vec<f32> = Vec::with_capacity(expected + CHUNK_SIZE);

    let mut pos = 0;
    while signal.samples.len() - pos >= CHUNK_SIZE {
        let input_slice = &signal.samples[pos..pos + CHUNK_SIZE];
        let (_consumed, produced) = resampler
            .process_into_buffer(&[input_slice], &mut output_buf, None)
            .map_err(|e| SonitusError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buf[0][..produced]);
        pos += CHUNK_SIZE;
    }

    // Flush the final partial chunk, then keep draining until the delayed
    // tail has come out.
    let tail = &signal.samples[pos..];
    if !tail.is_empty() {
        let (_consumed, produced) = resampler
            .process_partial_into_buffer(Some(&[tail]), &mut output_buf, None)
            .map_err(|e| SonitusError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buf[0][..produced]);
    }
    while out.len() < expected + delay {
        let (_consumed, produced) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output_buf, None)
            .map_err(|e| SonitusError::Resample(e.to_string()))?;
        if produced == 0 {
            break;
        }
        out.extend_from_slice(&output_buf[0][..produced]);
    }

    // Drop the filter delay and pin the length.
    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    if out.len() < expected {
        out.resize(expected, 0.0);
    }

    Ok(Signal::new(out, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, rate: u32) -> Signal {
        Signal::new((0..len).map(|i| i as f32 * 0.001).collect(), rate)
    }

    #[test]
    fn passthrough_identity() {
        let signal = ramp(480, 16_000);
        let out = resample(&signal, 16_000).unwrap();
        assert_eq!(out.samples, signal.samples);
        assert_eq!(out.sample_rate, 16_000);
    }

    #[test]
    fn downsample_length_exact() {
        // 22050 samples at 22.05 kHz -> exactly 8000 at 8 kHz
        let signal = Signal::new(vec![0.25f32; 22_050], 22_050);
        let out = resample(&signal, 8_000).unwrap();
        assert_eq!(out.samples.len(), 8_000);
        assert_eq!(out.sample_rate, 8_000);
    }

    #[test]
    fn upsample_length_exact() {
        let signal = Signal::new(vec![0.25f32; 8_000], 8_000);
        let out = resample(&signal, 22_050).unwrap();
        assert_eq!(out.samples.len(), 22_050);
    }

    #[test]
    fn shorter_than_one_chunk_still_converts() {
        // 1000 samples < CHUNK_SIZE exercises the partial-flush path alone
        let signal = ramp(1000, 22_050);
        let out = resample(&signal, 8_000).unwrap();
        let expected = (1000.0 * 8_000.0 / 22_050.0_f64).round() as usize;
        assert_eq!(out.samples.len(), expected);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let signal = Signal::new(Vec::new(), 44_100);
        let out = resample(&signal, 8_000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate, 8_000);
    }

    #[test]
    fn dc_level_survives_conversion() {
        let signal = Signal::new(vec![0.5f32; 22_050], 22_050);
        let out = resample(&signal, 8_000).unwrap();
        // Interior samples should sit at the DC level; edges may ring a little
        let interior = &out.samples[100..out.samples.len() - 100];
        for &s in interior {
            assert!((s - 0.5).abs() < 0.01, "sample {s} strayed from DC level");
        }
    }
}
