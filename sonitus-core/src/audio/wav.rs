//! WAV decoding via hound.

use std::path::Path;

use tracing::debug;

use crate::error::{Result, SonitusError};
use crate::signal::Signal;

/// Decode a WAV file to a mono `Signal` at the file's native sample rate.
///
/// Integer samples are scaled by their full-scale value to f32 in
/// [-1.0, 1.0]; multi-channel audio is mixed down by averaging across
/// channels.
///
/// # Errors
/// Returns `SonitusError::Decode` when the file cannot be opened, is not
/// a WAV, or uses a sample format hound does not support.
pub fn decode(path: &Path) -> Result<Signal> {
    let reader = hound::WavReader::open(path).map_err(|e| decode_err(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| decode_err(path, e))?,
        (hound::SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| decode_err(path, e))?
        }
        (format, bits) => {
            return Err(SonitusError::Decode {
                path: path.to_path_buf(),
                reason: format!("unsupported sample format {format:?} at {bits} bits"),
            })
        }
    };

    let samples = mix_to_mono(&interleaved, channels);
    debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels,
        samples = samples.len(),
        "decoded wav"
    );
    Ok(Signal::new(samples, spec.sample_rate))
}

fn decode_err(path: &Path, e: hound::Error) -> SonitusError {
    SonitusError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Average interleaved channels down to one.
fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
