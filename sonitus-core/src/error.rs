use thiserror::Error;

/// All errors produced by sonitus-core.
#[derive(Debug, Error)]
pub enum SonitusError {
    #[error("failed to decode {path}: {reason}")]
    Decode {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("resampler error: {0}")]
    Resample(String),

    #[error("prediction order {order} is invalid for a frame of {frame_len} samples")]
    InvalidOrder { order: usize, frame_len: usize },

    #[error("pitch search range {fmin_hz}..{fmax_hz} Hz is empty at {sample_rate} Hz")]
    InvalidPitchRange {
        fmin_hz: f64,
        fmax_hz: f64,
        sample_rate: u32,
    },

    #[error("pitch tracker configuration error: {0}")]
    InvalidPitchConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SonitusError>;
