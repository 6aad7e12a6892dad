//! # sonitus-core
//!
//! Speech-analysis SDK for short spoken-digit recordings.
//!
//! ## Architecture
//!
//! ```text
//! WAV file → audio::wav::decode → Signal → audio::resample → Signal @ load rate
//!                                             │                    │
//!                                    pitch::Yin::track    audio::resample → @ analysis rate
//!                                             │                    │
//!                                        PitchStats       signal::analysis_frame
//!                                                                  │
//!                                                  Spectrum / LpcModel::envelope_db
//! ```
//!
//! All analysis operates on owned `Signal` values; nothing outside
//! `audio::wav` touches the filesystem.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod lpc;
pub mod pitch;
pub mod signal;
pub mod spectrum;

// Convenience re-exports for downstream crates
pub use error::{Result, SonitusError};
pub use lpc::LpcModel;
pub use pitch::{F0Frame, PitchStats, PitchTracker, Yin, YinConfig};
pub use signal::{analysis_frame, Signal};
pub use spectrum::Spectrum;
