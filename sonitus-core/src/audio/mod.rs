//! Audio file decoding and sample-rate conversion.
//!
//! # Design
//!
//! Recordings enter the pipeline as WAV files. `wav::decode` normalizes
//! whatever hound reads (integer or float samples, any channel count) to
//! mono f32 in [-1.0, 1.0] at the file's native rate, and
//! `resample::resample` converts between that rate and the rates the
//! analysis wants. Both are narrow seams: everything downstream only ever
//! sees a `Signal`, so the analysis modules can be exercised with
//! synthetic vectors in tests.

pub mod resample;
pub mod wav;
