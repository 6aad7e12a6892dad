//! Linear-predictive spectral envelope estimation.
//!
//! ## Algorithm
//!
//! 1. Biased autocorrelation of the analysis frame at lags `0..=order`.
//! 2. The Levinson-Durbin recursion solves the normal equations, giving
//!    `order + 1` coefficients with `a[0] = 1` in O(order^2) time and
//!    O(order) space.
//! 3. The one-step predictor `[0, -a[1], .., -a[order]]` applied as an
//!    FIR filter (zero initial state) estimates each sample from its
//!    predecessors; the root sum of squares of the prediction residual is
//!    the model gain.
//! 4. `gain / A(z)` evaluated on the unit circle at an arbitrary
//!    frequency grid gives the spectral envelope in dB, bin-for-bin
//!    comparable with [`crate::spectrum::Spectrum`].
//!
//! A silent frame makes the normal equations singular. Rather than
//! surfacing a numeric fault, the fit falls back to the identity
//! predictor `a = [1, 0, .., 0]` with zero gain, and the recursion stops
//! early if a reflection coefficient leaves the stability region, keeping
//! the coefficients found so far. No NaN ever propagates out of a fit.

use rustfft::num_complex::Complex;
use tracing::warn;

use crate::error::{Result, SonitusError};

/// An all-pole model `gain / A(z)` of one analysis frame.
#[derive(Debug, Clone)]
pub struct LpcModel {
    /// Denominator coefficients `a[0..=order]`, with `a[0] == 1`.
    pub coefficients: Vec<f64>,
    /// Root sum of squares of the prediction residual. Non-negative.
    pub gain: f64,
}

impl LpcModel {
    /// Fit an order-`order` all-pole model to `frame`.
    ///
    /// # Errors
    /// Returns `SonitusError::InvalidOrder` unless
    /// `1 <= order < frame.len()`.
    pub fn fit(frame: &[f64], order: usize) -> Result<Self> {
        if order == 0 || order >= frame.len() {
            return Err(SonitusError::InvalidOrder {
                order,
                frame_len: frame.len(),
            });
        }

        let r = autocorrelation(frame, order);
        let coefficients = levinson_durbin(&r, order);
        let residual = residual(frame, &coefficients);
        let gain = residual.iter().map(|e| e * e).sum::<f64>().sqrt();

        Ok(Self { coefficients, gain })
    }

    /// Prediction order of this model.
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// FIR one-step prediction of each frame sample from its `order`
    /// predecessors, with zero initial state.
    pub fn predict(&self, frame: &[f64]) -> Vec<f64> {
        predict(frame, &self.coefficients)
    }

    /// Prediction residual `frame - predict(frame)`. By construction the
    /// residual added back to the prediction reconstructs the frame.
    pub fn residual(&self, frame: &[f64]) -> Vec<f64> {
        residual(frame, &self.coefficients)
    }

    /// Evaluate the envelope magnitude in dB at each frequency of
    /// `freqs_hz` for a signal sampled at `sample_rate`.
    ///
    /// Follows the dB convention of [`crate::spectrum::Spectrum`]: a
    /// zero-gain model maps to `-inf` across the whole axis.
    pub fn envelope_db(&self, freqs_hz: &[f64], sample_rate: u32) -> Vec<f64> {
        let fs = f64::from(sample_rate);
        freqs_hz
            .iter()
            .map(|&f| {
                let omega = 2.0 * std::f64::consts::PI * f / fs;
                // A(e^{jw}) = sum_k a[k] * e^{-jwk}
                let mut a_z = Complex::new(0.0, 0.0);
                for (k, &coef) in self.coefficients.iter().enumerate() {
                    let phase = -omega * k as f64;
                    a_z += coef * Complex::new(phase.cos(), phase.sin());
                }
                20.0 * (self.gain / a_z.norm()).log10()
            })
            .collect()
    }
}

/// Biased autocorrelation `r[lag] = sum_n x[n] * x[n + lag]` for
/// `lag = 0..=max_lag`. No normalization and no window is applied.
pub fn autocorrelation(x: &[f64], max_lag: usize) -> Vec<f64> {
    (0..=max_lag)
        .map(|lag| x.iter().zip(&x[lag.min(x.len())..]).map(|(a, b)| a * b).sum())
        .collect()
}

/// Solve the order-`order` normal equations for autocorrelation `r` by
/// the Levinson-Durbin recursion.
///
/// Degenerate systems never panic or produce NaN: a non-positive zero-lag
/// term yields the identity predictor outright, and the recursion stops
/// early (keeping the coefficients found so far) when the prediction
/// error reaches zero or a reflection coefficient leaves `(-1, 1)`.
fn levinson_durbin(r: &[f64], order: usize) -> Vec<f64> {
    let mut a = vec![0.0; order + 1];
    a[0] = 1.0;

    if r[0] <= 0.0 || !r[0].is_finite() {
        warn!(r0 = r[0], "singular autocorrelation, identity predictor fallback");
        return a;
    }

    let mut err = r[0];
    for i in 1..=order {
        let mut acc = r[i];
        for j in 1..i {
            acc += a[j] * r[i - j];
        }
        let k = -acc / err;
        if !k.is_finite() || k.abs() >= 1.0 {
            // The frame is already predicted as well as float precision
            // allows; higher orders would only amplify noise.
            break;
        }

        let a_prev = a.clone();
        a[i] = k;
        for j in 1..i {
            a[j] = a_prev[j] + k * a_prev[i - j];
        }
        err *= 1.0 - k * k;
        if err <= 0.0 {
            break;
        }
    }
    a
}

fn predict(frame: &[f64], coefficients: &[f64]) -> Vec<f64> {
    let order = coefficients.len() - 1;
    (0..frame.len())
        .map(|n| {
            let mut predicted = 0.0;
            for k in 1..=order.min(n) {
                predicted += -coefficients[k] * frame[n - k];
            }
            predicted
        })
        .collect()
}

fn residual(frame: &[f64], coefficients: &[f64]) -> Vec<f64> {
    predict(frame, coefficients)
        .iter()
        .zip(frame)
        .map(|(p, x)| x - p)
        .collect()
}
