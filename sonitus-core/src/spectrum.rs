//! Zero-centered magnitude spectrum of an analysis frame.
//!
//! ## Contract
//!
//! The transform length equals the frame length (no zero padding and no
//! window), magnitudes are expressed in dB as `20 * log10(|X|)`, and the
//! bin order is rotated so zero frequency sits at the center of an axis
//! running from `-rate/2` to `+rate/2` inclusive, one point per bin.
//!
//! A bin with zero magnitude maps to `-inf` dB. That is a real
//! discontinuity of the dB scale and is deliberately not special-cased
//! here; consumers that cannot represent it (the chart renderer, for one)
//! clamp at presentation time.

use rustfft::{num_complex::Complex, FftPlanner};

/// Magnitude spectrum with its frequency axis.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Frequencies in Hz, linearly spaced from `-rate/2` to `+rate/2`.
    pub freqs_hz: Vec<f64>,
    /// Magnitudes in dB, zero frequency at the center. May contain `-inf`
    /// for zero-magnitude bins.
    pub magnitude_db: Vec<f64>,
}

impl Spectrum {
    /// Compute the spectrum of `frame` sampled at `sample_rate`.
    ///
    /// An empty frame yields an empty spectrum.
    pub fn compute(frame: &[f64], sample_rate: u32) -> Self {
        let n = frame.len();
        if n == 0 {
            return Self {
                freqs_hz: Vec::new(),
                magnitude_db: Vec::new(),
            };
        }

        let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
        let mut buf: Vec<Complex<f64>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buf);

        let mut magnitude_db: Vec<f64> = buf.iter().map(|c| 20.0 * c.norm().log10()).collect();
        // Swap halves so the zero-frequency bin lands at the center index.
        magnitude_db.rotate_left(n.div_ceil(2));

        let half = f64::from(sample_rate / 2);
        let freqs_hz = linspace(-half, half, n);

        Self {
            freqs_hz,
            magnitude_db,
        }
    }
}

/// `n` points from `start` to `end` inclusive.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine_frame(freq_hz: f64, rate: u32, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn axis_spans_nyquist_symmetrically() {
        let frame = sine_frame(1000.0, 8000, 200);
        let spectrum = Spectrum::compute(&frame, 8000);
        assert_eq!(spectrum.freqs_hz.len(), 200);
        assert_eq!(spectrum.magnitude_db.len(), 200);
        assert_relative_eq!(spectrum.freqs_hz[0], -4000.0);
        assert_relative_eq!(spectrum.freqs_hz[199], 4000.0);
    }

    #[test]
    fn sine_peaks_at_its_frequency() {
        // 1 kHz at 8 kHz over 200 samples: bin spacing is 40 Hz
        let frame = sine_frame(1000.0, 8000, 200);
        let spectrum = Spectrum::compute(&frame, 8000);

        let (peak_freq, _) = spectrum
            .freqs_hz
            .iter()
            .zip(&spectrum.magnitude_db)
            .filter(|(f, _)| **f > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert!(
            (peak_freq - 1000.0).abs() <= 41.0,
            "peak at {peak_freq} Hz, expected near 1000"
        );
    }

    #[test]
    fn spectrum_is_symmetric_for_real_input() {
        // A ramp keeps every bin well above the numerical noise floor, so
        // the dB values can be compared tightly.
        let frame: Vec<f64> = (0..200).map(|i| 0.3 + 0.01 * i as f64).collect();
        let spectrum = Spectrum::compute(&frame, 8000);

        // A real signal's magnitude is even in frequency. With n = 200 the
        // DC bin sits at index 100; mirror pairs are (100 - k, 100 + k).
        for k in 1..99 {
            assert_relative_eq!(
                spectrum.magnitude_db[100 - k],
                spectrum.magnitude_db[100 + k],
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn dc_frame_peaks_at_center() {
        let frame = vec![1.0; 64];
        let spectrum = Spectrum::compute(&frame, 8000);

        let peak_idx = spectrum
            .magnitude_db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_idx, 32);
    }

    #[test]
    fn zero_frame_is_all_negative_infinity() {
        let spectrum = Spectrum::compute(&[0.0; 50], 8000);
        assert!(spectrum
            .magnitude_db
            .iter()
            .all(|m| m.is_infinite() && m.is_sign_negative()));
    }

    #[test]
    fn empty_frame_yields_empty_spectrum() {
        let spectrum = Spectrum::compute(&[], 8000);
        assert!(spectrum.freqs_hz.is_empty());
        assert!(spectrum.magnitude_db.is_empty());
    }

    #[test]
    fn linspace_endpoints_inclusive() {
        let points = linspace(-4000.0, 4000.0, 5);
        assert_eq!(points, vec![-4000.0, -2000.0, 0.0, 2000.0, 4000.0]);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
