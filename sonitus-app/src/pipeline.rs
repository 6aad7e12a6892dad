//! Sequential batch pipeline.
//!
//! ## Stages (per recording)
//!
//! ```text
//! decode WAV at native rate -> resample to the load rate
//!   WholeDigit -> waveform figure
//!   Segment    -> pitch report (voiced only, at the load rate)
//!              -> resample to the analysis rate -> midpoint frame
//!              -> magnitude spectrum figure
//!              -> spectrum + LPC envelope overlay figure
//!              -> normalized autocorrelation figure
//! ```
//!
//! Failures are isolated per file: the error is logged with its path and
//! counted, and the batch moves on. Only startup conditions (bad config,
//! unreadable input directory, unwritable output root) abort the run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tiny_skia::Color;
use tracing::{debug, info, warn};

use sonitus_core::signal::FRAME_DIVISOR;
use sonitus_core::{
    analysis_frame, audio, lpc, LpcModel, PitchStats, PitchTracker, Signal, Spectrum, Yin,
};

use crate::discover::{discover, Recording, RecordingKind, Voicing};
use crate::render::{series_color, Figure};
use crate::report::{FileOutcome, RunSummary};

/// Everything one batch needs, assembled by `main` from the CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Rate recordings are brought to after decoding (Hz).
    pub orig_sr: u32,
    /// Rate used for spectral analysis (Hz).
    pub target_sr: u32,
    /// LPC orders overlaid on the spectrum, one series each.
    pub model_orders: Vec<usize>,
    pub recordings_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Output category directories, created before processing starts.
struct OutputDirs {
    waveforms: PathBuf,
    spectra: PathBuf,
    spectra_with_lpc: PathBuf,
    autocorrelation: PathBuf,
}

impl OutputDirs {
    fn create(root: &Path) -> Result<Self> {
        let dirs = Self {
            waveforms: root.join("waveforms"),
            spectra: root.join("spectra"),
            spectra_with_lpc: root.join("spectra_with_lpc"),
            autocorrelation: root.join("autocorrelation"),
        };
        for dir in [
            &dirs.waveforms,
            &dirs.spectra,
            &dirs.spectra_with_lpc,
            &dirs.autocorrelation,
        ] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
        }
        Ok(dirs)
    }
}

/// Run the whole batch and return its summary.
///
/// # Errors
/// Only fail-fast startup conditions error out; per-file analysis
/// failures are recorded in the summary instead.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    validate(config)?;
    let dirs = OutputDirs::create(&config.output_dir)?;
    let discovered = discover(&config.recordings_dir)?;
    info!(
        recordings = discovered.recordings.len(),
        skipped = discovered.skipped,
        "discovery complete"
    );

    let mut summary = RunSummary {
        discovered: discovered.recordings.len(),
        skipped: discovered.skipped,
        ..RunSummary::default()
    };

    for recording in &discovered.recordings {
        match process(recording, config, &dirs, &mut summary) {
            Ok(outcome) => {
                summary.processed += 1;
                summary.files.push(outcome);
            }
            Err(e) => {
                warn!(path = %recording.path.display(), "recording failed: {e:#}");
                summary.failed += 1;
                summary.files.push(FileOutcome {
                    file: recording.path.display().to_string(),
                    digit: recording.digit.clone(),
                    category: category_name(&recording.kind).to_owned(),
                    ok: false,
                    error: Some(format!("{e:#}")),
                    mean_f0_hz: None,
                    pitch_period_secs: None,
                });
            }
        }
    }

    Ok(summary)
}

fn validate(config: &RunConfig) -> Result<()> {
    if config.orig_sr == 0 || config.target_sr == 0 {
        bail!("sample rates must be positive");
    }
    let frame_len = (config.target_sr / FRAME_DIVISOR) as usize;
    if frame_len < 2 {
        bail!(
            "analysis rate {} Hz cannot form a 25 ms frame",
            config.target_sr
        );
    }
    if config.model_orders.is_empty() {
        bail!("at least one model order is required");
    }
    for &order in &config.model_orders {
        if order == 0 || order >= frame_len {
            bail!(
                "model order {order} does not fit the {frame_len}-sample analysis frame at {} Hz",
                config.target_sr
            );
        }
    }
    Ok(())
}

fn process(
    recording: &Recording,
    config: &RunConfig,
    dirs: &OutputDirs,
    summary: &mut RunSummary,
) -> Result<FileOutcome> {
    let decoded = audio::wav::decode(&recording.path)?;
    let loaded = audio::resample::resample(&decoded, config.orig_sr)?;
    debug!(
        path = %recording.path.display(),
        secs = loaded.duration_secs(),
        "recording loaded"
    );

    let mut outcome = FileOutcome {
        file: recording.path.display().to_string(),
        digit: recording.digit.clone(),
        category: category_name(&recording.kind).to_owned(),
        ok: true,
        error: None,
        mean_f0_hz: None,
        pitch_period_secs: None,
    };

    match &recording.kind {
        RecordingKind::WholeDigit => {
            let path = render_waveform(&loaded, &recording.digit, &dirs.waveforms)?;
            summary.waveform_plots += 1;
            info!(path = %path.display(), "waveform plot written");
        }
        RecordingKind::Segment { voicing, letter } => {
            if *voicing == Voicing::Voiced {
                let stats = report_pitch(&loaded, &recording.digit, *voicing, letter)?;
                summary.pitch_reports += 1;
                if let Some(stats) = stats {
                    outcome.mean_f0_hz = Some(stats.mean_f0_hz);
                    outcome.pitch_period_secs = Some(stats.period_secs);
                }
            }

            let analysed = audio::resample::resample(&loaded, config.target_sr)?;
            let frame = analysis_frame(&analysed);
            if frame.is_empty() {
                bail!("analysis frame is empty (recording too short)");
            }
            let spectrum = Spectrum::compute(&frame, config.target_sr);

            render_spectrum(&spectrum, &recording.digit, *voicing, letter, &dirs.spectra)?;
            summary.spectrum_plots += 1;
            render_spectrum_with_envelopes(
                &spectrum,
                &frame,
                config,
                &recording.digit,
                *voicing,
                letter,
                &dirs.spectra_with_lpc,
            )?;
            summary.envelope_plots += 1;
            render_autocorrelation(
                &frame,
                config.target_sr,
                &recording.digit,
                *voicing,
                letter,
                &dirs.autocorrelation,
            )?;
            summary.autocorrelation_plots += 1;
            info!(digit = %recording.digit, letter = %letter, "segment plots written");
        }
    }

    Ok(outcome)
}

/// Track pitch over the loaded signal and print the report block.
fn report_pitch(
    signal: &Signal,
    digit: &str,
    voicing: Voicing,
    letter: &str,
) -> Result<Option<PitchStats>> {
    let mut tracker = Yin::default();
    let frames = tracker.track(signal)?;
    let stats = PitchStats::from_frames(&frames);

    println!(
        "Pitch period and F0 for {} {} in digit {}:\n",
        voicing.as_str(),
        letter,
        digit
    );
    match &stats {
        Some(stats) => {
            println!("fundamental freq: {}", stats.mean_f0_hz);
            println!("pitch period: {}", stats.period_secs);
            debug!(
                voiced = stats.voiced_frames,
                total = stats.total_frames,
                "pitch track summary"
            );
        }
        None => println!("no pitch detected"),
    }
    println!("----------------------------");

    Ok(stats)
}

fn render_waveform(signal: &Signal, digit: &str, dir: &Path) -> Result<PathBuf> {
    let rate = f64::from(signal.sample_rate);
    let times: Vec<f64> = (0..signal.samples.len()).map(|i| i as f64 / rate).collect();
    let amplitudes: Vec<f64> = signal.samples.iter().map(|&s| f64::from(s)).collect();

    let mut figure = Figure::new(format!("Waveform of digit {digit}"))
        .with_axis_labels("Time (s)", "Amplitude");
    figure.line(&times, &amplitudes, series_color(0), None);

    let path = waveform_path(dir, digit);
    figure.save(&path)?;
    Ok(path)
}

fn render_spectrum(
    spectrum: &Spectrum,
    digit: &str,
    voicing: Voicing,
    letter: &str,
    dir: &Path,
) -> Result<()> {
    let mut figure = Figure::new(format!(
        "Magnitude spectrum for {} '{}' in digit {}",
        voicing.as_str(),
        letter,
        digit
    ))
    .with_axis_labels("Frequency (Hz)", "Magnitude (dB)");
    figure.line(&spectrum.freqs_hz, &spectrum.magnitude_db, Color::BLACK, None);
    figure.save(&segment_plot_path(dir, "spectrum", digit, voicing, letter))
}

fn render_spectrum_with_envelopes(
    spectrum: &Spectrum,
    frame: &[f64],
    config: &RunConfig,
    digit: &str,
    voicing: Voicing,
    letter: &str,
    dir: &Path,
) -> Result<()> {
    let mut figure = Figure::new(format!(
        "Magnitude spectrum for {} '{}' in digit {} with LPC envelope",
        voicing.as_str(),
        letter,
        digit
    ))
    .with_axis_labels("Frequency (Hz)", "Magnitude (dB)");
    figure.line(&spectrum.freqs_hz, &spectrum.magnitude_db, Color::BLACK, None);

    for (index, &order) in config.model_orders.iter().enumerate() {
        let model = LpcModel::fit(frame, order)?;
        debug!(order, gain = model.gain, "fitted all-pole model");
        let envelope = model.envelope_db(&spectrum.freqs_hz, config.target_sr);
        figure.line(
            &spectrum.freqs_hz,
            &envelope,
            series_color(index),
            Some(&format!("LPC order {order}")),
        );
    }

    figure.save(&segment_plot_path(dir, "spectrum", digit, voicing, letter))
}

fn render_autocorrelation(
    frame: &[f64],
    sample_rate: u32,
    digit: &str,
    voicing: Voicing,
    letter: &str,
    dir: &Path,
) -> Result<()> {
    let r = lpc::autocorrelation(frame, frame.len().saturating_sub(1));
    let r0 = r.first().copied().unwrap_or(0.0);
    // A silent frame has r0 = 0; plot a flat zero line instead of 0/0
    let normalized: Vec<f64> = if r0 > 0.0 {
        r.iter().map(|v| v / r0).collect()
    } else {
        vec![0.0; r.len()]
    };
    let lags_ms: Vec<f64> = (0..r.len())
        .map(|lag| lag as f64 * 1000.0 / f64::from(sample_rate))
        .collect();

    let mut figure = Figure::new(format!(
        "Autocorrelation for {} '{}' in digit {}",
        voicing.as_str(),
        letter,
        digit
    ))
    .with_axis_labels("Lag (ms)", "r(lag) / r(0)");
    figure.line(&lags_ms, &normalized, series_color(0), None);
    figure.save(&segment_plot_path(dir, "autocorr", digit, voicing, letter))
}

pub(crate) fn waveform_path(dir: &Path, digit: &str) -> PathBuf {
    dir.join(format!("waveform{digit}.png"))
}

pub(crate) fn segment_plot_path(
    dir: &Path,
    prefix: &str,
    digit: &str,
    voicing: Voicing,
    letter: &str,
) -> PathBuf {
    dir.join(format!("{prefix}_{digit}_{}_{letter}.png", voicing.as_str()))
}

fn category_name(kind: &RecordingKind) -> &'static str {
    match kind {
        RecordingKind::WholeDigit => "whole",
        RecordingKind::Segment { .. } => "segment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn write_sine_wav(path: &Path, freq_hz: f64, rate: u32, duration_secs: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let n = (rate as f64 * duration_secs) as usize;
        for i in 0..n {
            let t = i as f64 / rate as f64;
            writer
                .write_sample((2.0 * PI * freq_hz * t).sin() as f32)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    fn test_config(root: &Path) -> RunConfig {
        RunConfig {
            orig_sr: 22_050,
            target_sr: 8_000,
            model_orders: vec![12],
            recordings_dir: root.join("recordings"),
            output_dir: root.join("output"),
        }
    }

    #[test]
    fn batch_produces_plots_and_pitch() {
        let dir = tempfile::tempdir().unwrap();
        let recordings = dir.path().join("recordings");
        std::fs::create_dir_all(&recordings).unwrap();
        write_sine_wav(&recordings.join("3.wav"), 220.0, 22_050, 0.5);
        write_sine_wav(&recordings.join("2_voiced_oo.wav"), 150.0, 22_050, 0.8);
        write_sine_wav(&recordings.join("6_voiceless_s.wav"), 900.0, 22_050, 0.5);

        let summary = run(&test_config(dir.path())).unwrap();

        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.waveform_plots, 1);
        assert_eq!(summary.spectrum_plots, 2);
        assert_eq!(summary.envelope_plots, 2);
        assert_eq!(summary.autocorrelation_plots, 2);
        assert_eq!(summary.pitch_reports, 1);

        let out = dir.path().join("output");
        assert!(out.join("waveforms/waveform3.png").exists());
        assert!(out.join("spectra/spectrum_2_voiced_oo.png").exists());
        assert!(out.join("spectra_with_lpc/spectrum_2_voiced_oo.png").exists());
        assert!(out.join("autocorrelation/autocorr_2_voiced_oo.png").exists());
        assert!(out.join("spectra/spectrum_6_voiceless_s.png").exists());
        assert!(!out.join("waveforms/waveform2.png").exists());

        let voiced = summary.files.iter().find(|f| f.digit == "2").unwrap();
        let f0 = voiced.mean_f0_hz.unwrap();
        assert!((f0 - 150.0).abs() / 150.0 < 0.05, "mean f0 = {f0}");
        let voiceless = summary.files.iter().find(|f| f.digit == "6").unwrap();
        assert!(voiceless.mean_f0_hz.is_none());
    }

    #[test]
    fn corrupt_file_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let recordings = dir.path().join("recordings");
        std::fs::create_dir_all(&recordings).unwrap();
        write_sine_wav(&recordings.join("5.wav"), 220.0, 22_050, 0.4);
        std::fs::write(recordings.join("9.wav"), b"definitely not audio").unwrap();

        let summary = run(&test_config(dir.path())).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        let failed = summary.files.iter().find(|f| !f.ok).unwrap();
        assert_eq!(failed.digit, "9");
        assert!(failed.error.is_some());
        assert!(dir.path().join("output/waveforms/waveform5.png").exists());
    }

    #[test]
    fn invalid_order_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("recordings")).unwrap();

        // The analysis frame is 200 samples at 8 kHz
        let mut config = test_config(dir.path());
        config.model_orders = vec![200];
        assert!(run(&config).is_err());

        config.model_orders = vec![0];
        assert!(run(&config).is_err());

        config.model_orders = Vec::new();
        assert!(run(&config).is_err());
    }

    #[test]
    fn short_recording_truncates_frame_and_reports_no_pitch() {
        // 40 ms: too short for one pitch frame, and the midpoint analysis
        // frame truncates to 160 samples, which must still fit order 12
        let dir = tempfile::tempdir().unwrap();
        let recordings = dir.path().join("recordings");
        std::fs::create_dir_all(&recordings).unwrap();
        write_sine_wav(&recordings.join("1_voiced_n.wav"), 180.0, 22_050, 0.04);

        let summary = run(&test_config(dir.path())).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.pitch_reports, 1);
        assert!(summary.files[0].mean_f0_hz.is_none());
        assert!(dir
            .path()
            .join("output/spectra/spectrum_1_voiced_n.png")
            .exists());
    }

    #[test]
    fn plot_paths_are_deterministic() {
        let dir = Path::new("out");
        assert_eq!(waveform_path(dir, "3"), Path::new("out/waveform3.png"));
        assert_eq!(
            segment_plot_path(dir, "spectrum", "2", Voicing::Voiced, "oo"),
            Path::new("out/spectrum_2_voiced_oo.png")
        );
        assert_eq!(
            segment_plot_path(dir, "autocorr", "6", Voicing::Voiceless, "th"),
            Path::new("out/autocorr_6_voiceless_th.png")
        );
    }
}
