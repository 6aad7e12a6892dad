//! Machine-readable run summary.
//!
//! `sonitus --summary out.json` writes one of these after a batch so
//! results can be diffed across runs without scraping logs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Outcome of one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub digit: String,
    pub category: String,
    pub ok: bool,
    /// Error text when `ok` is false.
    pub error: Option<String>,
    /// Mean fundamental in Hz, present for voiced segments with a pitch.
    pub mean_f0_hz: Option<f64>,
    pub pitch_period_secs: Option<f64>,
}

/// Whole-run counters plus per-file outcomes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub discovered: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub waveform_plots: usize,
    pub spectrum_plots: usize,
    pub envelope_plots: usize,
    pub autocorrelation_plots: usize,
    pub pitch_reports: usize,
    pub files: Vec<FileOutcome>,
}

/// Serialize `summary` as pretty JSON at `path`.
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("serialize run summary")?;
    fs::write(path, json).with_context(|| format!("write run summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_counters_and_files() {
        let summary = RunSummary {
            discovered: 2,
            processed: 1,
            failed: 1,
            files: vec![FileOutcome {
                file: "2_voiced_oo.wav".into(),
                digit: "2".into(),
                category: "segment".into(),
                ok: true,
                error: None,
                mean_f0_hz: Some(151.2),
                pitch_period_secs: Some(1.0 / 151.2),
            }],
            ..RunSummary::default()
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["discovered"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["files"][0]["digit"], "2");
        assert_eq!(value["files"][0]["error"], serde_json::Value::Null);
    }

    #[test]
    fn write_summary_creates_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary(&RunSummary::default(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["processed"], 0);
    }
}
