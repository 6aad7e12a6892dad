//! `sonitus` batch entry point.
//!
//! Parses the command line, runs the batch pipeline over a directory of
//! spoken-digit recordings and exits nonzero if anything failed.

mod discover;
mod pipeline;
mod render;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use crate::pipeline::{run, RunConfig};

/// Batch analyzer for spoken-digit recordings
#[derive(Parser, Debug)]
#[command(name = "sonitus")]
#[command(about = "Plots waveforms, spectra, LPC envelopes and pitch for spoken digits")]
#[command(version)]
struct Args {
    /// Sample rate recordings are loaded at (Hz)
    #[arg(long = "orig_sr", default_value_t = 22_050)]
    orig_sr: u32,

    /// Sample rate used for spectral analysis (Hz)
    #[arg(long = "target_sr", default_value_t = 8_000)]
    target_sr: u32,

    /// LPC model orders drawn over the spectrum, space separated
    #[arg(long = "model_orders", num_args = 1.., default_values_t = [12usize])]
    model_orders: Vec<usize>,

    /// Directory scanned for input WAV files
    #[arg(long = "recordings_dir", default_value = "recordings")]
    recordings_dir: PathBuf,

    /// Directory the plot categories are written under
    #[arg(long = "output_dir", default_value = "output")]
    output_dir: PathBuf,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> ExitCode {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonitus=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = RunConfig {
        orig_sr: args.orig_sr,
        target_sr: args.target_sr,
        model_orders: args.model_orders,
        recordings_dir: args.recordings_dir,
        output_dir: args.output_dir,
    };

    let summary = match run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            error!("run aborted: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        processed = summary.processed,
        failed = summary.failed,
        skipped = summary.skipped,
        waveforms = summary.waveform_plots,
        spectra = summary.spectrum_plots,
        envelopes = summary.envelope_plots,
        autocorrelations = summary.autocorrelation_plots,
        pitch_reports = summary.pitch_reports,
        "batch complete"
    );

    if let Some(path) = &args.summary {
        if let Err(e) = report::write_summary(&summary, path) {
            error!("failed to write summary: {e:#}");
            return ExitCode::FAILURE;
        }
        info!(path = %path.display(), "summary written");
    }

    if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
