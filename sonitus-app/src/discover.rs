//! Input discovery and filename classification.
//!
//! Recording filenames come in two shapes, decided once here and carried
//! as a sum type so nothing downstream re-parses strings:
//!
//! - `<digit>.wav`: a whole spoken-digit recording.
//! - `<digit>_<voicing>_<letter>.wav`: a voiced or voiceless sub-segment.
//!
//! Anything else under the recordings directory is skipped with a
//! warning and counted, never fatal; an unreadable directory is.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

/// Voicing category of a sub-segment recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voicing {
    Voiced,
    Voiceless,
}

impl Voicing {
    pub fn as_str(self) -> &'static str {
        match self {
            Voicing::Voiced => "voiced",
            Voicing::Voiceless => "voiceless",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "voiced" => Some(Voicing::Voiced),
            "voiceless" => Some(Voicing::Voiceless),
            _ => None,
        }
    }
}

/// What kind of recording a filename describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingKind {
    /// A complete spoken digit; gets a waveform plot.
    WholeDigit,
    /// A sub-segment; gets spectral plots, and a pitch report when voiced.
    Segment { voicing: Voicing, letter: String },
}

/// One classified input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub path: PathBuf,
    /// Digit label parsed from the filename stem.
    pub digit: String,
    pub kind: RecordingKind,
}

/// Result of scanning the recordings directory.
#[derive(Debug)]
pub struct Discovered {
    /// Classified recordings in name-sorted order.
    pub recordings: Vec<Recording>,
    /// `.wav` files whose names matched neither shape.
    pub skipped: usize,
}

/// Enumerate and classify the `.wav` files directly under `dir`.
///
/// The returned list is sorted by path so repeated runs visit files in
/// the same order.
///
/// # Errors
/// Fails only when the directory itself cannot be read; malformed
/// filenames are counted in `skipped` instead.
pub fn discover(dir: &Path) -> Result<Discovered> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("cannot read recordings directory {}", dir.display()))?;

    let mut recordings = Vec::new();
    let mut skipped = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("while scanning {}", dir.display()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("wav") {
            continue;
        }
        match classify(&path) {
            Some(recording) => recordings.push(recording),
            None => {
                warn!(path = %path.display(), "skipping: filename matches neither recording shape");
                skipped += 1;
            }
        }
    }

    if recordings.is_empty() {
        warn!(dir = %dir.display(), "no usable recordings found");
    }

    recordings.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Discovered {
        recordings,
        skipped,
    })
}

/// Parse a filename stem into a `Recording`; `None` when the name does
/// not match either shape.
fn classify(path: &Path) -> Option<Recording> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.as_slice() {
        [digit] if is_digit_label(digit) => Some(Recording {
            path: path.to_path_buf(),
            digit: (*digit).to_string(),
            kind: RecordingKind::WholeDigit,
        }),
        [digit, voicing, letter] if is_digit_label(digit) && !letter.is_empty() => {
            let voicing = Voicing::parse(voicing)?;
            Some(Recording {
                path: path.to_path_buf(),
                digit: (*digit).to_string(),
                kind: RecordingKind::Segment {
                    voicing,
                    letter: (*letter).to_string(),
                },
            })
        }
        _ => None,
    }
}

fn is_digit_label(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_digit_shape() {
        let recording = classify(Path::new("recordings/3.wav")).unwrap();
        assert_eq!(recording.digit, "3");
        assert_eq!(recording.kind, RecordingKind::WholeDigit);
    }

    #[test]
    fn segment_shape() {
        let recording = classify(Path::new("2_voiced_oo.wav")).unwrap();
        assert_eq!(recording.digit, "2");
        assert_eq!(
            recording.kind,
            RecordingKind::Segment {
                voicing: Voicing::Voiced,
                letter: "oo".into()
            }
        );

        let recording = classify(Path::new("6_voiceless_s.wav")).unwrap();
        assert_eq!(
            recording.kind,
            RecordingKind::Segment {
                voicing: Voicing::Voiceless,
                letter: "s".into()
            }
        );
    }

    #[test]
    fn malformed_names_are_rejected() {
        for name in [
            "notes.wav",
            "12_half-voiced_oo.wav",
            "x_voiced_oo.wav",
            "3_voiced.wav",
            "3_voiced_oo_extra.wav",
            "_voiced_oo.wav",
            "3_voiced_.wav",
        ] {
            assert!(classify(Path::new(name)).is_none(), "{name} should not classify");
        }
    }

    #[test]
    fn multi_digit_labels_are_allowed() {
        let recording = classify(Path::new("10.wav")).unwrap();
        assert_eq!(recording.digit, "10");
    }

    #[test]
    fn discovery_sorts_and_counts_skips() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["7.wav", "2_voiced_oo.wav", "README.md", "junk_name.wav"] {
            std::fs::write(dir.path().join(name), b"placeholder").unwrap();
        }

        let discovered = discover(dir.path()).unwrap();
        assert_eq!(discovered.recordings.len(), 2);
        assert_eq!(discovered.skipped, 1); // junk_name.wav; README.md is not a wav
        let names: Vec<_> = discovered
            .recordings
            .iter()
            .map(|r| r.path.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["2_voiced_oo.wav", "7.wav"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover(&missing).is_err());
    }
}
