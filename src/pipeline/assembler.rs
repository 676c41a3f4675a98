//! Merge of stage outputs into the response record

use crate::model::{AnalysisResponse, OnsetResult, TempoResult};

/// Build the response from the stage outputs
///
/// # Panics
///
/// If a stage broke its output contract (non-positive duration or tempo,
/// confidence outside `[0, 1]`, timestamps unordered or outside
/// `[0, duration]`). That is a bug in a stage, not a request failure.
pub fn assemble(tempo: TempoResult, onsets: OnsetResult, duration: f64) -> AnalysisResponse {
    assert!(
        duration.is_finite() && duration > 0.0,
        "duration must be positive, got {}",
        duration
    );
    assert!(
        tempo.bpm.is_finite() && tempo.bpm > 0.0,
        "bpm must be positive, got {}",
        tempo.bpm
    );
    assert!(
        (0.0..=1.0).contains(&tempo.confidence),
        "bpm confidence out of range: {}",
        tempo.confidence
    );
    check_timestamps("beats", &tempo.beats, duration);
    check_timestamps("onsets", &onsets.onsets, duration);

    AnalysisResponse {
        bpm: tempo.bpm,
        bpm_confidence: tempo.confidence,
        beats: tempo.beats,
        onsets: onsets.onsets,
        duration,
    }
}

fn check_timestamps(label: &str, timestamps: &[f64], duration: f64) {
    assert!(
        timestamps.iter().all(|t| (0.0..=duration).contains(t)),
        "{} outside [0, {}]",
        label,
        duration
    );
    assert!(
        timestamps.windows(2).all(|w| w[0] < w[1]),
        "{} not strictly increasing",
        label
    );
}
