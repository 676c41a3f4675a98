use serde::{Deserialize, Serialize};

/// Output of a tempo tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TempoResult {
    /// Global tempo in beats per minute, always positive
    pub bpm: f64,

    /// Confidence in `[0.0, 1.0]`; reported even when low
    pub confidence: f64,

    /// Beat positions in seconds, strictly increasing
    pub beats: Vec<f64>,
}

/// Output of an onset detector: transient positions in seconds, strictly increasing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OnsetResult {
    pub onsets: Vec<f64>,
}

/// Result of one `analyze` request
///
/// Field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub bpm: f64,
    pub bpm_confidence: f64,
    pub beats: Vec<f64>,
    pub onsets: Vec<f64>,
    /// Duration in seconds
    pub duration: f64,
}
