//! Analysis stage trait definitions
//!
//! Each stage consumes the decoded buffer read-only, so implementations can be
//! swapped (or instrumented in tests) without touching the pipeline.

use crate::error::ExtractionError;
use crate::model::{OnsetResult, SampleBuffer, TempoResult};

/// Tempo and beat estimation
pub trait TempoTracker: Send + Sync {
    /// Estimate global tempo, confidence and beat positions
    ///
    /// Weak or absent rhythm is a low-confidence result, not an error.
    fn track(&self, buffer: &SampleBuffer) -> Result<TempoResult, ExtractionError>;
}

/// Transient (onset) detection
pub trait OnsetDetector: Send + Sync {
    /// Detect onsets; a signal without transients yields an empty result
    fn detect(&self, buffer: &SampleBuffer) -> Result<OnsetResult, ExtractionError>;
}
