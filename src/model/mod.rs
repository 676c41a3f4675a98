//! Data model shared by all pipeline stages
//!
//! Decoded audio, per-stage results and the externally visible response.
//! Nothing here outlives a single request.

mod response;
mod samples;

pub use response::{AnalysisResponse, OnsetResult, TempoResult};
pub use samples::{SampleBuffer, SAMPLE_RATE};
