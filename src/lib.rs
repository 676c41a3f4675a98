//! Rhythm Analyzer - tempo, beat and onset analysis of audio referenced by URL
//!
//! The library fetches an audio resource, stages it on disk, decodes it to
//! mono 44.1 kHz and runs independent tempo, onset and duration stages whose
//! outputs are merged into one [`AnalysisResponse`].

pub mod analysis;
pub mod audio;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod server;

pub use error::AnalysisError;
pub use model::AnalysisResponse;
pub use pipeline::{AnalysisPipeline, Analyzer, PipelineConfig};
