//! Per-request orchestration and staging

pub mod assembler;
pub mod config;
pub mod orchestrator;
pub mod staging;

pub use assembler::assemble;
pub use config::PipelineConfig;
pub use orchestrator::{AnalysisPipeline, Analyzer};
pub use staging::{StagedFile, StagingArea};
