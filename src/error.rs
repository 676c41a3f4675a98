//! Error taxonomy for the analysis pipeline
//!
//! Every stage has its own error enum; `AnalysisError` is what callers of
//! `analyze` see. Contract violations between stages are not represented
//! here: they panic in the result assembler.

use thiserror::Error;

/// Failure of a single `analyze` request
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("feature extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("temporary storage error: {0}")]
    Resource(#[from] ResourceError),
}

/// Remote resource could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported URL scheme in {0:?}")]
    UnsupportedScheme(String),

    #[error("local file access is disabled: {0}")]
    LocalFilesDisabled(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("download exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("I/O error while reading {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Staged bytes are not decodable audio
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("input is empty")]
    Empty,

    #[error("unrecognized audio container: {0}")]
    Unsupported(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("audio track has no sample rate")]
    UnknownSampleRate,

    #[error("audio decoded to zero samples")]
    NoSamples,

    #[error("codec error: {0}")]
    Codec(String),

    #[error("resampling from {from} Hz failed: {message}")]
    Resample { from: u32, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A feature-extraction stage could not produce a result
///
/// A low-confidence result is not an error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("sample buffer is empty")]
    EmptyInput,

    #[error("sample buffer contains non-finite values")]
    NonFiniteInput,

    #[error("{stage} failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },
}

/// Temporary storage could not be allocated, written or released
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to create staging file in {dir}: {source}")]
    Acquire {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write staging file: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to delete staging file {path}: {source}")]
    Release {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
