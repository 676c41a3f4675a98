//! Pipeline configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by every request handled by one pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Timeout for the whole remote fetch (connect + body)
    pub fetch_timeout: Duration,

    /// Downloads larger than this are rejected while streaming
    pub max_download_bytes: u64,

    /// Directory for staging files (None = system temp dir)
    pub staging_dir: Option<PathBuf>,

    /// Whether `file://` URLs and bare paths may be analyzed
    pub allow_local_files: bool,

    /// Run tempo, onset and duration stages concurrently
    pub parallel_stages: bool,

    /// Reported tempo range in BPM
    pub min_bpm: f32,
    pub max_bpm: f32,
}

impl PipelineConfig {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(60),
            max_download_bytes: 200 * 1024 * 1024,
            staging_dir: None,
            allow_local_files: true,
            parallel_stages: true,
            min_bpm: 40.0,
            max_bpm: 208.0,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_download_bytes(mut self, limit: u64) -> Self {
        self.max_download_bytes = limit;
        self
    }

    pub fn with_staging_dir(mut self, dir: PathBuf) -> Self {
        self.staging_dir = Some(dir);
        self
    }

    pub fn with_local_files(mut self, allow: bool) -> Self {
        self.allow_local_files = allow;
        self
    }

    pub fn with_parallel_stages(mut self, parallel: bool) -> Self {
        self.parallel_stages = parallel;
        self
    }

    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
