//! Request orchestration: fetch -> stage -> decode -> extract -> assemble

use super::assembler::assemble;
use super::config::PipelineConfig;
use super::staging::{StagedFile, StagingArea};
use crate::analysis::{
    compute_duration, ComplexOnsetDetector, OnsetDetector, StratumTempoTracker, TempoTracker,
};
use crate::audio;
use crate::error::{AnalysisError, ExtractionError, FetchError};
use crate::fetch::{url_extension, Fetcher, SchemeFetcher};
use crate::model::{AnalysisResponse, OnsetResult, SampleBuffer, TempoResult};
use std::io::{ErrorKind, Read};
use std::time::Instant;

/// Size of the buffer used to copy the fetched stream to disk
const CHUNK_SIZE: usize = 8 * 1024;

/// Anything that turns a URL into an analysis
///
/// The HTTP service only depends on this trait.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, url: &str) -> Result<AnalysisResponse, AnalysisError>;
}

/// Main analysis pipeline
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct AnalysisPipeline<
    F = SchemeFetcher,
    T = StratumTempoTracker,
    O = ComplexOnsetDetector,
> {
    config: PipelineConfig,
    staging: StagingArea,
    fetcher: F,
    tempo: T,
    onsets: O,
}

impl AnalysisPipeline {
    /// Create a pipeline with the default fetcher and detectors
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        let fetcher = SchemeFetcher::new(config.fetch_timeout, config.allow_local_files)?;
        let tempo = StratumTempoTracker::new().with_bpm_range(config.min_bpm, config.max_bpm);

        Ok(Self::with_stages(
            config,
            fetcher,
            tempo,
            ComplexOnsetDetector::new(),
        ))
    }
}

impl<F: Fetcher, T: TempoTracker, O: OnsetDetector> AnalysisPipeline<F, T, O> {
    /// Create a pipeline from explicit stage implementations
    pub fn with_stages(config: PipelineConfig, fetcher: F, tempo: T, onsets: O) -> Self {
        let staging = StagingArea::new(config.staging_dir.clone());
        Self {
            config,
            staging,
            fetcher,
            tempo,
            onsets,
        }
    }

    /// Analyze the audio at `url`
    ///
    /// The staging file is released on every path. A release failure is
    /// logged and never replaces the request's own outcome.
    pub fn analyze(&self, url: &str) -> Result<AnalysisResponse, AnalysisError> {
        log::info!("Analyzing {}", url);
        let started = Instant::now();

        let mut staged = self.staging.acquire(url_extension(url).as_deref())?;
        let outcome = self.run(url, &mut staged);

        if let Err(e) = staged.release() {
            log::warn!("Failed to release staging file: {}", e);
        }

        match &outcome {
            Ok(response) => log::info!(
                "Analyzed {} in {:.2?}: {:.1} BPM (confidence {:.2}), {} beats, {} onsets, {:.2}s",
                url,
                started.elapsed(),
                response.bpm,
                response.bpm_confidence,
                response.beats.len(),
                response.onsets.len(),
                response.duration
            ),
            Err(e) => log::warn!("Analysis of {} failed: {}", url, e),
        }

        outcome
    }

    fn run(&self, url: &str, staged: &mut StagedFile) -> Result<AnalysisResponse, AnalysisError> {
        // Step 1: Fetch into the staging file
        let bytes = self.download(url, staged)?;
        log::debug!("Staged {} bytes at {:?}", bytes, staged.path());

        // Step 2: Decode to mono 44.1 kHz
        let buffer = audio::decode_file(staged.path())?;
        log::debug!(
            "Decoded {} samples ({:.2}s)",
            buffer.len(),
            buffer.seconds_at(buffer.len())
        );

        // Step 3: Feature extraction
        let (tempo, onsets, duration) = self.extract(&buffer)?;

        // Step 4: Merge
        Ok(assemble(tempo, onsets, duration))
    }

    /// Copy the fetched stream into the staging file, enforcing the size cap
    fn download(&self, url: &str, staged: &mut StagedFile) -> Result<u64, AnalysisError> {
        let mut stream = self.fetcher.fetch(url)?;
        let limit = self.config.max_download_bytes;
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(FetchError::Io {
                        url: url.to_string(),
                        source,
                    }
                    .into())
                }
            };

            if staged.len() + n as u64 > limit {
                return Err(FetchError::TooLarge { limit }.into());
            }
            staged.write_chunk(&chunk[..n])?;
        }

        staged.flush()?;
        Ok(staged.len())
    }

    /// Run the three independent stages over the shared buffer
    ///
    /// When several stages fail, the error reported is the first in the
    /// order tempo, onsets, duration.
    fn extract(
        &self,
        buffer: &SampleBuffer,
    ) -> Result<(TempoResult, OnsetResult, f64), ExtractionError> {
        if self.config.parallel_stages {
            let (tempo, (onsets, duration)) = rayon::join(
                || self.tempo.track(buffer),
                || {
                    rayon::join(
                        || self.onsets.detect(buffer),
                        || compute_duration(buffer),
                    )
                },
            );
            Ok((tempo?, onsets?, duration?))
        } else {
            let tempo = self.tempo.track(buffer)?;
            let onsets = self.onsets.detect(buffer)?;
            let duration = compute_duration(buffer)?;
            Ok((tempo, onsets, duration))
        }
    }
}

impl<F: Fetcher, T: TempoTracker, O: OnsetDetector> Analyzer for AnalysisPipeline<F, T, O> {
    fn analyze(&self, url: &str) -> Result<AnalysisResponse, AnalysisError> {
        AnalysisPipeline::analyze(self, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ByteStream;
    use crate::model::SAMPLE_RATE;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves fixed bytes for any URL
    struct StaticFetcher(Vec<u8>);

    impl Fetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<ByteStream, FetchError> {
            Ok(Box::new(Cursor::new(self.0.clone())))
        }
    }

    /// Stream that fails after the first read
    struct BrokenStream {
        served: bool,
    }

    impl Read for BrokenStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.served {
                return Err(std::io::Error::new(ErrorKind::ConnectionReset, "reset"));
            }
            self.served = true;
            buf[..4].copy_from_slice(b"RIFF");
            Ok(4)
        }
    }

    struct BrokenFetcher;

    impl Fetcher for BrokenFetcher {
        fn fetch(&self, _url: &str) -> Result<ByteStream, FetchError> {
            Ok(Box::new(BrokenStream { served: false }))
        }
    }

    struct FixedTempo(Arc<AtomicUsize>);

    impl TempoTracker for FixedTempo {
        fn track(&self, _buffer: &SampleBuffer) -> Result<TempoResult, ExtractionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(TempoResult {
                bpm: 100.0,
                confidence: 0.5,
                beats: vec![0.0],
            })
        }
    }

    struct FailingOnsets;

    impl OnsetDetector for FailingOnsets {
        fn detect(&self, _buffer: &SampleBuffer) -> Result<OnsetResult, ExtractionError> {
            Err(ExtractionError::Stage {
                stage: "onsets",
                message: "boom".to_string(),
            })
        }
    }

    fn wav_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn config(dir: &tempfile::TempDir) -> PipelineConfig {
        PipelineConfig::new().with_staging_dir(dir.path().to_path_buf())
    }

    fn staged_count(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_size_cap_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = AnalysisPipeline::with_stages(
            config(&dir).with_max_download_bytes(16 * 1024),
            StaticFetcher(vec![0u8; 64 * 1024]),
            FixedTempo(Arc::default()),
            ComplexOnsetDetector::new(),
        );

        let err = pipeline.analyze("https://example.com/big.wav").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Fetch(FetchError::TooLarge { limit: 16384 })
        ));
        assert_eq!(staged_count(&dir), 0);
    }

    #[test]
    fn test_stream_error_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = AnalysisPipeline::with_stages(
            config(&dir),
            BrokenFetcher,
            FixedTempo(Arc::default()),
            ComplexOnsetDetector::new(),
        );

        let err = pipeline.analyze("https://example.com/a.wav").unwrap_err();
        assert!(matches!(err, AnalysisError::Fetch(FetchError::Io { .. })));
        assert_eq!(staged_count(&dir), 0);
    }

    #[test]
    fn test_stage_failure_surfaces_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = AnalysisPipeline::with_stages(
            config(&dir),
            StaticFetcher(wav_bytes(&vec![0i16; 44100])),
            FixedTempo(calls.clone()),
            FailingOnsets,
        );

        let err = pipeline.analyze("https://example.com/a.wav").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Extraction(ExtractionError::Stage { stage: "onsets", .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(staged_count(&dir), 0);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let samples: Vec<i16> = (0..44100 * 3)
            .map(|i| if i % 22050 < 400 { 12000 } else { 0 })
            .collect();
        let bytes = wav_bytes(&samples);
        let dir = tempfile::tempdir().unwrap();

        let parallel = AnalysisPipeline::with_stages(
            config(&dir),
            StaticFetcher(bytes.clone()),
            StratumTempoTracker::new(),
            ComplexOnsetDetector::new(),
        );
        let sequential = AnalysisPipeline::with_stages(
            config(&dir).with_parallel_stages(false),
            StaticFetcher(bytes),
            StratumTempoTracker::new(),
            ComplexOnsetDetector::new(),
        );

        let a = parallel.analyze("https://example.com/a.wav").unwrap();
        let b = sequential.analyze("https://example.com/a.wav").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.duration, 3.0);
    }
}
