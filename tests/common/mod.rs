//! Shared fixtures for integration tests

#![allow(dead_code)]

use hound::{SampleFormat, WavSpec, WavWriter};
use rhythm_analyzer::analysis::{
    ComplexOnsetDetector, OnsetDetector, StratumTempoTracker, TempoTracker,
};
use rhythm_analyzer::error::ExtractionError;
use rhythm_analyzer::fetch::Fetcher;
use rhythm_analyzer::model::{OnsetResult, SampleBuffer, TempoResult};
use rhythm_analyzer::{AnalysisPipeline, PipelineConfig};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const SAMPLE_RATE: u32 = 44100;

/// Mono 16-bit samples of a click track: a decaying 1 kHz burst on every beat
pub fn click_track(bpm: f64, seconds: f64, sample_rate: u32) -> Vec<i16> {
    let len = (seconds * sample_rate as f64) as usize;
    let period = (60.0 / bpm * sample_rate as f64) as usize;
    let click_len = sample_rate as usize / 50;
    let mut samples = vec![0i16; len];

    for start in (0..len).step_by(period) {
        for i in 0..click_len.min(len - start) {
            let t = i as f64 / sample_rate as f64;
            let envelope = (-(i as f64) / (sample_rate as f64 / 220.0)).exp();
            let value = 0.8 * envelope * (2.0 * std::f64::consts::PI * 1000.0 * t).sin();
            samples[start + i] = (value * i16::MAX as f64) as i16;
        }
    }

    samples
}

/// Write interleaved samples as a 16-bit PCM WAV file
pub fn write_wav(path: &Path, samples: &[i16], channels: u16, sample_rate: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Encode mono 44.1 kHz samples as an in-memory WAV file
pub fn wav_bytes(samples: &[i16]) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Write a mono 44.1 kHz WAV into `dir` and return its path
pub fn mono_wav(dir: &Path, name: &str, samples: &[i16]) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, samples, 1, SAMPLE_RATE);
    path
}

/// `file://` URL for a local path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Number of entries left in a staging directory
pub fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Tempo tracker that counts how often it runs
pub struct CountingTempo {
    inner: StratumTempoTracker,
    calls: Arc<AtomicUsize>,
}

impl TempoTracker for CountingTempo {
    fn track(&self, buffer: &SampleBuffer) -> Result<TempoResult, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.track(buffer)
    }
}

/// Onset detector that counts how often it runs
pub struct CountingOnsets {
    inner: ComplexOnsetDetector,
    calls: Arc<AtomicUsize>,
}

impl OnsetDetector for CountingOnsets {
    fn detect(&self, buffer: &SampleBuffer) -> Result<OnsetResult, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.detect(buffer)
    }
}

/// Pipeline with counting stages and a private staging directory
pub struct Harness<F> {
    pub pipeline: AnalysisPipeline<F, CountingTempo, CountingOnsets>,
    pub staging: TempDir,
    pub tempo_calls: Arc<AtomicUsize>,
    pub onset_calls: Arc<AtomicUsize>,
}

impl<F: Fetcher> Harness<F> {
    pub fn new(fetcher: F) -> Self {
        let staging = TempDir::new().unwrap();
        let tempo_calls = Arc::new(AtomicUsize::new(0));
        let onset_calls = Arc::new(AtomicUsize::new(0));

        let pipeline = AnalysisPipeline::with_stages(
            PipelineConfig::new().with_staging_dir(staging.path().to_path_buf()),
            fetcher,
            CountingTempo {
                inner: StratumTempoTracker::new(),
                calls: tempo_calls.clone(),
            },
            CountingOnsets {
                inner: ComplexOnsetDetector::new(),
                calls: onset_calls.clone(),
            },
        );

        Self {
            pipeline,
            staging,
            tempo_calls,
            onset_calls,
        }
    }

    pub fn extraction_calls(&self) -> usize {
        self.tempo_calls.load(Ordering::SeqCst) + self.onset_calls.load(Ordering::SeqCst)
    }
}
