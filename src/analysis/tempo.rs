//! Tempo and beat tracking using stratum-dsp
//!
//! stratum-dsp estimates the tempo (tempogram with a legacy autocorrelation
//! fallback) and fits a beat grid to its onsets. This module guards its
//! inputs, folds the tempo into the configured range and turns the grid into
//! strictly increasing beat times inside the buffer.

use super::traits::TempoTracker;
use crate::error::ExtractionError;
use crate::model::{SampleBuffer, TempoResult, SAMPLE_RATE};
use stratum_dsp::{analyze_audio, AnalysisConfig};

/// Tempo reported when the signal carries no usable rhythm
const FALLBACK_BPM: f32 = 120.0;
/// Peak amplitude at or below which a buffer is silence
const SILENCE_PEAK: f32 = 1e-4;
/// Shortest buffer handed to stratum-dsp (one second)
const MIN_SAMPLES: usize = SAMPLE_RATE as usize;

/// Tempo tracker backed by `stratum_dsp::analyze_audio`
///
/// Confidence is stratum-dsp's BPM confidence clamped to `[0.0, 1.0]`.
/// Silence, very short input and failed estimates report the fallback tempo
/// with confidence 0 and no beats.
#[derive(Debug, Clone)]
pub struct StratumTempoTracker {
    min_bpm: f32,
    max_bpm: f32,
}

impl StratumTempoTracker {
    pub fn new() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 208.0,
        }
    }

    /// Restrict the reported tempo to `[min, max]` BPM
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    fn analysis_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        // Beat times must stay relative to the start of the buffer
        config.enable_silence_trimming = false;
        config
    }

    fn fallback(&self) -> TempoResult {
        TempoResult {
            bpm: FALLBACK_BPM.clamp(self.min_bpm, self.max_bpm) as f64,
            confidence: 0.0,
            beats: Vec::new(),
        }
    }

    /// Move a tempo into range by octaves, then clamp
    fn fold_into_range(&self, mut bpm: f32) -> f32 {
        while bpm < self.min_bpm && bpm * 2.0 <= self.max_bpm {
            bpm *= 2.0;
            log::debug!("BPM doubled to {:.1} (was below minimum {})", bpm, self.min_bpm);
        }
        while bpm > self.max_bpm && bpm / 2.0 >= self.min_bpm {
            bpm /= 2.0;
            log::debug!("BPM halved to {:.1} (was above maximum {})", bpm, self.max_bpm);
        }
        bpm.clamp(self.min_bpm, self.max_bpm)
    }
}

impl Default for StratumTempoTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoTracker for StratumTempoTracker {
    fn track(&self, buffer: &SampleBuffer) -> Result<TempoResult, ExtractionError> {
        if !(self.min_bpm > 0.0 && self.min_bpm < self.max_bpm) {
            return Err(ExtractionError::Stage {
                stage: "tempo",
                message: format!("invalid BPM range {}-{}", self.min_bpm, self.max_bpm),
            });
        }

        let samples = buffer.samples();
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(ExtractionError::NonFiniteInput);
        }

        let peak = samples.iter().fold(0.0f32, |max, s| max.max(s.abs()));
        if peak <= SILENCE_PEAK {
            log::debug!("Silent buffer (peak {:.2e}); reporting fallback tempo", peak);
            return Ok(self.fallback());
        }
        if samples.len() < MIN_SAMPLES {
            log::debug!("Buffer too short for tempo analysis ({} samples)", samples.len());
            return Ok(self.fallback());
        }

        let analysis = analyze_audio(samples, SAMPLE_RATE, self.analysis_config()).map_err(|e| {
            ExtractionError::Stage {
                stage: "tempo",
                message: format!("{:?}", e),
            }
        })?;

        if !(analysis.bpm > 0.0) {
            log::warn!("No tempo estimate; reporting fallback tempo");
            return Ok(self.fallback());
        }

        let bpm = self.fold_into_range(analysis.bpm);
        let confidence = f64::from(analysis.bpm_confidence);
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let beats = beat_times(&analysis.beat_grid.beats, buffer.seconds_at(buffer.len()));

        log::debug!(
            "Tempo: {:.2} BPM (raw {:.2}, confidence {:.3}, {} beats)",
            bpm,
            analysis.bpm,
            confidence,
            beats.len()
        );

        Ok(TempoResult {
            bpm: bpm as f64,
            confidence,
            beats,
        })
    }
}

/// Beat grid positions as strictly increasing seconds within `[0, duration]`
fn beat_times<T: Copy + Into<f64>>(grid: &[T], duration: f64) -> Vec<f64> {
    let mut beats: Vec<f64> = grid
        .iter()
        .map(|&t| t.into())
        .filter(|t| t.is_finite() && (0.0..=duration).contains(t))
        .collect();
    beats.sort_by(f64::total_cmp);
    beats.dedup();
    beats
}
