//! Complex-domain onset detection with adaptive peak picking

use super::features::{normalize_peak, ComplexDomain};
use super::spectrum::Stft;
use super::traits::OnsetDetector;
use crate::error::ExtractionError;
use crate::model::{OnsetResult, SampleBuffer, SAMPLE_RATE};

/// Raw detection-function level below which a recording has no transients
const STRENGTH_FLOOR: f32 = 1e-3;

/// Onset detector using the rectified complex-domain detection function
#[derive(Debug, Clone)]
pub struct ComplexOnsetDetector {
    frame_size: usize,
    hop_size: usize,
    /// Height above the local median (fraction of the global peak)
    delta: f32,
    /// Minimum time between two onsets
    min_gap_secs: f64,
    /// Half-width of the local-maximum neighbourhood, in frames
    peak_radius: usize,
    /// Half-width of the median window, in frames
    median_radius: usize,
}

impl ComplexOnsetDetector {
    pub fn new() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            delta: 0.1,
            min_gap_secs: 0.03,
            peak_radius: 3,
            median_radius: 8,
        }
    }

    /// Set the threshold height above the local median (0.0-1.0)
    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    /// Set the minimum spacing between reported onsets
    pub fn with_min_gap(mut self, seconds: f64) -> Self {
        self.min_gap_secs = seconds;
        self
    }

    /// Pick onset frames from a peak-normalized detection function
    fn pick_peaks(&self, odf: &[f32]) -> Vec<usize> {
        let min_gap_frames =
            (self.min_gap_secs * SAMPLE_RATE as f64 / self.hop_size as f64).ceil() as usize;

        let mut onsets: Vec<usize> = Vec::new();
        for (i, &value) in odf.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }

            let lo = i.saturating_sub(self.peak_radius);
            let hi = (i + self.peak_radius).min(odf.len() - 1);
            // Strict on the left so a plateau yields one onset
            let is_peak = odf[lo..i].iter().all(|&v| v < value)
                && odf[i + 1..=hi].iter().all(|&v| v <= value);
            if !is_peak {
                continue;
            }

            let lo = i.saturating_sub(self.median_radius);
            let hi = (i + self.median_radius).min(odf.len() - 1);
            if value <= median(&odf[lo..=hi]) + self.delta {
                continue;
            }

            if let Some(&last) = onsets.last() {
                if i - last < min_gap_frames {
                    continue;
                }
            }

            onsets.push(i);
        }

        onsets
    }
}

impl Default for ComplexOnsetDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl OnsetDetector for ComplexOnsetDetector {
    fn detect(&self, buffer: &SampleBuffer) -> Result<OnsetResult, ExtractionError> {
        let stft = Stft::new(self.frame_size, self.hop_size);
        let mut complex = ComplexDomain::new(stft.bin_count());

        let mut odf = Vec::with_capacity(stft.frame_count(buffer.len()));
        stft.process(buffer.samples(), |_, spectrum| {
            odf.push(complex.next(spectrum));
        })?;

        // The zero padding after the last sample reads as a sudden drop-out
        odf.truncate(stft.complete_frame_count(buffer.len()));

        let peak = odf.iter().copied().fold(0.0f32, f32::max);
        if peak <= STRENGTH_FLOOR {
            log::debug!("No transients above floor (peak {:.2e})", peak);
            return Ok(OnsetResult::default());
        }

        normalize_peak(&mut odf);
        let frames = self.pick_peaks(&odf);

        log::debug!("Detected {} onsets in {} frames", frames.len(), odf.len());

        Ok(OnsetResult {
            onsets: frames
                .into_iter()
                .map(|frame| buffer.seconds_at(frame * self.hop_size))
                .collect(),
        })
    }
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[sorted.len() / 2]
}
