//! Short-time Fourier transform shared by the onset and tempo stages

use crate::error::ExtractionError;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Centered, Hann-windowed STFT
///
/// Frame `i` is centered on sample `i * hop_size`, with zeros outside the
/// signal, so a buffer of `n` samples yields `n / hop_size + 1` frames and
/// frame times never exceed the signal duration.
pub struct Stft {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);

        // Periodic Hann window
        let window = (0..frame_size)
            .map(|i| {
                let t = i as f32 / frame_size as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
            })
            .collect();

        Self {
            frame_size,
            hop_size,
            window,
            fft,
        }
    }

    /// Number of positive-frequency bins per frame
    pub fn bin_count(&self) -> usize {
        self.frame_size / 2 + 1
    }

    pub fn frame_count(&self, sample_count: usize) -> usize {
        sample_count / self.hop_size + 1
    }

    /// Leading frames whose window does not run past the end of the signal
    pub fn complete_frame_count(&self, sample_count: usize) -> usize {
        sample_count
            .checked_sub(self.frame_size / 2)
            .map_or(0, |n| n / self.hop_size + 1)
    }

    /// Run the transform, handing each frame's positive-frequency bins to `visit`
    ///
    /// Frames are produced one at a time so memory stays flat for long inputs.
    pub fn process<F>(&self, samples: &[f32], mut visit: F) -> Result<usize, ExtractionError>
    where
        F: FnMut(usize, &[Complex<f32>]),
    {
        if samples.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(ExtractionError::NonFiniteInput);
        }

        let half = self.frame_size / 2;
        let bins = self.bin_count();
        let frames = self.frame_count(samples.len());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.frame_size];

        for frame_idx in 0..frames {
            let center = frame_idx * self.hop_size;

            for (offset, slot) in buffer.iter_mut().enumerate() {
                let sample = (center + offset)
                    .checked_sub(half)
                    .and_then(|pos| samples.get(pos))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[offset], 0.0);
            }

            self.fft.process(&mut buffer);
            visit(frame_idx, &buffer[..bins]);
        }

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_covers_signal() {
        let stft = Stft::new(2048, 512);
        assert_eq!(stft.frame_count(44100), 87);
        assert_eq!(stft.frame_count(1), 1);
    }

    #[test]
    fn test_complete_frames_exclude_padded_tail() {
        let stft = Stft::new(2048, 512);
        // 2 s: frame 171 ends at sample 88576 > 88200
        assert_eq!(stft.complete_frame_count(88200), 171);
        assert_eq!(stft.complete_frame_count(1024), 1);
        assert_eq!(stft.complete_frame_count(1000), 0);
    }

    #[test]
    fn test_rejects_non_finite() {
        let stft = Stft::new(256, 128);
        let result = stft.process(&[0.0, f32::NAN, 0.0], |_, _| {});
        assert!(matches!(result, Err(ExtractionError::NonFiniteInput)));
    }

    #[test]
    fn test_sine_peaks_in_expected_bin() {
        let stft = Stft::new(1024, 512);
        // Bin 32 of a 1024-point FFT at 44.1kHz
        let freq = 32.0 * 44100.0 / 1024.0;
        let samples: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
            .collect();

        let mut peak_bins = Vec::new();
        stft.process(&samples, |_, spectrum| {
            let (bin, _) = spectrum
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
                .unwrap();
            peak_bins.push(bin);
        })
        .unwrap();

        // Interior frames see the full sinusoid
        assert!(peak_bins[2..peak_bins.len() - 3].iter().all(|&b| b == 32));
    }
}
