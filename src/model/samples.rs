/// Fixed analysis sample rate; every timestamp is computed against it
pub const SAMPLE_RATE: u32 = 44100;

/// Mono `f32` samples at [`SAMPLE_RATE`], never empty
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    /// Wrap decoded samples; returns `None` for an empty vector
    pub fn new(samples: Vec<f32>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples })
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples (frames, since the buffer is mono)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Convert a sample offset into seconds
    pub fn seconds_at(&self, sample_index: usize) -> f64 {
        sample_index as f64 / SAMPLE_RATE as f64
    }
}
