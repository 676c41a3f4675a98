//! Frame-wise onset-strength features
//!
//! A feature consumes STFT frames in order and emits one non-negative value
//! per frame, keeping only the previous frames it needs.

use num_complex::Complex;

/// Rectified complex-domain deviation
///
/// Predicts each bin from the previous two frames (constant magnitude,
/// constant phase advance) and sums the distance between prediction and
/// observation over bins whose magnitude did not drop.
pub struct ComplexDomain {
    prev: Vec<Complex<f32>>,
    prev2: Vec<Complex<f32>>,
}

impl ComplexDomain {
    pub fn new(bins: usize) -> Self {
        Self {
            prev: vec![Complex::new(0.0, 0.0); bins],
            prev2: vec![Complex::new(0.0, 0.0); bins],
        }
    }

    pub fn next(&mut self, spectrum: &[Complex<f32>]) -> f32 {
        let mut deviation = 0.0f32;

        for ((current, prev), prev2) in spectrum.iter().zip(&self.prev).zip(&self.prev2) {
            let magnitude = current.norm();
            let prev_magnitude = prev.norm();
            if magnitude < prev_magnitude {
                continue;
            }

            let target_phase = 2.0 * prev.arg() - prev2.arg();
            let predicted = Complex::from_polar(prev_magnitude, target_phase);
            deviation += (current - predicted).norm();
        }

        std::mem::swap(&mut self.prev2, &mut self.prev);
        self.prev.copy_from_slice(spectrum);

        deviation
    }
}

/// Scale a feature so its maximum is 1.0; all-zero input stays zero
pub fn normalize_peak(values: &mut [f32]) {
    let max = values.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}
