//! Audio analysis layer
//!
//! Feature extraction stages behind small traits: tempo/beat tracking
//! (stratum-dsp), onset detection (complex-domain STFT on rustfft) and
//! duration.

mod duration;
mod features;
mod onset;
mod spectrum;
mod tempo;
mod traits;

pub use duration::compute_duration;
pub use onset::ComplexOnsetDetector;
pub use tempo::StratumTempoTracker;
pub use traits::{OnsetDetector, TempoTracker};
