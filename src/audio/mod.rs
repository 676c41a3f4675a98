//! Audio decoding layer
//!
//! Turns staged, encoded audio into a [`SampleBuffer`](crate::model::SampleBuffer):
//! mono, 44.1kHz, `f32`. Decoding is powered by symphonia and resampling by
//! rubato.

mod decoder;
mod resample;

pub use decoder::decode_file;
