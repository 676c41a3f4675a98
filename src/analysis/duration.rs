use crate::error::ExtractionError;
use crate::model::SampleBuffer;

/// Duration in seconds: sample count over the fixed sample rate
pub fn compute_duration(buffer: &SampleBuffer) -> Result<f64, ExtractionError> {
    if buffer.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    Ok(buffer.len() as f64 / buffer.sample_rate() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_exact() {
        let buffer = SampleBuffer::new(vec![0.0; 441000]).unwrap();
        assert_eq!(compute_duration(&buffer).unwrap(), 10.0);

        let buffer = SampleBuffer::new(vec![0.0; 12345]).unwrap();
        let expected = 12345.0 / 44100.0;
        assert!((compute_duration(&buffer).unwrap() - expected).abs() < 1e-12);
    }
}
