//! Decode staged audio to mono 44.1kHz `f32` samples

use super::resample::resample_mono;
use crate::error::DecodeError;
use crate::model::{SampleBuffer, SAMPLE_RATE};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PacketBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file on disk
///
/// The file extension, when present, is passed to symphonia as a format hint.
pub fn decode_file(path: &Path) -> Result<SampleBuffer, DecodeError> {
    log::debug!("Decoding {:?}", path);

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(DecodeError::Empty);
    }

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<SampleBuffer, DecodeError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let format_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut format = format_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut channel_count = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        if decoded.frames() == 0 {
            continue;
        }

        let spec = *decoded.spec();
        let mut packet_buf = PacketBuffer::<f32>::new(decoded.capacity() as u64, spec);
        packet_buf.copy_interleaved_ref(decoded);

        channel_count = spec.channels.count();
        mix_down(packet_buf.samples(), channel_count, &mut mono);
    }

    log::debug!(
        "Decoded {} frames at {} Hz ({} channel(s))",
        mono.len(),
        source_rate,
        channel_count
    );

    let samples = resample_mono(mono, source_rate, SAMPLE_RATE)?;
    SampleBuffer::new(samples).ok_or(DecodeError::NoSamples)
}

/// Average interleaved channels into `out`
fn mix_down(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
