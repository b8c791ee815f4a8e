//! RIFF/WAVE encoding of captured samples.
//!
//! Produces an uncompressed mono 16-bit linear PCM file: a fixed 44-byte
//! header followed by one little-endian i16 per input sample. The layout is
//! byte-exact so exported files can be compared and decoded bit-for-bit.

use thiserror::Error;

/// Size of the RIFF/WAVE header in bytes.
pub const HEADER_SIZE: usize = 44;

/// MIME type for the produced container.
pub const MIME_TYPE: &str = "audio/wav";

const BYTES_PER_SAMPLE: usize = 2;

/// Errors produced by [`encode`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The sample rate precondition was violated.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
}

/// Encodes normalized f32 samples as a mono 16-bit PCM WAV file.
///
/// The output is always `44 + 2 * samples.len()` bytes. An empty input is
/// valid and yields a header-only file. Samples are converted with
/// `(sample * 32767) as i32 as i16`: truncation toward zero, and amplitudes
/// outside [-1.0, 1.0] wrap around rather than clip, matching the historical
/// behavior of this pipeline.
///
/// # Errors
/// - [`EncodeError::InvalidSampleRate`] if `sample_rate` is zero
pub fn encode(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
    if sample_rate == 0 {
        return Err(EncodeError::InvalidSampleRate(sample_rate));
    }

    let data_len = samples.len() * BYTES_PER_SAMPLE;
    let mut out = Vec::with_capacity(HEADER_SIZE + data_len);

    // RIFF chunk descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt subchunk: PCM, mono, 16-bit
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * BYTES_PER_SAMPLE as u32).to_le_bytes());
    out.extend_from_slice(&(BYTES_PER_SAMPLE as u16).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    // data subchunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());

    for &sample in samples {
        // i32 -> i16 wraps on overflow; do not clamp, it would change the
        // output bytes for out-of-range amplitudes.
        let pcm = (sample * 32767.0) as i32 as i16;
        out.extend_from_slice(&pcm.to_le_bytes());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn i16_at(bytes: &[u8], offset: usize) -> i16 {
        i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn test_empty_input_yields_header_only_file() {
        let bytes = encode(&[], 44100).unwrap();

        assert_eq!(bytes.len(), 44);
        assert_eq!(u32_at(&bytes, 4), 36); // RIFF size
        assert_eq!(u32_at(&bytes, 40), 0); // data size
    }

    #[test]
    fn test_header_layout() {
        let samples = vec![0.0f32; 100];
        let bytes = encode(&samples, 44100).unwrap();

        assert_eq!(bytes.len(), 44 + 200);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 200);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16); // fmt subchunk size
        assert_eq!(u16_at(&bytes, 20), 1); // PCM
        assert_eq!(u16_at(&bytes, 22), 1); // mono
        assert_eq!(u32_at(&bytes, 24), 44100); // sample rate
        assert_eq!(u32_at(&bytes, 28), 88200); // byte rate
        assert_eq!(u16_at(&bytes, 32), 2); // block align
        assert_eq!(u16_at(&bytes, 34), 16); // bits per sample
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 200);
    }

    #[test]
    fn test_sample_conversion() {
        let bytes = encode(&[1.0, -1.0, 0.0], 8000).unwrap();

        assert_eq!(bytes.len(), 44 + 6);
        assert_eq!(i16_at(&bytes, 44), 32767);
        assert_eq!(i16_at(&bytes, 46), -32767);
        assert_eq!(i16_at(&bytes, 48), 0);
    }

    #[test]
    fn test_conversion_truncates_toward_zero() {
        let bytes = encode(&[0.5, -0.5], 8000).unwrap();

        // 0.5 * 32767 = 16383.5, truncated
        assert_eq!(i16_at(&bytes, 44), 16383);
        assert_eq!(i16_at(&bytes, 46), -16383);
    }

    #[test]
    fn test_out_of_range_amplitude_wraps() {
        let bytes = encode(&[2.0], 8000).unwrap();

        // 2.0 * 32767 = 65534, which wraps to -2 as an i16
        assert_eq!(i16_at(&bytes, 44), -2);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert_eq!(encode(&[0.0], 0), Err(EncodeError::InvalidSampleRate(0)));
    }

    #[test]
    fn test_header_round_trips_through_decoder() {
        let samples = vec![0.25f32, -0.25, 0.75, -0.75];
        let bytes = encode(&samples, 16000).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), samples.len() as u32);
    }

    #[test]
    fn test_decoded_samples_match_conversion() {
        let samples = vec![1.0f32, -1.0, 0.5];
        let bytes = encode(&samples, 8000).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

        assert_eq!(decoded, vec![32767, -32767, 16383]);
    }
}
