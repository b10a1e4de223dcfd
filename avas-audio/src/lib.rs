//! Audio front end of the AVAS image builder.
//!
//! Turns one WAV file into a compressed FLAC blob, entirely in memory:
//!
//! - 24 kHz input is handed to the external encoder as-is (file path).
//! - 48 kHz input is decimated 2:1, re-wrapped as a minimal WAV container
//!   and piped to the encoder on stdin. No temp file is ever written.
//! - Any other sample rate is rejected.
//!
//! The encoder itself sits behind the [`SoundEncoder`] trait so the pipeline
//! can run against a mock in tests; [`FlacEncoder`] is the production
//! implementation wrapping the `flac` executable.

mod flac;
mod resample;
mod wav;

pub use flac::{FlacEncoder, SoundEncoder, DEFAULT_BLOCK_SIZE, DEFAULT_COMPRESSION_LEVEL};
pub use resample::decimate;
pub use wav::{read_wav, WavPcm};

use std::path::Path;

/// Accepted input sample rates.
pub const DIRECT_SAMPLE_RATE: u32 = 24_000;
pub const DOWNSAMPLE_SOURCE_RATE: u32 = 48_000;

/// Errors from WAV parsing or encoding.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("unsupported sample rate: {0}Hz (expected 24000 or 48000)")]
    UnsupportedSampleRate(u32),

    #[error("FLAC conversion failed: {0}")]
    CodecFailure(String),

    #[error("FLAC encoder not found: {0}")]
    EncoderNotFound(String),

    #[error("invalid WAV file: {0}")]
    InvalidWav(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convert one WAV file to a FLAC blob.
///
/// Applies the sample-rate gate, decimates 48 kHz input, and dispatches to
/// the encoder's stream or file entry point to match the original process
/// contract (stdin for resampled audio, path for direct conversion).
pub fn convert_wav<E: SoundEncoder>(path: &Path, encoder: &E) -> Result<Vec<u8>, AudioError> {
    let pcm = read_wav(path)?;
    match pcm.sample_rate {
        DOWNSAMPLE_SOURCE_RATE => {
            let downsampled = decimate(&pcm);
            encoder.encode_stream(&downsampled.to_wav_bytes())
        }
        DIRECT_SAMPLE_RATE => encoder.encode_file(path),
        other => Err(AudioError::UnsupportedSampleRate(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Mock encoder: stream input echoes the WAV bytes, file input returns a
    /// marker so tests can tell which entry point was chosen.
    struct MockEncoder;

    impl SoundEncoder for MockEncoder {
        fn encode_stream(&self, wav_bytes: &[u8]) -> Result<Vec<u8>, AudioError> {
            Ok(wav_bytes.to_vec())
        }

        fn encode_file(&self, _path: &Path) -> Result<Vec<u8>, AudioError> {
            Ok(b"file-path-encode".to_vec())
        }
    }

    fn write_wav(dir: &Path, name: &str, sample_rate: u32, frames: u32) -> PathBuf {
        let pcm = WavPcm {
            channels: 1,
            sample_width: 2,
            sample_rate,
            frames: vec![0x42; (frames * 2) as usize],
        };
        let path = dir.join(name);
        std::fs::write(&path, pcm.to_wav_bytes()).unwrap();
        path
    }

    #[test]
    fn test_24k_goes_through_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "direct.wav", 24_000, 100);
        let out = convert_wav(&path, &MockEncoder).unwrap();
        assert_eq!(out, b"file-path-encode");
    }

    #[test]
    fn test_48k_is_decimated_and_streamed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "down.wav", 48_000, 100);
        let out = convert_wav(&path, &MockEncoder).unwrap();

        // The mock echoes the synthesized WAV: 50 frames at 24 kHz
        let pcm = WavPcm::parse(&out).unwrap();
        assert_eq!(pcm.sample_rate, 24_000);
        assert_eq!(pcm.frame_count(), 50);
    }

    #[test]
    fn test_other_rates_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "bad.wav", 44_100, 10);
        let err = convert_wav(&path, &MockEncoder).unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedSampleRate(44_100)));
    }
}
