//! Minimal WAV container support.
//!
//! Only what the pipeline needs: parse PCM format + data chunks out of a
//! RIFF/WAVE file, and synthesize a canonical 44-byte-header container to
//! feed the encoder's stdin. Unknown chunks are skipped, odd chunk sizes
//! honor the RIFF padding byte.

use std::path::Path;

use crate::AudioError;

const FMT_PCM: u16 = 1;

/// Raw PCM audio plus the format fields the pipeline cares about.
#[derive(Debug, Clone)]
pub struct WavPcm {
    pub channels: u16,
    /// Bytes per sample (e.g. 2 for 16-bit).
    pub sample_width: u16,
    pub sample_rate: u32,
    /// Interleaved frames, exactly as stored in the data chunk.
    pub frames: Vec<u8>,
}

impl WavPcm {
    /// One frame = sample width x channel count bytes.
    pub fn frame_size(&self) -> usize {
        self.sample_width as usize * self.channels as usize
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len() / self.frame_size()
    }

    /// Parse a RIFF/WAVE byte stream.
    pub fn parse(data: &[u8]) -> Result<Self, AudioError> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return Err(AudioError::InvalidWav("missing RIFF/WAVE header".into()));
        }

        let mut fmt: Option<(u16, u16, u32)> = None;
        let mut frames: Option<Vec<u8>> = None;

        let mut offset = 12;
        while offset + 8 <= data.len() {
            let chunk_id = &data[offset..offset + 4];
            let chunk_size = u32::from_le_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]) as usize;
            let body_start = offset + 8;
            let body_end = (body_start + chunk_size).min(data.len());

            match chunk_id {
                b"fmt " => {
                    let body = &data[body_start..body_end];
                    if body.len() < 16 {
                        return Err(AudioError::InvalidWav("fmt chunk too short".into()));
                    }
                    let audio_format = u16::from_le_bytes([body[0], body[1]]);
                    if audio_format != FMT_PCM {
                        return Err(AudioError::InvalidWav(format!(
                            "unsupported audio format {audio_format} (PCM only)"
                        )));
                    }
                    let channels = u16::from_le_bytes([body[2], body[3]]);
                    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);
                    if channels == 0 || bits_per_sample == 0 || bits_per_sample % 8 != 0 {
                        return Err(AudioError::InvalidWav(format!(
                            "bad fmt fields: {channels} channels, {bits_per_sample} bits"
                        )));
                    }
                    fmt = Some((channels, bits_per_sample / 8, sample_rate));
                }
                b"data" => {
                    frames = Some(data[body_start..body_end].to_vec());
                }
                _ => {}
            }

            offset = body_start + chunk_size;
            if chunk_size % 2 != 0 {
                offset += 1; // RIFF padding byte
            }
        }

        let (channels, sample_width, sample_rate) =
            fmt.ok_or_else(|| AudioError::InvalidWav("no fmt chunk".into()))?;
        let frames = frames.ok_or_else(|| AudioError::InvalidWav("no data chunk".into()))?;

        Ok(WavPcm {
            channels,
            sample_width,
            sample_rate,
            frames,
        })
    }

    /// Serialize as a minimal WAV container (44-byte header + data chunk).
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let data_len = self.frames.len() as u32;
        let block_align = self.frame_size() as u16;
        let byte_rate = self.sample_rate * block_align as u32;
        let bits_per_sample = self.sample_width * 8;

        let mut out = Vec::with_capacity(44 + self.frames.len());
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&FMT_PCM.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits_per_sample.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend_from_slice(&self.frames);
        out
    }
}

/// Read and parse a WAV file from disk.
pub fn read_wav(path: &Path) -> Result<WavPcm, AudioError> {
    let data = std::fs::read(path)?;
    WavPcm::parse(&data)
}
