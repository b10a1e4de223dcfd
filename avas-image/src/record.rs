//! Record framing for one encoded sound.
//!
//! # Layout
//! ```text
//! Engine:                          Event:
//!   0x00: encoded_size u32 LE        0x00: encoded_size u32 LE
//!   0x04: filename, NUL-padded 80    0x04: payload
//!   0x54: payload
//! ```

use crate::layout::{SoundType, FILENAME_FIELD_SIZE};
use crate::ImageError;

/// One encoded audio file plus its framing. Immutable once built.
#[derive(Debug, Clone)]
pub struct SoundRecord {
    sound_type: SoundType,
    source_name: Option<String>,
    payload: Vec<u8>,
}

impl SoundRecord {
    /// Frame an encoded payload as a record.
    ///
    /// Engine records carry `source_name` in the 80-byte filename field;
    /// event records drop it. An empty payload is rejected - the encoder
    /// contract guarantees at least one byte of output.
    pub fn build(
        payload: Vec<u8>,
        sound_type: SoundType,
        source_name: &str,
    ) -> Result<Self, ImageError> {
        if payload.is_empty() {
            return Err(ImageError::EmptyPayload);
        }
        let source_name = match sound_type {
            SoundType::Engine => {
                if source_name.len() > FILENAME_FIELD_SIZE {
                    return Err(ImageError::SourceNameTooLong {
                        name: source_name.to_string(),
                        len: source_name.len(),
                        max: FILENAME_FIELD_SIZE,
                    });
                }
                Some(source_name.to_string())
            }
            SoundType::Event => None,
        };
        Ok(Self {
            sound_type,
            source_name,
            payload,
        })
    }

    /// Byte length of the compressed payload.
    pub fn encoded_size(&self) -> u32 {
        self.payload.len() as u32
    }

    /// Total framed size: payload offset + payload length.
    pub fn total_size(&self) -> u32 {
        self.sound_type.payload_offset() + self.payload.len() as u32
    }

    pub fn sound_type(&self) -> SoundType {
        self.sound_type
    }

    /// Source filename, present for engine records only.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serialize the record: size word, optional filename field, payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_size() as usize);
        bytes.extend_from_slice(&self.encoded_size().to_le_bytes());
        if let Some(name) = &self.source_name {
            let mut field = [0u8; FILENAME_FIELD_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            bytes.extend_from_slice(&field);
        }
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
