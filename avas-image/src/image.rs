//! Image merge state machine.
//!
//! A merge walks fixed stages: `Empty -> HeaderWritten -> RecordsWritten ->
//! Padded -> Finalized`. Each stage is its own type and consumes the previous
//! one, so a transition cannot be skipped or repeated. Position edits rebuild
//! the image from `Empty` with the new header; a finalized image is never
//! patched in place.
//!
//! The image itself is a contiguous byte arena indexed by
//! `address - start_address`, which makes the engine overflow check a plain
//! length comparison.

use crate::layout::{
    align_word, SoundType, DEFAULT_IMAGE_SIZE_KB, MAGIC_KEY, PAD_BYTE, SOUND_POSITION_COUNT,
    UNASSIGNED_POSITION,
};
use crate::record::SoundRecord;
use crate::ImageError;

/// Drives a full merge for one layout variant.
#[derive(Debug, Clone)]
pub struct ImageMerger {
    sound_type: SoundType,
    start_address: u32,
    fixed_size: Option<u32>,
}

impl ImageMerger {
    /// `image_size_kb` applies to engine images only; `None` selects the
    /// default 864 KB partition size. Event images are always content-sized.
    pub fn new(sound_type: SoundType, start_address: u32, image_size_kb: Option<f64>) -> Self {
        let fixed_size = match sound_type {
            SoundType::Engine => {
                let kb = image_size_kb.unwrap_or(DEFAULT_IMAGE_SIZE_KB);
                Some((kb * 1024.0).round() as u32)
            }
            SoundType::Event => None,
        };
        Self {
            sound_type,
            start_address,
            fixed_size,
        }
    }

    /// Fixed image size in bytes (engine only).
    pub fn fixed_size(&self) -> Option<u32> {
        self.fixed_size
    }

    /// Run the whole state machine and return the finalized image.
    ///
    /// `positions` feeds the engine header slots; `None` writes every slot as
    /// unassigned. Event layouts have no slots and ignore the argument.
    pub fn merge(
        &self,
        records: &[SoundRecord],
        positions: Option<&[u32; SOUND_POSITION_COUNT]>,
    ) -> Result<SoundImage, ImageError> {
        let empty = EmptyImage::new(self.clone());
        let header = empty.write_header(positions);
        let written = header.write_records(records);
        let padded = written.pad()?;
        Ok(padded.finalize())
    }
}

/// Growable byte arena anchored at the image start address.
#[derive(Debug)]
struct Arena {
    base: u32,
    bytes: Vec<u8>,
}

impl Arena {
    fn cursor(&self) -> u32 {
        self.base + self.bytes.len() as u32
    }

    fn push_u32_le(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Fill with `0xFF` until the cursor reaches the next word boundary.
    fn pad_to_alignment(&mut self) {
        let target = align_word(self.cursor());
        while self.cursor() < target {
            self.bytes.push(PAD_BYTE);
        }
    }
}

struct EmptyImage {
    merger: ImageMerger,
    arena: Arena,
}

impl EmptyImage {
    fn new(merger: ImageMerger) -> Self {
        let capacity = merger.fixed_size.unwrap_or(0) as usize;
        let arena = Arena {
            base: merger.start_address,
            bytes: Vec::with_capacity(capacity),
        };
        Self { merger, arena }
    }

    fn write_header(mut self, positions: Option<&[u32; SOUND_POSITION_COUNT]>) -> HeaderWritten {
        match self.merger.sound_type {
            SoundType::Engine => {
                self.arena.push_u32_le(MAGIC_KEY);
                let slots = positions.copied().unwrap_or([UNASSIGNED_POSITION; SOUND_POSITION_COUNT]);
                for slot in slots {
                    self.arena.push_u32_le(slot);
                }
            }
            SoundType::Event => {
                let size = self.merger.sound_type.header_size() as usize;
                self.arena.bytes.extend(std::iter::repeat(PAD_BYTE).take(size));
            }
        }
        HeaderWritten {
            merger: self.merger,
            arena: self.arena,
        }
    }
}

struct HeaderWritten {
    merger: ImageMerger,
    arena: Arena,
}

impl HeaderWritten {
    fn write_records(mut self, records: &[SoundRecord]) -> RecordsWritten {
        for record in records {
            debug_assert_eq!(record.sound_type(), self.merger.sound_type);
            self.arena.bytes.extend_from_slice(&record.to_bytes());
            self.arena.pad_to_alignment();
        }
        RecordsWritten {
            merger: self.merger,
            arena: self.arena,
        }
    }
}

struct RecordsWritten {
    merger: ImageMerger,
    arena: Arena,
}

impl RecordsWritten {
    fn pad(mut self) -> Result<PaddedImage, ImageError> {
        if let Some(fixed_size) = self.merger.fixed_size {
            if self.arena.bytes.len() as u32 > fixed_size {
                return Err(ImageError::ImageOverflow {
                    content_end: self.arena.cursor(),
                    limit: self.arena.base + fixed_size,
                });
            }
            self.arena.bytes.resize(fixed_size as usize, PAD_BYTE);
        }
        // Event layout: the last per-record alignment is the final boundary.
        Ok(PaddedImage { arena: self.arena })
    }
}

struct PaddedImage {
    arena: Arena,
}

impl PaddedImage {
    fn finalize(self) -> SoundImage {
        SoundImage {
            base: self.arena.base,
            bytes: self.arena.bytes,
        }
    }
}

/// The finalized flat byte image, immutable and ready for export.
#[derive(Debug, Clone)]
pub struct SoundImage {
    base: u32,
    bytes: Vec<u8>,
}

impl SoundImage {
    /// Lowest occupied address (the image start address).
    pub fn min_addr(&self) -> u32 {
        self.base
    }

    /// Highest occupied address, inclusive.
    pub fn max_addr(&self) -> u32 {
        self.base + self.bytes.len() as u32 - 1
    }

    /// Total image length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Image content in ascending address order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at an absolute address, if occupied.
    pub fn byte_at(&self, addr: u32) -> Option<u8> {
        addr.checked_sub(self.base)
            .and_then(|offset| self.bytes.get(offset as usize).copied())
    }
}
