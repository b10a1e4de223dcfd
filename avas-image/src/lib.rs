//! AVAS firmware sound image container.
//!
//! Builds the flashable sound image consumed by AVAS firmware from a set of
//! FLAC-encoded audio blobs. Two layout variants exist, selected once per run:
//!
//! | Layout | Header | Record framing | Total size |
//! |--------|--------|----------------|------------|
//! | Engine | magic key + 10 position slots (44 bytes) | size + 80-byte filename + payload | fixed (default 864 KB) |
//! | Event  | 8 reserved `0xFF` bytes | size + payload | content-sized |
//!
//! Records are placed back to back in file order, each one padded with `0xFF`
//! up to the next 4-byte boundary. The finished image is exported as a raw
//! binary dump, an Intel-HEX text file, or a C byte-array header.
//!
//! # Usage
//!
//! ```
//! use avas_image::{ImageMerger, SoundRecord, SoundType};
//!
//! let record = SoundRecord::build(vec![1, 2, 3], SoundType::Event, "beep.wav").unwrap();
//! let merger = ImageMerger::new(SoundType::Event, 0x0000_1000, None);
//! let image = merger.merge(&[record], None).unwrap();
//! assert_eq!(image.min_addr(), 0x0000_1000);
//! ```

mod artifact;
mod ihex;
mod image;
mod layout;
mod positions;
mod record;

pub use artifact::{
    c_header_string, write_bin_file, write_c_header_file, write_hex_file, ENGINE_BIN_FILE,
    ENGINE_FOLDER, ENGINE_HEADER_FILE, ENGINE_HEX_FILE, EVENT_FOLDER, EVENT_HEX_FILE, LOG_FOLDER,
    OUTPUT_FOLDER,
};
pub use ihex::to_ihex;
pub use image::{ImageMerger, SoundImage};
pub use layout::{
    align_word, allocate_addresses, parse_address, SoundType, DEFAULT_ENGINE_START_ADDRESS,
    DEFAULT_EVENT_START_ADDRESS, DEFAULT_IMAGE_SIZE_KB, ENGINE_HEADER_SIZE, EVENT_HEADER_SIZE,
    FILENAME_FIELD_SIZE, MAGIC_KEY, PAD_BYTE, POSITION_LABELS, SOUND_POSITION_COUNT,
    UNASSIGNED_POSITION, WORD_ALIGNMENT,
};
pub use positions::{default_positions, format_address, resolve_positions};
pub use record::SoundRecord;

/// Errors produced while building or exporting a sound image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The encoder handed us a zero-length blob; a record cannot frame it.
    #[error("empty encoded payload")]
    EmptyPayload,

    /// Engine-layout source filename does not fit the 80-byte header field.
    #[error("source filename '{name}' is {len} bytes, exceeds the {max}-byte field")]
    SourceNameTooLong { name: String, len: usize, max: usize },

    /// Engine content (header + records) does not fit the fixed image size.
    #[error(
        "image overflow: content ends at 0x{content_end:08X}, fixed image ends at 0x{limit:08X}"
    )]
    ImageOverflow { content_end: u32, limit: u32 },

    /// One or more sound positions failed to match an allocated address.
    #[error("unmatched sound positions: {}", .slots.join(", "))]
    PositionMismatch { slots: Vec<String> },

    /// A position list of the wrong length was supplied.
    #[error("expected {expected} sound positions, got {got}")]
    PositionCount { expected: usize, got: usize },

    /// A start address that is not 8 hex digits.
    #[error("invalid address '{0}' (expected 8 hex digits)")]
    InvalidAddress(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
