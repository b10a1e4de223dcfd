//! Layout constants and address math.
//!
//! The header sizes, the magic key, the 80-byte filename field and the 864 KB
//! default image size are contract constants of the target flash controller.
//! They are named here instead of being spread through the code as literals.

use crate::ImageError;

/// Engine image magic key, written little-endian at the start address.
pub const MAGIC_KEY: u32 = 0x5AA5_5AA5;

/// Engine header: magic key (4) + 10 position slots (40).
pub const ENGINE_HEADER_SIZE: u32 = 44;

/// Event header: reserved bytes, filled with `0xFF`.
pub const EVENT_HEADER_SIZE: u32 = 8;

/// Engine record filename field, NUL-padded.
pub const FILENAME_FIELD_SIZE: usize = 80;

/// Records start on 4-byte boundaries.
pub const WORD_ALIGNMENT: u32 = 4;

/// Number of engine sound position slots.
pub const SOUND_POSITION_COUNT: usize = 10;

/// Slot value meaning "no sound assigned".
pub const UNASSIGNED_POSITION: u32 = 0xFFFF_FFFF;

/// Fill byte for headers, alignment gaps and the engine tail.
pub const PAD_BYTE: u8 = 0xFF;

/// Engine start address is fixed by the flash partition table.
pub const DEFAULT_ENGINE_START_ADDRESS: &str = "10118000";

/// Event images default to a low offset but remain relocatable.
pub const DEFAULT_EVENT_START_ADDRESS: &str = "00001000";

/// Engine image size in KB (864 KB partition).
pub const DEFAULT_IMAGE_SIZE_KB: f64 = 864.0;

/// Position slot labels in header order.
pub const POSITION_LABELS: [&str; SOUND_POSITION_COUNT] =
    ["F1", "F2", "F3", "S1", "S2", "S3", "C1", "C2", "R1", "R2"];

/// Image layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    /// Continuous, position-addressable sound set with a fixed image size.
    Engine,
    /// Discrete one-shot sounds, content-sized image.
    Event,
}

impl SoundType {
    /// Header size in bytes for this layout.
    pub fn header_size(self) -> u32 {
        match self {
            SoundType::Engine => ENGINE_HEADER_SIZE,
            SoundType::Event => EVENT_HEADER_SIZE,
        }
    }

    /// Offset of the compressed payload within a record.
    pub fn payload_offset(self) -> u32 {
        match self {
            SoundType::Engine => 4 + FILENAME_FIELD_SIZE as u32,
            SoundType::Event => 4,
        }
    }

    /// Output subfolder name for this layout.
    pub fn folder_name(self) -> &'static str {
        match self {
            SoundType::Engine => crate::artifact::ENGINE_FOLDER,
            SoundType::Event => crate::artifact::EVENT_FOLDER,
        }
    }
}

impl std::fmt::Display for SoundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundType::Engine => write!(f, "Engine Sound"),
            SoundType::Event => write!(f, "Event Sound"),
        }
    }
}

/// Round `addr` up to the next word boundary.
pub fn align_word(addr: u32) -> u32 {
    addr + ((WORD_ALIGNMENT - addr % WORD_ALIGNMENT) % WORD_ALIGNMENT)
}

/// Parse an 8-hex-digit address string.
pub fn parse_address(s: &str) -> Result<u32, ImageError> {
    if s.len() != 8 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ImageError::InvalidAddress(s.to_string()));
    }
    u32::from_str_radix(s, 16).map_err(|_| ImageError::InvalidAddress(s.to_string()))
}

/// Assign a placement address to each record, in order.
///
/// The first record lands right after the layout header; each subsequent one
/// starts at the word-aligned end of its predecessor. The returned table is
/// what engine mode later shows the user as position match targets.
pub fn allocate_addresses(sound_type: SoundType, start_address: u32, sizes: &[u32]) -> Vec<u32> {
    let mut addresses = Vec::with_capacity(sizes.len());
    let mut cursor = start_address + sound_type.header_size();
    for &size in sizes {
        addresses.push(cursor);
        cursor = align_word(cursor + size);
    }
    addresses
}
