//! Output artifact emission.
//!
//! A finalized image exports to three forms: a flat binary dump, an
//! Intel-HEX text file, and a C byte-array header for firmware builds that
//! link the sound data in directly. All three contain the identical byte
//! sequence in ascending address order.

use std::fs;
use std::path::Path;

use crate::ihex::to_ihex;
use crate::image::SoundImage;
use crate::ImageError;

/// Output folder names, fixed by the release process.
pub const OUTPUT_FOLDER: &str = "Output";
pub const ENGINE_FOLDER: &str = "EngineSound";
pub const EVENT_FOLDER: &str = "EventSound";
pub const LOG_FOLDER: &str = "log";

pub const ENGINE_BIN_FILE: &str = "MergedEngineSound.bin";
pub const ENGINE_HEADER_FILE: &str = "EngineSound_VARIANT.h";
pub const ENGINE_HEX_FILE: &str = "MergedEngineSound.hex";
pub const EVENT_HEX_FILE: &str = "MergedEventSound.hex";

const HEADER_GUARD: &str = "_SOUND_DATA_H_";
const HEADER_ARRAY_NAME: &str = "sound_data";
const BYTES_PER_LINE: usize = 16;

/// Write the raw binary dump: every byte from min to max address.
pub fn write_bin_file(image: &SoundImage, path: &Path) -> Result<(), ImageError> {
    fs::write(path, image.as_bytes())?;
    Ok(())
}

/// Write the Intel-HEX text form.
pub fn write_hex_file(image: &SoundImage, path: &Path) -> Result<(), ImageError> {
    fs::write(path, to_ihex(image))?;
    Ok(())
}

/// Write the C header form.
pub fn write_c_header_file(image: &SoundImage, path: &Path) -> Result<(), ImageError> {
    fs::write(path, c_header_string(image))?;
    Ok(())
}

/// Render the image as an include-guarded C byte array, 16 bytes per line.
pub fn c_header_string(image: &SoundImage) -> String {
    let data = image.as_bytes();
    let mut out = String::with_capacity(data.len() * 6 + 128);

    out.push_str(&format!("#ifndef {HEADER_GUARD}\n"));
    out.push_str(&format!("#define {HEADER_GUARD}\n\n"));
    out.push_str(&format!(
        "const unsigned char {HEADER_ARRAY_NAME}[{}] = {{\n",
        data.len()
    ));

    for chunk_start in (0..data.len()).step_by(BYTES_PER_LINE) {
        out.push_str("    ");
        for i in chunk_start..chunk_start + BYTES_PER_LINE {
            if i < data.len() {
                out.push_str(&format!("0x{:02X}", data[i]));
                if i < data.len() - 1 {
                    out.push_str(", ");
                } else {
                    out.push(' ');
                }
            }
        }
        out.push('\n');
    }

    out.push_str("};\n\n");
    out.push_str(&format!("#endif //{HEADER_GUARD}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageMerger;
    use crate::layout::SoundType;
    use crate::record::SoundRecord;
    use tempfile::tempdir;

    fn small_image() -> SoundImage {
        let record = SoundRecord::build(vec![0x11, 0x22, 0x33], SoundType::Event, "x.wav").unwrap();
        ImageMerger::new(SoundType::Event, 0x1000, None)
            .merge(&[record], None)
            .unwrap()
    }

    /// Pull the byte values back out of the rendered header.
    fn parse_header_bytes(header: &str) -> Vec<u8> {
        header
            .lines()
            .filter(|l| l.starts_with("    0x"))
            .flat_map(|l| l.split(','))
            .filter_map(|tok| {
                let tok = tok.trim();
                tok.strip_prefix("0x")
                    .map(|h| u8::from_str_radix(h, 16).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_header_format() {
        let image = small_image();
        let header = c_header_string(&image);

        assert!(header.starts_with("#ifndef _SOUND_DATA_H_\n#define _SOUND_DATA_H_\n\n"));
        assert!(header.contains(&format!(
            "const unsigned char sound_data[{}] = {{",
            image.len()
        )));
        assert!(header.ends_with("};\n\n#endif //_SOUND_DATA_H_\n"));
    }

    #[test]
    fn test_header_bytes_match_bin_dump() {
        let image = small_image();
        assert_eq!(parse_header_bytes(&c_header_string(&image)), image.as_bytes());
    }

    #[test]
    fn test_header_sixteen_bytes_per_line() {
        let record = SoundRecord::build(vec![0xAB; 60], SoundType::Event, "y.wav").unwrap();
        let image = ImageMerger::new(SoundType::Event, 0x1000, None)
            .merge(&[record], None)
            .unwrap();
        let header = c_header_string(&image);

        let data_lines: Vec<&str> = header.lines().filter(|l| l.starts_with("    0x")).collect();
        // 8 + 64 = 72 bytes -> 4 full lines of 16 plus one of 8
        assert_eq!(data_lines.len(), 5);
        assert_eq!(data_lines[0].matches("0x").count(), 16);
        assert_eq!(data_lines[4].matches("0x").count(), 8);
        // Last byte has no trailing comma
        assert!(data_lines[4].trim_end().ends_with("0xAB"));
    }

    #[test]
    fn test_bin_and_hex_files_written() {
        let dir = tempdir().unwrap();
        let image = small_image();

        let bin_path = dir.path().join(EVENT_HEX_FILE).with_extension("bin");
        write_bin_file(&image, &bin_path).unwrap();
        assert_eq!(fs::read(&bin_path).unwrap(), image.as_bytes());

        let hex_path = dir.path().join(EVENT_HEX_FILE);
        write_hex_file(&image, &hex_path).unwrap();
        let text = fs::read_to_string(&hex_path).unwrap();
        assert!(text.ends_with(":00000001FF\n"));
    }

    #[test]
    fn test_all_three_forms_carry_identical_bytes() {
        let dir = tempdir().unwrap();
        let image = small_image();

        let bin_path = dir.path().join("image.bin");
        write_bin_file(&image, &bin_path).unwrap();
        let bin_bytes = fs::read(&bin_path).unwrap();

        let header_bytes = parse_header_bytes(&c_header_string(&image));
        assert_eq!(bin_bytes, header_bytes);
    }
}
