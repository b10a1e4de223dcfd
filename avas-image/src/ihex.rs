//! Intel-HEX text emission.
//!
//! Emits I32HEX: 16-byte data records, a type-04 extended linear address
//! record whenever the upper 16 address bits change, and a type-01 EOF
//! record. No start-address record is written - the flash tool derives entry
//! points from the partition table, not from the image.

use crate::image::SoundImage;

const RECORD_DATA_LEN: usize = 16;

const TYPE_DATA: u8 = 0x00;
const TYPE_EOF: u8 = 0x01;
const TYPE_EXT_LINEAR_ADDR: u8 = 0x04;

/// Render one record: `:LLAAAATT<data>CC`.
fn push_record(out: &mut String, addr: u16, record_type: u8, data: &[u8]) {
    let mut sum = data.len() as u8;
    sum = sum
        .wrapping_add((addr >> 8) as u8)
        .wrapping_add(addr as u8)
        .wrapping_add(record_type);
    out.push(':');
    out.push_str(&format!("{:02X}", data.len()));
    out.push_str(&format!("{addr:04X}"));
    out.push_str(&format!("{record_type:02X}"));
    for &byte in data {
        out.push_str(&format!("{byte:02X}"));
        sum = sum.wrapping_add(byte);
    }
    out.push_str(&format!("{:02X}", sum.wrapping_neg()));
    out.push('\n');
}

/// Serialize the full image as Intel-HEX text, ascending address order.
pub fn to_ihex(image: &SoundImage) -> String {
    let bytes = image.as_bytes();
    // ~45 output chars per 16 input bytes
    let mut out = String::with_capacity(bytes.len() / RECORD_DATA_LEN * 45 + 64);

    let mut addr = image.min_addr();
    let mut offset = 0usize;
    let mut upper: u16 = 0;

    while offset < bytes.len() {
        let high = (addr >> 16) as u16;
        if high != upper {
            push_record(&mut out, 0, TYPE_EXT_LINEAR_ADDR, &high.to_be_bytes());
            upper = high;
        }

        // Rows never cross a 64 KiB boundary; the low address would wrap.
        let to_boundary = 0x1_0000 - (addr & 0xFFFF) as usize;
        let row_len = RECORD_DATA_LEN.min(bytes.len() - offset).min(to_boundary);

        push_record(
            &mut out,
            addr as u16,
            TYPE_DATA,
            &bytes[offset..offset + row_len],
        );
        addr += row_len as u32;
        offset += row_len;
    }

    push_record(&mut out, 0, TYPE_EOF, &[]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageMerger;
    use crate::layout::SoundType;
    use crate::record::SoundRecord;

    fn event_image(start: u32, payloads: &[&[u8]]) -> SoundImage {
        let records: Vec<SoundRecord> = payloads
            .iter()
            .map(|p| SoundRecord::build(p.to_vec(), SoundType::Event, "t.wav").unwrap())
            .collect();
        ImageMerger::new(SoundType::Event, start, None)
            .merge(&records, None)
            .unwrap()
    }

    #[test]
    fn test_header_only_image() {
        let image = event_image(0x1000, &[]);
        let text = to_ihex(&image);
        assert_eq!(text, ":08100000FFFFFFFFFFFFFFFFF0\n:00000001FF\n");
    }

    #[test]
    fn test_ela_record_for_high_base() {
        let image = event_image(0x1011_8000, &[]);
        let text = to_ihex(&image);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(":020000041011D9"));
        assert_eq!(lines.next(), Some(":08800000FFFFFFFFFFFFFFFF80"));
        assert_eq!(lines.next(), Some(":00000001FF"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_no_start_address_record() {
        let image = event_image(0x1011_8000, &[&[1, 2, 3, 4]]);
        let text = to_ihex(&image);
        // Types 03 and 05 never appear
        for line in text.lines() {
            let record_type = &line[7..9];
            assert!(record_type == "00" || record_type == "01" || record_type == "04");
        }
        assert!(text.ends_with(":00000001FF\n"));
    }

    #[test]
    fn test_rows_split_at_64k_boundary() {
        let image = event_image(0xFFF0, &[&[0u8; 12]]);
        // 8 header bytes + 16 record bytes = 24 bytes, 0xFFF0..=0x10007
        let text = to_ihex(&image);
        let lines: Vec<&str> = text.lines().collect();
        // 16 bytes up to 0xFFFF, then ELA 0001, then the remaining 8
        assert!(lines[0].starts_with(":10FFF000"));
        assert_eq!(lines[1], ":020000040001F9");
        assert!(lines[2].starts_with(":08000000"));
        assert_eq!(lines[3], ":00000001FF");
    }

    #[test]
    fn test_checksums_valid() {
        let image = event_image(0x1011_8000, &[&[0xAB; 37]]);
        for line in to_ihex(&image).lines() {
            let bytes: Vec<u8> = (1..line.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&line[i..i + 2], 16).unwrap())
                .collect();
            let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
            assert_eq!(sum, 0, "bad checksum in {line}");
        }
    }

    #[test]
    fn test_round_trip_data() {
        // Parse the hex text back and compare against the image bytes
        let image = event_image(0x1011_8000, &[&[0x5A; 21], &[0x33; 5]]);
        let mut decoded = vec![0u8; image.len()];
        let mut upper: u32 = 0;
        for line in to_ihex(&image).lines() {
            let len = usize::from_str_radix(&line[1..3], 16).unwrap();
            let addr = u32::from_str_radix(&line[3..7], 16).unwrap();
            let record_type = &line[7..9];
            match record_type {
                "04" => upper = u32::from_str_radix(&line[9..13], 16).unwrap() << 16,
                "00" => {
                    let abs = (upper | addr) - image.min_addr();
                    for i in 0..len {
                        let pos = 9 + i * 2;
                        decoded[abs as usize + i] =
                            u8::from_str_radix(&line[pos..pos + 2], 16).unwrap();
                    }
                }
                _ => {}
            }
        }
        assert_eq!(&decoded[..], image.as_bytes());
    }
}
