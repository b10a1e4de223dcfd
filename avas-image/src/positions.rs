//! Engine sound position validation.
//!
//! The 10 position slots hold user-editable 8-hex-digit address strings.
//! Before the final merge every non-sentinel value must match one of the
//! allocated record addresses exactly; the whole batch is validated as a
//! unit so a single typo never produces a half-committed header.

use crate::layout::{POSITION_LABELS, SOUND_POSITION_COUNT, UNASSIGNED_POSITION};
use crate::ImageError;

/// Format an address as the 8-digit uppercase hex the position table uses.
pub fn format_address(addr: u32) -> String {
    format!("{addr:08X}")
}

/// All slots unassigned.
pub fn default_positions() -> Vec<String> {
    vec![format_address(UNASSIGNED_POSITION); SOUND_POSITION_COUNT]
}

/// Resolve user-entered position strings against the address table.
///
/// Returns the numeric slot values for the engine header. Slots that are not
/// valid hex, or that name an address absent from the table, are collected
/// and reported together as `PositionMismatch`.
pub fn resolve_positions(
    values: &[String],
    address_table: &[u32],
) -> Result<[u32; SOUND_POSITION_COUNT], ImageError> {
    if values.len() != SOUND_POSITION_COUNT {
        return Err(ImageError::PositionCount {
            expected: SOUND_POSITION_COUNT,
            got: values.len(),
        });
    }

    let mut resolved = [UNASSIGNED_POSITION; SOUND_POSITION_COUNT];
    let mut unmatched = Vec::new();

    for (i, value) in values.iter().enumerate() {
        let value = value.trim().to_uppercase();
        match crate::layout::parse_address(&value) {
            Ok(addr) if addr == UNASSIGNED_POSITION => {}
            Ok(addr) if address_table.contains(&addr) => resolved[i] = addr,
            _ => unmatched.push(POSITION_LABELS[i].to_string()),
        }
    }

    if unmatched.is_empty() {
        Ok(resolved)
    } else {
        Err(ImageError::PositionMismatch { slots: unmatched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_positions_all_sentinel() {
        let defaults = default_positions();
        assert_eq!(defaults.len(), SOUND_POSITION_COUNT);
        assert!(defaults.iter().all(|p| p == "FFFFFFFF"));
    }

    #[test]
    fn test_resolve_defaults() {
        let table = vec![0x1011_802C, 0x1011_8100];
        let resolved = resolve_positions(&default_positions(), &table).unwrap();
        assert_eq!(resolved, [UNASSIGNED_POSITION; SOUND_POSITION_COUNT]);
    }

    #[test]
    fn test_resolve_matching_address() {
        let table = vec![0x1011_8100, 0x1011_8200];
        let mut values = default_positions();
        values[0] = "10118100".to_string();
        values[3] = "10118200".to_string();

        let resolved = resolve_positions(&values, &table).unwrap();
        assert_eq!(resolved[0], 0x1011_8100);
        assert_eq!(resolved[3], 0x1011_8200);
        assert_eq!(resolved[1], UNASSIGNED_POSITION);
    }

    #[test]
    fn test_resolve_lowercase_and_whitespace() {
        let table = vec![0x1011_8100];
        let mut values = default_positions();
        values[9] = " 10118100 ".to_string();
        let resolved = resolve_positions(&values, &table).unwrap();
        assert_eq!(resolved[9], 0x1011_8100);
    }

    #[test]
    fn test_resolve_unknown_address_fails() {
        let table = vec![0x1011_8100];
        let mut values = default_positions();
        values[0] = "DEADBEEF".to_string();

        let err = resolve_positions(&values, &table).unwrap_err();
        match err {
            ImageError::PositionMismatch { slots } => assert_eq!(slots, vec!["F1".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_invalid_hex_fails() {
        let table = vec![0x1011_8100];
        let mut values = default_positions();
        values[4] = "XYZ".to_string();
        values[7] = "10118100".to_string();

        let err = resolve_positions(&values, &table).unwrap_err();
        match err {
            ImageError::PositionMismatch { slots } => assert_eq!(slots, vec!["S2".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_collects_all_failures() {
        let table = vec![];
        let mut values = default_positions();
        values[0] = "00000001".to_string();
        values[9] = "00000002".to_string();

        let err = resolve_positions(&values, &table).unwrap_err();
        match err {
            ImageError::PositionMismatch { slots } => {
                assert_eq!(slots, vec!["F1".to_string(), "R2".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_slot_count() {
        let err = resolve_positions(&vec!["FFFFFFFF".to_string(); 3], &[]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::PositionCount {
                expected: 10,
                got: 3
            }
        ));
    }
}
