use std::{fmt, str::FromStr};

use anyhow::{Context as _, Error, bail};

use crate::co2mon::{FRAME_LEN, FRAME_TERMINATOR, RawFrame};

pub const MAGIC_TABLE_LEN: usize = 8;

// Fixed by the device firmware, independent of the session key.
const SCRAMBLE_WORD: &[u8; FRAME_LEN] = b"Htemp99e";

// Source byte of the report for each position of the descrambled frame.
const SHUFFLE: [usize; FRAME_LEN] = [2, 4, 0, 7, 1, 6, 5, 3];

/// Session key sent to the device before reading. All-zero disables the
/// key-dependent part of the scrambling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MagicTable([u8; MAGIC_TABLE_LEN]);

impl MagicTable {
    pub const fn new(bytes: [u8; MAGIC_TABLE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MAGIC_TABLE_LEN] {
        &self.0
    }

    /// Turns a report as read from the wire into a frame. Newer firmware sends
    /// plain frames, recognisable by the terminator already sitting at byte 4.
    pub fn decode_report(&self, report: &RawFrame) -> RawFrame {
        if report[4] == FRAME_TERMINATOR {
            return *report;
        }

        self.descramble(report)
    }

    pub fn descramble(&self, report: &RawFrame) -> RawFrame {
        let mut shuffled = [0u8; FRAME_LEN];
        for (dst, &src) in shuffled.iter_mut().zip(SHUFFLE.iter()) {
            *dst = report[src];
        }

        for (b, k) in shuffled.iter_mut().zip(self.0) {
            *b ^= k;
        }

        let mut frame = u64::from_be_bytes(shuffled).rotate_right(3).to_be_bytes();
        for (b, w) in frame.iter_mut().zip(SCRAMBLE_WORD) {
            *b = b.wrapping_sub(w.rotate_left(4));
        }

        frame
    }
}

impl fmt::Display for MagicTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for MagicTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != MAGIC_TABLE_LEN * 2 {
            bail!(
                "magic table must be {} hex digits, got {}",
                MAGIC_TABLE_LEN * 2,
                s.len()
            );
        }

        let mut bytes = [0u8; MAGIC_TABLE_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            let digits = s
                .get(i * 2..i * 2 + 2)
                .with_context(|| format!("invalid magic table: {s}"))?;
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                bail!("invalid hex byte in magic table: {digits}");
            }
            *b = u8::from_str_radix(digits, 16)
                .with_context(|| format!("invalid hex byte in magic table: {digits}"))?;
        }

        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scramble(table: &MagicTable, frame: &RawFrame) -> RawFrame {
        let mut shifted = *frame;
        for (b, w) in shifted.iter_mut().zip(SCRAMBLE_WORD) {
            *b = b.wrapping_add(w.rotate_left(4));
        }

        let mut shuffled = u64::from_be_bytes(shifted).rotate_left(3).to_be_bytes();
        for (b, k) in shuffled.iter_mut().zip(table.as_bytes()) {
            *b ^= k;
        }

        let mut report = [0u8; FRAME_LEN];
        for (i, &src) in SHUFFLE.iter().enumerate() {
            report[src] = shuffled[i];
        }
        report
    }

    const TEMPERATURE_FRAME: RawFrame = [0x42, 0x11, 0x30, 0x83, 0x0d, 0x00, 0x00, 0x00];

    #[test]
    fn plain_reports_pass_through() {
        let table = MagicTable::new([0x86, 0x41, 0xc9, 0xa8, 0x7f, 0x41, 0x3c, 0xac]);
        assert_eq!(table.decode_report(&TEMPERATURE_FRAME), TEMPERATURE_FRAME);
    }

    #[test]
    fn descrambles_with_default_table() {
        let table = MagicTable::default();
        let report = scramble(&table, &TEMPERATURE_FRAME);

        assert_ne!(report[4], FRAME_TERMINATOR);
        assert_eq!(table.decode_report(&report), TEMPERATURE_FRAME);
    }

    #[test]
    fn descrambling_depends_on_table() {
        let table = MagicTable::new([0x86, 0x41, 0xc9, 0xa8, 0x7f, 0x41, 0x3c, 0xac]);
        let report = scramble(&table, &TEMPERATURE_FRAME);

        assert_eq!(table.descramble(&report), TEMPERATURE_FRAME);
        assert_ne!(MagicTable::default().descramble(&report), TEMPERATURE_FRAME);
    }

    #[test]
    fn parses_and_displays_hex() {
        let table: MagicTable = "0x8641c9a87f413cac".parse().unwrap();
        assert_eq!(
            table.as_bytes(),
            &[0x86, 0x41, 0xc9, 0xa8, 0x7f, 0x41, 0x3c, 0xac]
        );
        assert_eq!(table.to_string(), "8641c9a87f413cac");
        assert_eq!(MagicTable::default().to_string(), "0000000000000000");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("0011".parse::<MagicTable>().is_err());
        assert!("zz00000000000000".parse::<MagicTable>().is_err());
        assert!("00000000000000000".parse::<MagicTable>().is_err());
        assert!("+1+1+1+1+1+1+1+1".parse::<MagicTable>().is_err());
    }
}
