use thiserror::Error;

pub const FRAME_LEN: usize = 8;

pub const FRAME_TERMINATOR: u8 = 0x0d;

const CHECKSUM_INDEX: usize = 3;
const TERMINATOR_INDEX: usize = 4;

pub type RawFrame = [u8; FRAME_LEN];

/// A frame that passed terminator and checksum validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub code: u8,

    pub value: u16,
}

/// Reasons a frame is discarded without ending the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameRejection {
    #[error("unexpected data from device: data[4] = 0x{found:02x}, want 0x0d")]
    BadTerminator { found: u8 },

    #[error("checksum error: computed 0x{computed:02x}, expected 0x{expected:02x}")]
    ChecksumMismatch { computed: u8, expected: u8 },

    #[error("CO2 value out of range: {ppm} ppm, expected at most {max} ppm")]
    Co2OutOfRange { ppm: u16, max: u16 },
}

impl FrameRejection {
    /// Out-of-range CO2 readings are expected while the sensor warms up and
    /// are not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, FrameRejection::Co2OutOfRange { .. })
    }
}

pub fn checksum(raw: &RawFrame) -> u8 {
    raw[0].wrapping_add(raw[1]).wrapping_add(raw[2])
}

pub fn parse_frame(raw: &RawFrame) -> Result<Frame, FrameRejection> {
    let found = raw[TERMINATOR_INDEX];
    if found != FRAME_TERMINATOR {
        return Err(FrameRejection::BadTerminator { found });
    }

    let computed = checksum(raw);
    let expected = raw[CHECKSUM_INDEX];
    if computed != expected {
        return Err(FrameRejection::ChecksumMismatch { computed, expected });
    }

    Ok(Frame {
        code: raw[0],
        value: u16::from_be_bytes([raw[1], raw[2]]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame(code: u8, value: u16) -> RawFrame {
        let [hi, lo] = value.to_be_bytes();
        [
            code,
            hi,
            lo,
            code.wrapping_add(hi).wrapping_add(lo),
            FRAME_TERMINATOR,
            0,
            0,
            0,
        ]
    }

    #[test]
    fn parses_big_endian_value() {
        let frame = parse_frame(&raw_frame(0x42, 0x1130)).unwrap();
        assert_eq!(
            frame,
            Frame {
                code: 0x42,
                value: 4400
            }
        );
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        let raw = [0x50, 0xff, 0xff, 0x4e, FRAME_TERMINATOR, 0, 0, 0];
        assert_eq!(checksum(&raw), 0x4e);
        assert!(parse_frame(&raw).is_ok());
    }

    #[test]
    fn rejects_checksum_mismatch_with_details() {
        let mut raw = raw_frame(0x50, 800);
        raw[3] = raw[3].wrapping_add(1);

        let err = parse_frame(&raw).unwrap_err();
        assert_eq!(
            err,
            FrameRejection::ChecksumMismatch {
                computed: checksum(&raw),
                expected: raw[3],
            }
        );
        assert_eq!(
            err.to_string(),
            format!(
                "checksum error: computed 0x{:02x}, expected 0x{:02x}",
                checksum(&raw),
                raw[3]
            )
        );
    }

    #[test]
    fn rejects_bad_terminator_even_with_valid_checksum() {
        let mut raw = raw_frame(0x42, 4400);
        raw[4] = 0x0a;

        assert_eq!(
            parse_frame(&raw),
            Err(FrameRejection::BadTerminator { found: 0x0a })
        );
    }

    #[test]
    fn only_co2_clamp_is_expected() {
        assert!(FrameRejection::Co2OutOfRange { ppm: 5000, max: 3000 }.is_expected());
        assert!(!FrameRejection::BadTerminator { found: 0x00 }.is_expected());
        assert!(
            !FrameRejection::ChecksumMismatch {
                computed: 0x01,
                expected: 0x02
            }
            .is_expected()
        );
    }

    #[test]
    fn ignores_reserved_bytes() {
        let mut raw = raw_frame(0x50, 800);
        raw[5..].copy_from_slice(&[0xde, 0xad, 0xbe]);

        assert_eq!(parse_frame(&raw).unwrap().value, 800);
    }
}
