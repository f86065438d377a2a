use crate::core::{
    FilterIdentity, IBEACON_LENGTH, IBEACON_MAJOR_OFFSET, IBEACON_MINOR_OFFSET, IBEACON_MIN_LENGTH,
    IBEACON_TYPE,
};
use crate::hardware::ManufacturerData;
use crate::processing::base64;
use serde::{Deserialize, Serialize};

/// Proximity identifiers reduced from an iBeacon advertisement.
///
/// Only the major/minor pair survives decoding; the rest of the payload is
/// dropped with the raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IBeaconFrame {
    pub major: u16,
    pub minor: u16,
}

impl IBeaconFrame {
    pub fn identity(&self) -> FilterIdentity {
        FilterIdentity::new(self.major, self.minor)
    }
}

/// Validate the iBeacon layout and extract major/minor.
///
/// Returns `None` for anything that is not an iBeacon payload: most
/// advertisements in the wild are not, so this is not an error.
pub fn parse_ibeacon_bytes(bytes: &[u8]) -> Option<IBeaconFrame> {
    if bytes.len() < IBEACON_MIN_LENGTH {
        return None;
    }
    if bytes[2] != IBEACON_TYPE || bytes[3] != IBEACON_LENGTH {
        return None;
    }

    let major = u16::from_be_bytes([bytes[IBEACON_MAJOR_OFFSET], bytes[IBEACON_MAJOR_OFFSET + 1]]);
    let minor = u16::from_be_bytes([bytes[IBEACON_MINOR_OFFSET], bytes[IBEACON_MINOR_OFFSET + 1]]);

    Some(IBeaconFrame { major, minor })
}

/// Decode base64 manufacturer data and parse it as an iBeacon payload
pub fn parse_ibeacon_base64(encoded: &str) -> Option<IBeaconFrame> {
    parse_ibeacon_bytes(&base64::decode(encoded))
}

/// Parse manufacturer data in whichever form the scanner delivered it
pub fn parse_manufacturer_data(data: Option<&ManufacturerData>) -> Option<IBeaconFrame> {
    match data? {
        ManufacturerData::Encoded(encoded) => parse_ibeacon_base64(encoded),
        ManufacturerData::Raw(bytes) => parse_ibeacon_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::base64::{engine::general_purpose::STANDARD, Engine};

    fn frame_bytes(major: u16, minor: u16) -> Vec<u8> {
        let mut data = vec![0x4C, 0x00, 0x02, 0x15];
        data.extend_from_slice(&[0x11; 16]); // Proximity UUID
        data.extend_from_slice(&major.to_be_bytes());
        data.extend_from_slice(&minor.to_be_bytes());
        data.push(0xC5); // Measured power
        data
    }

    #[test]
    fn test_parse_valid_frame() {
        let frame = parse_ibeacon_bytes(&frame_bytes(21, 2)).unwrap();
        assert_eq!(frame, IBeaconFrame { major: 21, minor: 2 });

        let frame = parse_ibeacon_bytes(&frame_bytes(0xBEEF, 0x0102)).unwrap();
        assert_eq!(frame.major, 0xBEEF);
        assert_eq!(frame.minor, 0x0102);
    }

    #[test]
    fn test_big_endian_extraction() {
        let mut data = vec![0u8; 25];
        data[2] = 0x02;
        data[3] = 0x15;
        data[20] = 0x01;
        data[21] = 0x00;
        data[22] = 0x00;
        data[23] = 0xFF;

        let frame = parse_ibeacon_bytes(&data).unwrap();
        assert_eq!(frame.major, 256);
        assert_eq!(frame.minor, 255);
    }

    #[test]
    fn test_trailing_bytes_accepted() {
        let mut data = frame_bytes(9, 4);
        data.extend_from_slice(&[0xAA; 6]);
        assert_eq!(parse_ibeacon_bytes(&data), Some(IBeaconFrame { major: 9, minor: 4 }));
    }

    #[test]
    fn test_short_frames_rejected() {
        let data = frame_bytes(21, 1);
        for len in 0..IBEACON_MIN_LENGTH {
            assert_eq!(parse_ibeacon_bytes(&data[..len]), None, "length {}", len);
        }
    }

    #[test]
    fn test_wrong_markers_rejected() {
        let mut data = frame_bytes(21, 1);
        data[2] = 0x03;
        assert_eq!(parse_ibeacon_bytes(&data), None);

        let mut data = frame_bytes(21, 1);
        data[3] = 0x16;
        assert_eq!(parse_ibeacon_bytes(&data), None);
    }

    #[test]
    fn test_parse_base64() {
        let encoded = STANDARD.encode(frame_bytes(22, 1));
        assert_eq!(parse_ibeacon_base64(&encoded), Some(IBeaconFrame { major: 22, minor: 1 }));

        assert_eq!(parse_ibeacon_base64(""), None);
        assert_eq!(parse_ibeacon_base64("not base64 at all!"), None);
    }

    #[test]
    fn test_parse_manufacturer_data_variants() {
        assert_eq!(parse_manufacturer_data(None), None);

        let raw = ManufacturerData::Raw(frame_bytes(21, 1));
        assert_eq!(parse_manufacturer_data(Some(&raw)), Some(IBeaconFrame { major: 21, minor: 1 }));

        let encoded = ManufacturerData::Encoded(STANDARD.encode(frame_bytes(21, 1)));
        assert_eq!(parse_manufacturer_data(Some(&encoded)), Some(IBeaconFrame { major: 21, minor: 1 }));
    }
}
