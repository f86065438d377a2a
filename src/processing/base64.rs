//! Tolerant base64 text-to-bytes decoding for manufacturer data
//!
//! Decoding stops at the first padding symbol and silently skips characters
//! outside the standard alphabet, so it never fails.

const PADDING: u8 = b'=';

/// Map a standard-alphabet symbol to its 6-bit value
fn symbol_value(symbol: u8) -> Option<u32> {
    match symbol {
        b'A'..=b'Z' => Some((symbol - b'A') as u32),
        b'a'..=b'z' => Some((symbol - b'a') as u32 + 26),
        b'0'..=b'9' => Some((symbol - b'0') as u32 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Decode base64 text into raw bytes
pub fn decode(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 3 / 4);
    let mut buffer: u32 = 0;
    let mut bits_collected: u32 = 0;

    for symbol in text.bytes() {
        if symbol == PADDING {
            break;
        }
        let Some(value) = symbol_value(symbol) else {
            continue;
        };

        // Only the low 14 bits are ever read back
        buffer = ((buffer << 6) | value) & 0x3FFF;
        bits_collected += 6;

        if bits_collected >= 8 {
            bits_collected -= 8;
            bytes.push((buffer >> bits_collected) as u8);
        }
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::base64::{engine::general_purpose::STANDARD, Engine};

    #[test]
    fn test_round_trip_with_standard_encoder() {
        let samples: Vec<Vec<u8>> = vec![
            vec![],
            vec![0x00],
            vec![0xFF, 0xFE],
            vec![0x4C, 0x00, 0x02, 0x15],
            (0u8..=255).collect(),
            (0..97).map(|i| (i * 37 % 256) as u8).collect(),
        ];

        for sample in samples {
            let encoded = STANDARD.encode(&sample);
            assert_eq!(decode(&encoded), sample, "round trip failed for {}", encoded);
        }
    }

    #[test]
    fn test_padding_truncates() {
        // "TWFu" is "Man"; everything after the padding is ignored
        assert_eq!(decode("TWE=TWFu"), b"Ma".to_vec());
        assert_eq!(decode("=TWFu"), Vec::<u8>::new());
    }

    #[test]
    fn test_skips_foreign_characters() {
        assert_eq!(decode("TW\nFu"), b"Man".to_vec());
        assert_eq!(decode("T-W_F u!"), b"Man".to_vec());
    }

    #[test]
    fn test_partial_quantum() {
        // Two symbols carry 12 bits: one byte plus 4 dropped bits
        assert_eq!(decode("TW"), vec![0x4D]);
        assert_eq!(decode("T"), Vec::<u8>::new());
    }
}
