use byteorder::{ByteOrder, LE};

/// Base key recovered from the client binary.
pub const BASE_KEY: [u8; 16] = [
    0x44, 0xfa, 0xe7, 0xba, 0xcc, 0xfe, 0xfb, 0x5c, 0x1a, 0xfb, 0xbd, 0xbb, 0x93, 0xb5, 0x83, 0xe7,
];

/// Substitution table mixed into bytes 1..16 of the base key.
pub const KEY_TABLE: [u8; 21] = [
    0x1b, 0xc3, 0xae, 0xf5, 0x87, 0x8d, 0xaf, 0x3f, 0x2b, 0xc2, 0xd3, 0xfc, 0xfe, 0xe6, 0xf3, 0xa1,
    0x3c, 0x3c, 0xfc, 0xb4, 0x65,
];

/// Cursor position the key table starts at and wraps back to.
const KEY_CURSOR_START: usize = 7;

/// Derive the 16-byte block cipher key.
///
/// Byte 0 is taken from [`BASE_KEY`] unchanged. Every following byte is XORed with
/// [`KEY_TABLE`] at a cursor that starts at 7 and wraps back to 7 when it reaches 21.
pub fn derive_key() -> [u8; 16] {
    let mut key = BASE_KEY;
    let mut cursor = KEY_CURSOR_START;
    for byte in key.iter_mut().skip(1) {
        if cursor == KEY_TABLE.len() {
            cursor = KEY_CURSOR_START;
        }
        *byte ^= KEY_TABLE[cursor];
        cursor += 1;
    }
    key
}

/// Split a 16-byte key into the four little-endian words the cipher consumes.
pub fn key_words(key: &[u8; 16]) -> [u32; 4] {
    let mut words = [0u32; 4];
    LE::read_u32_into(key, &mut words);
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_reference() {
        let expected = [
            0x44, 0xc5, 0xcc, 0x78, 0x1f, 0x02, 0x05, 0xba, 0xe9, 0x5a, 0x81, 0x87, 0x6f, 0x01,
            0xe6, 0xd8,
        ];
        assert_eq!(derive_key(), expected);
        assert_eq!(hex::encode(derive_key()), "44c5cc781f0205bae95a81876f01e6d8");
    }

    #[test]
    fn test_key_byte_zero_untouched() {
        assert_eq!(derive_key()[0], BASE_KEY[0]);
    }

    #[test]
    fn test_last_key_byte_uses_wrapped_cursor() {
        // Bytes 1..=14 consume table slots 7..=20, byte 15 wraps back to slot 7.
        let key = derive_key();
        assert_eq!(key[14], BASE_KEY[14] ^ KEY_TABLE[20]);
        assert_eq!(key[15], BASE_KEY[15] ^ KEY_TABLE[7]);
    }

    #[test]
    fn test_key_words_little_endian() {
        let words = key_words(&derive_key());
        assert_eq!(words[0], 0x78cc_c544);
        assert_eq!(words[3], 0xd8e6_016f);
    }
}
