/// Byte table XORed over the ciphertext before block decryption.
pub const STREAM_TABLE: [u8; 28] = [
    0x3c, 0xb5, 0x3c, 0x7f, 0x83, 0x94, 0xba, 0x3b, 0x2b, 0xb2, 0x73, 0x5b, 0xef, 0xee, 0xe2, 0xa3,
    0x3b, 0x2b, 0xcc, 0x66, 0x3d, 0xe5, 0x2c, 0xd7, 0x4d, 0x2e, 0x17, 0xe6,
];

/// Index the stream cursor resets to once it runs off the end of the table.
const STREAM_RESTART: usize = 7;

/// Table indices consumed by `len` bytes of input.
///
/// The first pass walks the whole table, every later pass only covers indices 7..28.
/// Plain modulo indexing produces different output and must not be used here.
pub fn stream_indices(len: usize) -> impl Iterator<Item = usize> {
    let mut cursor = 0usize;
    (0..len).map(move |_| {
        let index = cursor;
        cursor += 1;
        if cursor == STREAM_TABLE.len() {
            cursor = STREAM_RESTART;
        }
        index
    })
}

/// XOR `data` against [`STREAM_TABLE`]. Applying it twice restores the input.
pub fn stream_xor(data: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(stream_indices(data.len()))
        .map(|(byte, index)| byte ^ STREAM_TABLE[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_sequence_35_bytes() {
        let indices: Vec<usize> = stream_indices(35).collect();
        let expected: Vec<usize> = (0..28).chain(7..14).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_later_passes_repeat_21_indices() {
        let indices: Vec<usize> = stream_indices(28 + 21 * 2).collect();
        assert_eq!(&indices[28..49], &indices[49..70]);
        assert_eq!(indices[28], 7);
        assert_eq!(indices[48], 27);
    }

    #[test]
    fn test_xor_zeros_reveals_table() {
        let out = stream_xor(&[0u8; 35]);
        for (i, index) in stream_indices(35).enumerate() {
            assert_eq!(out[i], STREAM_TABLE[index], "byte {i}");
        }
        assert_eq!(out[28], STREAM_TABLE[7]);
        assert_eq!(out[34], STREAM_TABLE[13]);
    }

    #[test]
    fn test_xor_is_involution() {
        let data: Vec<u8> = (0..200u32).map(|i| (i * 7 % 251) as u8).collect();
        assert_eq!(stream_xor(&stream_xor(&data)), data);
    }
}
