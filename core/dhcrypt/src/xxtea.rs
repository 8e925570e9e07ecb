use byteorder::{ByteOrder, LE};

/// Amount the running sum moves by each round.
pub const DELTA: u32 = 0x9E37_79B9;

/// Number of rounds for a block of `n` words.
pub fn rounds(n: usize) -> usize {
    6 + 52 / n
}

#[inline]
fn mx(sum: u32, y: u32, z: u32, p: usize, e: usize, key: &[u32; 4]) -> u32 {
    (((z >> 5) ^ (y << 2)).wrapping_add((y >> 3) ^ (z << 4)))
        ^ ((sum ^ y).wrapping_add(key[(p & 3) ^ e] ^ z))
}

/// Decrypt `words` in place. Blocks shorter than two words are left untouched.
pub fn block_decrypt(words: &mut [u32], key: &[u32; 4]) {
    let n = words.len();
    if n < 2 {
        return;
    }
    let mut remaining = rounds(n);
    let mut sum = (remaining as u32).wrapping_mul(DELTA);
    let mut y = words[0];
    while remaining > 0 {
        let e = ((sum >> 2) & 3) as usize;
        for p in (1..n).rev() {
            let z = words[p - 1];
            words[p] = words[p].wrapping_sub(mx(sum, y, z, p, e, key));
            y = words[p];
        }
        let z = words[n - 1];
        words[0] = words[0].wrapping_sub(mx(sum, y, z, 0, e, key));
        y = words[0];
        sum = sum.wrapping_sub(DELTA);
        remaining -= 1;
    }
}

/// Encrypt `words` in place, the inverse of [`block_decrypt`].
pub fn block_encrypt(words: &mut [u32], key: &[u32; 4]) {
    let n = words.len();
    if n < 2 {
        return;
    }
    let mut sum = 0u32;
    let mut z = words[n - 1];
    for _ in 0..rounds(n) {
        sum = sum.wrapping_add(DELTA);
        let e = ((sum >> 2) & 3) as usize;
        for p in 0..n {
            let y = words[(p + 1) % n];
            words[p] = words[p].wrapping_add(mx(sum, y, z, p, e, key));
            z = words[p];
        }
    }
}

fn to_words(data: &[u8]) -> Vec<u32> {
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(4) * 4, 0);
    let mut words = vec![0u32; padded.len() / 4];
    LE::read_u32_into(&padded, &mut words);
    words
}

fn to_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = vec![0u8; words.len() * 4];
    LE::write_u32_into(words, &mut out);
    out
}

/// Decrypt a byte buffer.
///
/// The input is zero-padded to a whole number of words. After decryption the final word
/// holds the real payload length; the output is cut to it when it lies strictly between
/// zero and the padded length, otherwise the padded buffer is returned as is.
pub fn decrypt_bytes(data: &[u8], key: &[u8; 16]) -> Vec<u8> {
    if data.len() < 8 {
        return data.to_vec();
    }
    let mut words = to_words(data);
    block_decrypt(&mut words, &crate::key::key_words(key));

    let mut out = to_bytes(&words);
    let real_len = words[words.len() - 1] as usize;
    if real_len > 0 && real_len < out.len() {
        out.truncate(real_len);
    }
    out
}

/// Encrypt a byte buffer so that [`decrypt_bytes`] restores it exactly.
///
/// The plaintext is zero-padded and followed by a length word.
pub fn encrypt_bytes(data: &[u8], key: &[u8; 16]) -> Vec<u8> {
    let mut words = to_words(data);
    words.push(data.len() as u32);
    block_encrypt(&mut words, &crate::key::key_words(key));
    to_bytes(&words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{derive_key, key_words};

    #[test]
    fn test_round_count() {
        assert_eq!(rounds(8), 12);
        assert_eq!(rounds(2), 32);
        assert_eq!(rounds(100), 6);
    }

    #[test]
    fn test_known_answer_zero_key() {
        let mut words = [0u32, 0];
        block_encrypt(&mut words, &[0; 4]);
        assert_eq!(words, [0x0537_04ab, 0x575d_8c80]);
        block_decrypt(&mut words, &[0; 4]);
        assert_eq!(words, [0, 0]);
    }

    #[test]
    fn test_known_answer_derived_key() {
        let key = key_words(&derive_key());
        let mut words = [
            0xc52c_0d0a,
            0xec4c_3ab3,
            0xc1ea_255c,
            0x1a6f_a306,
            0x022e_f32c,
            0x7da5_a1f8,
            0xd871_e9c4,
            0x3a74_afe8,
        ];
        block_decrypt(&mut words, &key);
        assert_eq!(words, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_single_word_untouched() {
        let mut words = [0xdead_beef];
        block_decrypt(&mut words, &[1, 2, 3, 4]);
        assert_eq!(words, [0xdead_beef]);
    }

    #[test]
    fn test_truncates_to_trailing_length() {
        let key = derive_key();
        let plain = b"DHZAMES and some payload";
        let encrypted = encrypt_bytes(plain, &key);
        assert_eq!(encrypted.len() % 4, 0);
        assert_eq!(decrypt_bytes(&encrypted, &key), plain);
    }

    #[test]
    fn test_no_truncation_when_length_out_of_range() {
        let key = derive_key();
        // Final word 0 leaves the padded buffer intact.
        let mut words = vec![0x1111_1111, 0x2222_2222, 0];
        block_encrypt(&mut words, &key_words(&key));
        let out = decrypt_bytes(&to_bytes(&words), &key);
        assert_eq!(out.len(), 12);

        // Final word equal to the padded length also leaves it intact.
        let mut words = vec![0x1111_1111, 0x2222_2222, 12];
        block_encrypt(&mut words, &key_words(&key));
        let out = decrypt_bytes(&to_bytes(&words), &key);
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_unaligned_input_is_padded() {
        let key = derive_key();
        let out = decrypt_bytes(&[0xAB; 9], &key);
        assert!(out.len() <= 12);
        assert!(!out.is_empty());
    }
}
