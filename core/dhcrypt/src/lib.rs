pub mod error;
pub mod inflate;
pub mod key;
pub mod process;
pub mod xor;
pub mod xxtea;

pub use error::{DecryptError, Result};
pub use inflate::{deflate, inflate};
pub use key::derive_key;
pub use xor::stream_xor;

use error::leading;
use tracing::debug;

/// Literal every encrypted asset opens with.
pub const ENVELOPE_MARKER: &[u8; 7] = b"DHGAMES";

/// Literal the block-decrypted payload must open with.
///
/// This is a plain byte comparison, not a MAC. A wrong key or table shows up here.
pub const PAYLOAD_MARKER: &[u8; 7] = b"DHZAMES";

/// Whether `data` carries the encrypted asset envelope.
pub fn is_envelope(data: &[u8]) -> bool {
    data.starts_with(ENVELOPE_MARKER)
}

/// Decrypt an asset.
///
/// Pipeline: envelope check → stream xor → block decrypt → payload marker check → inflate.
pub fn decrypt(asset: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = asset
        .strip_prefix(ENVELOPE_MARKER.as_slice())
        .ok_or_else(|| DecryptError::InvalidEnvelope {
            found: leading(asset),
        })?;

    let key = derive_key();
    let xored = stream_xor(ciphertext);
    let decrypted = xxtea::decrypt_bytes(&xored, &key);
    debug!(
        ciphertext = ciphertext.len(),
        decrypted = decrypted.len(),
        "block decrypt finished"
    );

    let payload = decrypted
        .strip_prefix(PAYLOAD_MARKER.as_slice())
        .ok_or_else(|| DecryptError::AuthenticationFailed {
            found: leading(&decrypted),
        })?;

    let inflated = inflate(payload)?;
    debug!(inflated = inflated.len(), "payload inflated");
    Ok(inflated)
}

/// Encrypt raw bytes into an asset that [`decrypt`] accepts.
///
/// Pipeline: deflate → payload marker → block encrypt → stream xor → envelope marker.
pub fn encrypt(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut payload = PAYLOAD_MARKER.to_vec();
    payload.extend_from_slice(&deflate(data)?);

    let encrypted = xxtea::encrypt_bytes(&payload, &derive_key());

    let mut out = ENVELOPE_MARKER.to_vec();
    out.extend_from_slice(&stream_xor(&encrypted));
    Ok(out)
}
