use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecryptError>;

#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("Invalid envelope: expected DHGAMES marker, found {}", hex::encode(.found))]
    InvalidEnvelope { found: Vec<u8> },
    #[error(
        "Authentication failed: expected DHZAMES marker after block decrypt, found {}",
        hex::encode(.found)
    )]
    AuthenticationFailed { found: Vec<u8> },
    #[error("Inflate error: {reason} (payload starts with {})", hex::encode(.found))]
    Inflate { reason: String, found: Vec<u8> },
}

/// Number of leading bytes kept in an error for diagnosis.
pub(crate) const LEADING_BYTES: usize = 16;

pub(crate) fn leading(data: &[u8]) -> Vec<u8> {
    data[..data.len().min(LEADING_BYTES)].to_vec()
}
