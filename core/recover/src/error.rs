use dhcrypt::DecryptError;
use luac::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Fatal, per-asset failure of the recovery pipeline.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decrypt(#[from] DecryptError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Neither an encrypted asset nor a chunk: leading bytes {found}")]
    Unrecognized { found: String },
}

/// Flat classification of [`DecodeError`], for reports and tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    InvalidEnvelope,
    AuthenticationFailed,
    Inflate,
    Format,
    TruncatedInput,
    UnknownConstantTag,
    LimitExceeded,
    Config,
    Unrecognized,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Io(_) => ErrorKind::Io,
            DecodeError::Decrypt(e) => match e {
                DecryptError::InvalidEnvelope { .. } => ErrorKind::InvalidEnvelope,
                DecryptError::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
                DecryptError::Inflate { .. } => ErrorKind::Inflate,
            },
            DecodeError::Parse(e) => match e {
                ParseError::Io(_) => ErrorKind::Io,
                ParseError::Json(_) => ErrorKind::Config,
                ParseError::Format { .. } => ErrorKind::Format,
                ParseError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
                ParseError::UnknownConstantTag { .. } => ErrorKind::UnknownConstantTag,
                ParseError::LimitExceeded(_) => ErrorKind::LimitExceeded,
            },
            DecodeError::Unrecognized { .. } => ErrorKind::Unrecognized,
        }
    }
}
