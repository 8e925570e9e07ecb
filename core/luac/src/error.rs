use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported chunk header: {field} expected {expected}, found {found}")]
    Format {
        field: &'static str,
        expected: String,
        found: String,
    },
    #[error("Truncated input at offset {offset:#x}: needed {needed} bytes, {remaining} left")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("Unknown constant tag {tag} at offset {offset:#x}")]
    UnknownConstantTag { tag: u8, offset: usize },
    #[error("Chunk exceeds parse limit: {0}")]
    LimitExceeded(String),
}
