pub mod batch;
pub mod error;
pub mod process;
pub mod types;

pub use batch::{BatchMode, BatchReport, run_batch};
pub use error::{DecodeError, ErrorKind, Result};
pub use types::RecoveredAsset;

use luac::{OpcodeTable, ParseLimits};
use tracing::{debug, warn};

/// Knobs shared by every entry point of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RecoverOptions {
    pub opcode_table: OpcodeTable,
    pub limits: ParseLimits,
}

impl RecoverOptions {
    /// Options with an opcode table loaded from a JSON file.
    pub fn with_opcode_table_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self {
            opcode_table: OpcodeTable::from_json(&text)?,
            ..Default::default()
        })
    }
}

/// Decrypt, parse and synthesize an encrypted asset.
pub fn recover(raw: &[u8]) -> Result<RecoveredAsset> {
    recover_with(raw, &RecoverOptions::default())
}

pub fn recover_with(raw: &[u8], options: &RecoverOptions) -> Result<RecoveredAsset> {
    let chunk = dhcrypt::decrypt(raw)?;
    recover_chunk_with(&chunk, options)
}

/// Parse and synthesize an already decrypted chunk.
pub fn recover_chunk(chunk: &[u8]) -> Result<RecoveredAsset> {
    recover_chunk_with(chunk, &RecoverOptions::default())
}

pub fn recover_chunk_with(chunk: &[u8], options: &RecoverOptions) -> Result<RecoveredAsset> {
    let prototype = luac::parse_with(chunk, &options.opcode_table, options.limits)?;
    let synthesis = decompiler::synthesize(&prototype);

    for diagnostic in &synthesis.diagnostics {
        warn!("{}", diagnostic);
    }
    debug!(
        prototypes = prototype.count(),
        diagnostics = synthesis.diagnostics.len(),
        "asset recovered"
    );

    Ok(RecoveredAsset {
        prototype,
        text: synthesis.text,
        diagnostics: synthesis.diagnostics,
    })
}

/// Recover from either an encrypted asset or a plain chunk, picked by leading bytes.
pub fn recover_any(data: &[u8], options: &RecoverOptions) -> Result<RecoveredAsset> {
    if dhcrypt::is_envelope(data) {
        recover_with(data, options)
    } else if luac::is_chunk(data) {
        recover_chunk_with(data, options)
    } else {
        Err(DecodeError::Unrecognized {
            found: hex::encode(&data[..data.len().min(16)]),
        })
    }
}
