pub mod batch;
pub mod crypt;
pub mod decompile;
pub mod inspect;

use anyhow::{Context, Result};
use recover::RecoverOptions;
use std::path::Path;

/// Pipeline options, with the opcode table swapped out when a file is given.
pub fn recover_options(opcode_table: Option<&Path>) -> Result<RecoverOptions> {
    match opcode_table {
        Some(path) => RecoverOptions::with_opcode_table_file(path)
            .with_context(|| format!("Failed to load opcode table {:?}", path)),
        None => Ok(RecoverOptions::default()),
    }
}
