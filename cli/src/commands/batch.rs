use anyhow::Result;
use clap::{Args, ValueEnum};
use recover::BatchMode;
use recover::process::batch_dir;
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Write decrypted chunks
    Decrypt,
    /// Write decompiled pseudo-source
    Decompile,
}

impl From<Mode> for BatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Decrypt => BatchMode::Decrypt,
            Mode::Decompile => BatchMode::Decompile,
        }
    }
}

#[derive(Args)]
pub struct BatchArgs {
    /// Input directory
    pub input: PathBuf,
    /// Output directory (layout mirrors the input)
    pub output: PathBuf,
    /// What to write for each file
    #[arg(long, value_enum, default_value = "decrypt")]
    pub mode: Mode,
    /// Only process files with this extension, e.g. lua
    #[arg(long)]
    pub ext: Option<String>,
    /// JSON array mapping opcode numbers to operations
    #[arg(long)]
    pub opcode_table: Option<PathBuf>,
}

pub fn handle(args: BatchArgs) -> Result<()> {
    let options = super::recover_options(args.opcode_table.as_deref())?;
    batch_dir(
        &args.input,
        &args.output,
        args.mode.into(),
        args.ext.as_deref(),
        &options,
    )
}
