use anyhow::Result;
use clap::Args;
use recover::process::decompile_file;
use std::path::PathBuf;

#[derive(Args)]
pub struct DecompileArgs {
    /// Input asset (encrypted) or chunk
    pub input: PathBuf,
    /// Output file (optional, defaults to input with .dec.lua extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Require a DHGAMES envelope instead of detecting it
    #[arg(long)]
    pub encrypted: bool,
    /// JSON array mapping opcode numbers to operations
    #[arg(long)]
    pub opcode_table: Option<PathBuf>,
}

pub fn handle(args: DecompileArgs) -> Result<()> {
    let options = super::recover_options(args.opcode_table.as_deref())?;
    decompile_file(&args.input, &args.output, args.encrypted, &options)
}
