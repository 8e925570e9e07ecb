use anyhow::Result;
use clap::Subcommand;
use luac::process::{luac_disasm, luac_dump, luac_info};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum LuacCommands {
    /// Print header fields, a hex dump and a tree summary
    Info {
        /// Input chunk
        input: PathBuf,
    },
    /// Print an instruction listing
    Disasm {
        /// Input chunk
        input: PathBuf,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump the prototype tree as JSON
    Dump {
        /// Input chunk
        input: PathBuf,
        /// Output JSON file (optional, defaults to input with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle(cmd: LuacCommands) -> Result<()> {
    match cmd {
        LuacCommands::Info { input } => luac_info(&input),
        LuacCommands::Disasm { input, output } => luac_disasm(&input, &output),
        LuacCommands::Dump { input, output } => luac_dump(&input, &output),
    }
}
