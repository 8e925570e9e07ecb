use anyhow::Result;
use clap::Subcommand;
use dhcrypt::process::{decrypt_file, encrypt_file};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum CryptCommands {
    /// Decrypt a DHGAMES asset to a raw chunk
    Decrypt {
        /// Input encrypted file
        input: PathBuf,
        /// Output file (optional, defaults to input with .luac extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Wrap a raw file in a DHGAMES envelope
    Encrypt {
        /// Input file
        input: PathBuf,
        /// Output file (optional, defaults to input with .encrypted extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle(cmd: CryptCommands) -> Result<()> {
    match cmd {
        CryptCommands::Decrypt { input, output } => decrypt_file(&input, &output),
        CryptCommands::Encrypt { input, output } => encrypt_file(&input, &output),
    }
}
