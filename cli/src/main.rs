use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;

use commands::batch::BatchArgs;
use commands::crypt::CryptCommands;
use commands::decompile::DecompileArgs;
use commands::inspect::LuacCommands;

#[derive(Parser)]
#[command(name = "dhlua")]
#[command(about = "Decrypt and decompile DHGAMES-wrapped Lua 5.1 assets", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). A set RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Envelope Operations (Decrypt/Encrypt)
    #[command(subcommand)]
    Crypt(CryptCommands),
    /// Chunk Inspection (Info/Disasm/Dump)
    #[command(subcommand)]
    Luac(LuacCommands),
    /// Decompile a single asset or chunk to pseudo-source
    Decompile(DecompileArgs),
    /// Decrypt or decompile a whole directory tree
    Batch(BatchArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Crypt(cmd) => commands::crypt::handle(cmd),
        Commands::Luac(cmd) => commands::inspect::handle(cmd),
        Commands::Decompile(args) => commands::decompile::handle(args),
        Commands::Batch(args) => commands::batch::handle(args),
    }
}

/// `RUST_LOG`, when set, non-empty and valid, replaces the level picked by `-v`.
fn log_filter(verbose: u8, rust_log: Option<String>) -> EnvFilter {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    rust_log
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let filter = log_filter(0, Some("debug".into()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = log_filter(2, Some("error".into()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_verbosity_without_rust_log() {
        assert_eq!(log_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(1, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(3, None).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
