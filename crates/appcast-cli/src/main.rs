//! appcast - signed update manifests for release binaries

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use appcast_cli::cmd;
use appcast_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays scriptable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd::generate::generate(&args),
        Commands::Keygen { output, force } => cmd::keys::keygen(output.as_deref(), force),
        Commands::Sign {
            file,
            key_file,
            output,
        } => cmd::keys::sign(&file, key_file.as_deref(), output.as_deref()),
        Commands::Verify {
            file,
            signature,
            public_key,
            key_file,
        } => cmd::keys::verify(
            &file,
            signature.as_deref(),
            public_key.as_deref(),
            key_file.as_deref(),
        ),
        Commands::ExtractVersion {
            names,
            prefix,
            extensions,
        } => cmd::extract::extract_version(&names, prefix.as_deref(), extensions.as_deref()),
    }
}
