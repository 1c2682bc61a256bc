//! appcast - signed update manifests for release binaries
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Scans a directory of release binaries, works out each one's version
//! (from metadata or from file and folder names), merges the result into an
//! existing manifest and signs everything with Ed25519.
//!
//! # Key Layout
//!
//! ```text
//! ~/.appcast/
//! └── appcast.key   # base64 Ed25519 secret (or set APPCAST_SIGNING_KEY)
//! ```

pub mod cmd;

use appcast_core::ManifestFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "appcast")]
#[command(author, version, about = "Generate signed update manifests for release binaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build (or update) the manifest for a directory of binaries
    Generate(GenerateArgs),

    /// Generate a new Ed25519 signing key
    Keygen {
        /// Where to write the key (default: ~/.appcast/appcast.key)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Replace an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Sign a file with the configured key
    Sign {
        file: PathBuf,
        #[arg(short, long)]
        key_file: Option<PathBuf>,
        /// Signature output (default: FILE.signature)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a file against its signature
    Verify {
        file: PathBuf,
        /// Signature file (default: FILE.signature)
        #[arg(short, long)]
        signature: Option<PathBuf>,
        /// Base64 public key; otherwise derived from the configured key
        #[arg(long)]
        public_key: Option<String>,
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },

    /// Print the version found in file names or paths
    ExtractVersion {
        #[arg(required = true)]
        names: Vec<String>,
        /// Text removed from each name before searching (e.g. the search root)
        #[arg(long)]
        prefix: Option<String>,
        /// Extra extensions to strip, comma separated
        #[arg(short, long = "ext")]
        extensions: Option<String>,
    },
}

/// Options for `appcast generate`. Anything given here overrides the
/// `--config` file.
#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// TOML file with build options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the release binaries
    #[arg(short, long = "binaries")]
    pub source_binary_directory: Option<PathBuf>,

    /// Binary extensions, comma separated (e.g. "exe,msi")
    #[arg(short, long = "ext")]
    pub extensions: Option<String>,

    /// Search subdirectories too
    #[arg(long)]
    pub search_subdirectories: bool,

    /// Output directory (default: the binaries directory)
    #[arg(short, long = "output")]
    pub output_directory: Option<PathBuf>,

    /// Manifest file name without extension
    #[arg(short = 'n', long)]
    pub output_file_name: Option<String>,

    #[arg(short, long)]
    pub format: Option<ManifestFormat>,

    /// Operating system of the binaries (windows, mac, linux)
    #[arg(long = "os")]
    pub operating_system: Option<String>,

    /// URL the binaries are published under
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// Put each download under a {version}/ folder of the base URL
    #[arg(long)]
    pub prefix_version: bool,

    /// Directory of {version}.md changelogs
    #[arg(long)]
    pub change_log_path: Option<PathBuf>,

    /// URL the changelogs are published under; otherwise they are inlined
    #[arg(long)]
    pub change_log_url: Option<String>,

    #[arg(long)]
    pub change_log_name_prefix: Option<String>,

    #[arg(short, long)]
    pub product_name: Option<String>,

    /// Replace existing items that have the same version as a binary
    #[arg(long)]
    pub overwrite_old_items: bool,

    /// Merge with the manifest already in the output directory
    #[arg(long)]
    pub reparse_existing: bool,

    /// Do not read versions from file names
    #[arg(long)]
    pub no_file_extract_version: bool,

    /// Version for a single binary whose version cannot be found
    #[arg(long)]
    pub file_version: Option<String>,

    /// Versions to mark critical, comma separated
    #[arg(long)]
    pub critical_versions: Option<String>,

    #[arg(long)]
    pub channel: Option<String>,

    #[arg(long)]
    pub signature_file_extension: Option<String>,

    /// Signing key file (default: APPCAST_SIGNING_KEY, then ~/.appcast/appcast.key)
    #[arg(short, long)]
    pub key_file: Option<PathBuf>,

    /// Fail unless the manifest signature is written
    #[arg(long)]
    pub require_signature: bool,
}
