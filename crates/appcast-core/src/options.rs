//! Build configuration.
//!
//! Options can be written in a TOML file (`appcast.toml`) and are then
//! overridden field by field from the command line.
//!
//! ```toml
//! source_binary_directory = "dist"
//! extensions = ["exe", "msi"]
//! base_url = "https://example.com/downloads"
//! product_name = "My App"
//! critical_versions = ["1.2.0"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::serializer::{JsonSerializer, ManifestSerializer, TomlSerializer};

/// Errors that can occur loading options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Manifest file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Toml,
}

impl ManifestFormat {
    /// The serializer writing this format.
    pub fn serializer(self) -> Box<dyn ManifestSerializer> {
        match self {
            Self::Json => Box::new(JsonSerializer),
            Self::Toml => Box::new(TomlSerializer),
        }
    }
}

impl std::str::FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(format!("Unknown manifest format: {other} (expected json or toml)")),
        }
    }
}

/// Everything a manifest build needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Directory searched for release binaries
    pub source_binary_directory: PathBuf,
    /// Binary extensions, without dots (`exe`, `tar.gz`)
    pub extensions: Vec<String>,
    /// Also search subdirectories
    pub search_subdirectories: bool,
    /// Where the manifest is written; defaults to the source directory
    pub output_directory: Option<PathBuf>,
    /// Manifest file name without extension
    pub output_file_name: String,
    pub format: ManifestFormat,
    /// Operating-system tag copied onto new items
    pub operating_system: Option<String>,
    /// Base URL that download links are relative to
    pub base_url: Option<String>,
    /// Insert `{version}/` between the base URL and the file name
    pub prefix_version: bool,
    /// Directory holding `{version}.md` changelogs
    pub change_log_path: Option<PathBuf>,
    /// Base URL of published changelogs. Unset means changelogs are inlined.
    pub change_log_url: Option<String>,
    pub change_log_file_name_prefix: Option<String>,
    pub product_name: Option<String>,
    /// Replace existing items whose version matches a binary on disk
    pub overwrite_old_items: bool,
    /// Merge with the manifest already at the output path
    pub reparse_existing: bool,
    /// Read versions from file names instead of binary metadata
    pub file_extract_version: bool,
    /// Version used for a single binary whose version cannot be found
    pub file_version: Option<String>,
    pub critical_versions: Vec<String>,
    pub channel: Option<String>,
    /// Extension of the manifest signature side file
    pub signature_file_extension: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_binary_directory: PathBuf::from("."),
            extensions: vec!["exe".to_string()],
            search_subdirectories: false,
            output_directory: None,
            output_file_name: "appcast".to_string(),
            format: ManifestFormat::Json,
            operating_system: None,
            base_url: None,
            prefix_version: false,
            change_log_path: None,
            change_log_url: None,
            change_log_file_name_prefix: None,
            product_name: None,
            overwrite_old_items: false,
            reparse_existing: false,
            file_extract_version: true,
            file_version: None,
            critical_versions: Vec::new(),
            channel: None,
            signature_file_extension: "signature".to_string(),
        }
    }
}

impl BuildOptions {
    /// Parse options from TOML text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| OptionsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Blank strings count as unset.
    pub(crate) fn non_blank(value: Option<&String>) -> Option<&str> {
        value.map(|s| s.trim()).filter(|s| !s.is_empty())
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks and
/// repeats.
pub fn comma_list(list: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !out.iter().any(|e| e == entry) {
            out.push(entry.to_string());
        }
    }
    out
}
