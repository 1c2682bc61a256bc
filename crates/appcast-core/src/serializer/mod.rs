//! Manifest file formats.
//!
//! Every format stores the same document: an optional title (the product
//! name) and the list of release items. Reading always collapses duplicate
//! versions and returns items newest first.

mod json;
mod toml;

pub use self::json::JsonSerializer;
pub use self::toml::TomlSerializer;

use appcast_schema::{Manifest, ManifestItem};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur reading or writing a manifest file.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDecode(#[from] ::toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlEncode(#[from] ::toml::ser::Error),
}

/// On-disk shape shared by all formats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<ManifestItem>,
}

/// A manifest file format.
pub trait ManifestSerializer: std::fmt::Debug {
    /// File extension without the dot (`"json"`).
    fn extension(&self) -> &'static str;

    /// Render a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    fn encode(&self, doc: &ManifestDocument) -> Result<String, ManifestError>;

    /// Parse a document.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid document.
    fn decode(&self, text: &str) -> Result<ManifestDocument, ManifestError>;

    /// Write `manifest` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn write(&self, manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
        let doc = ManifestDocument {
            title: manifest
                .product_name
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            items: manifest.items.clone(),
        };
        let text = self.encode(&doc)?;
        fs::write(path, text).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the manifest at `path`.
    ///
    /// A missing or blank file is an empty manifest. Items with equal
    /// versions are collapsed: the later one wins when
    /// `overwrite_duplicates` is set, otherwise the first is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn read(&self, path: &Path, overwrite_duplicates: bool) -> Result<Manifest, ManifestError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Manifest::default()),
            Err(source) => {
                return Err(ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(Manifest::default());
        }

        let doc = self.decode(&text)?;
        let title = doc.title.filter(|t| !t.trim().is_empty());
        Ok(Manifest::new(title, collapse_duplicates(doc.items, overwrite_duplicates)))
    }
}

/// Keep one item per version, preserving first-seen order.
pub fn collapse_duplicates(items: Vec<ManifestItem>, overwrite: bool) -> Vec<ManifestItem> {
    let mut out: Vec<ManifestItem> = Vec::with_capacity(items.len());
    for item in items {
        let version = item.semver_like();
        match out.iter().position(|seen| seen.semver_like() == version) {
            Some(i) if overwrite => {
                tracing::debug!(version = %version, "Replacing duplicate manifest item");
                out[i] = item;
            }
            Some(_) => tracing::debug!(version = %version, "Dropping duplicate manifest item"),
            None => out.push(item),
        }
    }
    out
}
