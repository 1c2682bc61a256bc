use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::os::OperatingSystem;
use crate::version::SemVerLike;

/// MIME type used when nothing more specific is known about an artifact.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

/// One release entry in an appcast.
///
/// Items are produced by the manifest builder from a binary on disk, or read
/// back from an existing manifest file. The serialized field names are
/// shared by every manifest format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ManifestItem {
    /// Display title (e.g. "My App 1.4")
    pub title: String,

    /// Full version string as found (e.g. "2.0.1-beta-1")
    pub version: String,

    /// Numeric core of the version (e.g. "2.0.1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_version: Option<String>,

    /// URL-escaped download location of the artifact
    #[serde(rename = "url")]
    pub download_link: String,

    /// Free-text operating-system tag (e.g. "windows", "macos")
    #[serde(rename = "os", default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,

    /// Artifact size in bytes
    #[serde(rename = "size", default)]
    pub update_size: u64,

    /// MIME type of the artifact
    #[serde(rename = "type", default = "default_mime_type")]
    pub mime_type: String,

    /// Base64 Ed25519 signature of the artifact bytes
    #[serde(rename = "signature", default, skip_serializing_if = "Option::is_none")]
    pub download_signature: Option<String>,

    /// When the artifact was published
    #[serde(default)]
    pub publication_date: DateTime<Utc>,

    /// Inline changelog text; empty when release notes are linked instead
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// External changelog location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_link: Option<String>,

    /// Base64 signature of the external changelog file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes_signature: Option<String>,

    /// Release channel (e.g. "preview")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Whether clients must treat this update as mandatory
    #[serde(default)]
    pub is_critical: bool,
}

/// Errors that can occur when validating a [`ManifestItem`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ItemError {
    /// A required field is empty.
    #[error("Empty field: {0}")]
    EmptyField(&'static str),

    /// Both an inline description and a release-notes link are present.
    #[error("Item {0} has both an inline description and a release notes link")]
    ConflictingReleaseNotes(String),
}

impl ManifestItem {
    /// The parsed ordering key for this item's version.
    pub fn semver_like(&self) -> SemVerLike {
        SemVerLike::parse(&self.version)
    }

    /// Operating system recognized from the item's tag, if any.
    pub fn os(&self) -> Option<OperatingSystem> {
        self.operating_system
            .as_deref()
            .and_then(OperatingSystem::from_tag)
    }

    /// Whether the item targets Windows.
    pub fn is_windows_update(&self) -> bool {
        self.os() == Some(OperatingSystem::Windows)
    }

    /// Whether the item targets macOS.
    pub fn is_mac_update(&self) -> bool {
        self.os() == Some(OperatingSystem::Mac)
    }

    /// Whether the item targets Linux.
    pub fn is_linux_update(&self) -> bool {
        self.os() == Some(OperatingSystem::Linux)
    }

    /// Check required fields and the release-notes invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::EmptyField`] if `version` or `download_link` is
    /// empty, or [`ItemError::ConflictingReleaseNotes`] if both an inline
    /// description and a release-notes link are set.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.version.trim().is_empty() {
            return Err(ItemError::EmptyField("version"));
        }
        if self.download_link.trim().is_empty() {
            return Err(ItemError::EmptyField("url"));
        }
        if !self.description.is_empty() && self.release_notes_link.is_some() {
            return Err(ItemError::ConflictingReleaseNotes(self.version.clone()));
        }
        Ok(())
    }
}

/// Sort items newest first. Stable, so equal-precedence items keep their
/// relative order.
pub fn sort_descending(items: &mut [ManifestItem]) {
    items.sort_by_cached_key(|item| std::cmp::Reverse(item.semver_like()));
}

/// An ordered list of release items plus the product they belong to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    /// Product (application) name, used as the manifest title
    pub product_name: Option<String>,
    /// Items ordered newest first
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    /// Create a manifest, sorting `items` newest first.
    pub fn new(product_name: Option<String>, mut items: Vec<ManifestItem>) -> Self {
        sort_descending(&mut items);
        Self {
            product_name,
            items,
        }
    }

    /// Re-sort items newest first.
    pub fn sort_descending(&mut self) {
        sort_descending(&mut self.items);
    }

    /// Index of the item whose version equals `version`.
    pub fn position(&self, version: &SemVerLike) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.semver_like() == *version)
    }

    /// Find the item whose version equals `version`.
    pub fn find(&self, version: &SemVerLike) -> Option<&ManifestItem> {
        self.position(version).map(|i| &self.items[i])
    }

    /// The newest item, assuming the manifest is sorted.
    pub fn latest(&self) -> Option<&ManifestItem> {
        self.items.first()
    }

    /// Version strings in item order.
    pub fn versions(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.version.as_str()).collect()
    }
}
