//! Shared types for appcast: permissive version ordering and the manifest
//! item model consumed by serializers and update clients.

/// Release items and the manifest that orders them.
pub mod item;
pub mod os;
pub mod version;

// Re-exports
pub use item::{DEFAULT_MIME_TYPE, ItemError, Manifest, ManifestItem, sort_descending};
pub use os::OperatingSystem;
pub use version::{SemVerLike, VersionToken};
