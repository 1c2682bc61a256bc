//! Manifest generation for software-update feeds.
//!
//! [`builder::ManifestBuilder`] turns a directory of release binaries into a
//! signed, version-ordered manifest. Versions come from file metadata or are
//! read out of file and folder names by [`extract::VersionExtractor`].

pub mod builder;
pub mod changelog;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod mime;
pub mod options;
pub mod paths;
pub mod serializer;
pub mod signing;

pub use builder::{GenerateReport, ManifestBuilder};
pub use error::{BuildError, BuildNotice};
pub use extract::{VersionExtractor, version_from_name};
pub use metadata::{NoVersionMetadata, VersionReader};
pub use options::{BuildOptions, ManifestFormat, OptionsError};
pub use paths::*;
pub use serializer::{JsonSerializer, ManifestError, ManifestSerializer, TomlSerializer};
pub use signing::{ArtifactSigner, Ed25519Signer, SignatureOutcome, SigningError};
