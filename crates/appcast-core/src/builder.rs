//! Manifest building.
//!
//! [`ManifestBuilder`] finds release binaries, works out a version for each,
//! merges them with any manifest already on disk and writes the result. The
//! file format, signing and binary metadata are injected so the same
//! pipeline serves every combination.

use appcast_schema::{Manifest, ManifestItem, OperatingSystem, SemVerLike, sort_descending};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::changelog;
use crate::discovery::find_binaries;
use crate::error::{BuildError, BuildNotice};
use crate::extract::VersionExtractor;
use crate::metadata::{NoVersionMetadata, VersionReader};
use crate::mime::mime_type_for;
use crate::options::BuildOptions;
use crate::serializer::ManifestSerializer;
use crate::signing::{ArtifactSigner, SignatureOutcome, write_signature_file};

/// Everything [`ManifestBuilder::generate`] did.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub manifest: Manifest,
    pub output_path: PathBuf,
    pub signature: SignatureOutcome,
    pub notices: Vec<BuildNotice>,
}

/// Builds a manifest from a directory of binaries.
pub struct ManifestBuilder {
    options: BuildOptions,
    serializer: Box<dyn ManifestSerializer>,
    signer: Box<dyn ArtifactSigner>,
    reader: Box<dyn VersionReader>,
}

impl std::fmt::Debug for ManifestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestBuilder")
            .field("options", &self.options)
            .field("serializer", &self.serializer)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl ManifestBuilder {
    /// A builder with no binary metadata reader.
    pub fn new(
        options: BuildOptions,
        serializer: Box<dyn ManifestSerializer>,
        signer: Box<dyn ArtifactSigner>,
    ) -> Self {
        Self {
            options,
            serializer,
            signer,
            reader: Box::new(NoVersionMetadata),
        }
    }

    /// A builder writing the format named in `options`.
    pub fn from_options(options: BuildOptions, signer: Box<dyn ArtifactSigner>) -> Self {
        let serializer = options.format.serializer();
        Self::new(options, serializer, signer)
    }

    /// Read versions from binary metadata with `reader` when
    /// `file_extract_version` is off.
    pub fn with_version_reader(mut self, reader: impl VersionReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Where the manifest is written: the output directory (or the source
    /// directory) joined with the file name and the serializer's extension.
    pub fn output_path(&self) -> PathBuf {
        let dir = self
            .options
            .output_directory
            .as_deref()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(&self.options.source_binary_directory);
        let name = self.options.output_file_name.trim().trim_matches('.');
        dir.join(format!("{name}.{}", self.serializer.extension()))
    }

    /// Build the manifest without writing it.
    ///
    /// # Errors
    ///
    /// See [`ManifestBuilder::build_with_notices`].
    pub fn build(&self) -> Result<Manifest, BuildError> {
        self.build_with_notices().map(|(manifest, _)| manifest)
    }

    /// Build the manifest, also returning the non-fatal notices.
    ///
    /// # Errors
    ///
    /// Fails when no binaries match, the operating-system tag is not
    /// recognized, the override version would apply to more than one
    /// binary, or a file cannot be read or signed.
    pub fn build_with_notices(&self) -> Result<(Manifest, Vec<BuildNotice>), BuildError> {
        let opts = &self.options;
        let mut notices = Vec::new();

        let source_dir = std::path::absolute(&opts.source_binary_directory)
            .map_err(|e| BuildError::io(&opts.source_binary_directory, e))?;
        let binaries = find_binaries(&source_dir, &opts.extensions, opts.search_subdirectories)
            .map_err(|e| BuildError::io(&source_dir, e))?;
        if binaries.is_empty() {
            return Err(BuildError::NoBinariesFound {
                dir: source_dir,
                extensions: opts.extensions.join(","),
            });
        }

        let os = BuildOptions::non_blank(opts.operating_system.as_ref());
        if let Some(os) = os.filter(|os| OperatingSystem::from_tag(os).is_none()) {
            return Err(BuildError::InvalidOperatingSystem(os.to_string()));
        }

        tracing::info!(
            dir = %source_dir.display(),
            count = binaries.len(),
            os = os.unwrap_or_default(),
            "Found binaries"
        );

        let mut product_name =
            BuildOptions::non_blank(opts.product_name.as_ref()).map(String::from);
        let mut items = Vec::new();
        if opts.reparse_existing {
            let path = self.output_path();
            let existing = self.serializer.read(&path, opts.overwrite_old_items)?;
            tracing::info!(
                path = %path.display(),
                items = existing.items.len(),
                "Loaded existing manifest"
            );
            items = existing.items;
            if existing.product_name.is_some() {
                product_name = existing.product_name;
            }
        }

        let extractor = VersionExtractor::new()
            .with_prefix(source_dir.to_string_lossy())
            .with_extensions(&opts.extensions);
        let override_version = BuildOptions::non_blank(opts.file_version.as_ref());
        let mut used_override = false;

        for binary in &binaries {
            let mut version = if opts.file_extract_version {
                extractor.extract_path(binary)
            } else {
                self.reader.read_version(binary)
            }
            .filter(|v| !v.trim().is_empty());

            if let Some(fallback) = override_version.filter(|_| version.is_none()) {
                if used_override {
                    return Err(BuildError::AmbiguousOverrideVersion {
                        version: fallback.to_string(),
                        path: binary.clone(),
                    });
                }
                used_override = true;
                tracing::info!(
                    path = %binary.display(),
                    version = fallback,
                    "Using override version"
                );
                version = Some(fallback.to_string());
            }

            let Some(version) = version else {
                tracing::warn!(path = %binary.display(), "No version found, skipping");
                notices.push(BuildNotice::VersionResolutionFailed {
                    path: binary.clone(),
                });
                continue;
            };
            let version = SemVerLike::parse(&version);
            tracing::debug!(path = %binary.display(), %version, "Resolved version");

            if let Some(i) = items
                .iter()
                .position(|item: &ManifestItem| item.semver_like() == version)
            {
                let notice = if opts.overwrite_old_items {
                    items.remove(i);
                    BuildNotice::DuplicateReplaced {
                        version: version.to_string(),
                        path: binary.clone(),
                    }
                } else {
                    BuildNotice::DuplicateSkipped {
                        version: version.to_string(),
                        path: binary.clone(),
                    }
                };
                tracing::info!("{notice}");
                let skip = matches!(notice, BuildNotice::DuplicateSkipped { .. });
                notices.push(notice);
                if skip {
                    continue;
                }
            }

            let item =
                self.create_item_inner(binary, &version, product_name.as_deref(), &mut notices)?;
            items.push(item);
        }

        sort_descending(&mut items);

        let critical = &opts.critical_versions;
        let channel = BuildOptions::non_blank(opts.channel.as_ref());
        for item in &mut items {
            if critical.iter().any(|v| v.trim() == item.semver_like().to_string()) {
                item.is_critical = true;
            }
            if let Some(channel) = channel {
                item.channel = Some(channel.to_string());
            }
        }

        Ok((
            Manifest {
                product_name,
                items,
            },
            notices,
        ))
    }

    /// Describe one binary as a manifest item.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary or its changelog cannot be read or
    /// signed.
    pub fn create_item(
        &self,
        binary: &Path,
        version: &SemVerLike,
        product_name: Option<&str>,
    ) -> Result<ManifestItem, BuildError> {
        self.create_item_inner(binary, version, product_name, &mut Vec::new())
    }

    fn create_item_inner(
        &self,
        binary: &Path,
        version: &SemVerLike,
        product_name: Option<&str>,
        notices: &mut Vec<BuildNotice>,
    ) -> Result<ManifestItem, BuildError> {
        let opts = &self.options;
        let version_text = version.to_string();
        let product_name = product_name.map(str::trim).filter(|p| !p.is_empty());

        let title = match product_name {
            Some(product) => format!("{product} {version_text}"),
            None => version_text.clone(),
        };

        let file_name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut link = match BuildOptions::non_blank(opts.base_url.as_ref()) {
            Some(base) if base.ends_with('/') => base.to_string(),
            Some(base) => format!("{base}/"),
            None => String::new(),
        };
        if opts.prefix_version {
            link.push_str(&version_text);
            link.push('/');
        }
        link.push_str(&urlencoding::encode(&file_name));

        let meta = fs::metadata(binary).map_err(|e| BuildError::io(binary, e))?;
        let publication_date = meta
            .created()
            .or_else(|_| meta.modified())
            .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);

        let download_signature = if self.signer.keys_exist() {
            Some(self.signer.sign_file(binary)?)
        } else {
            None
        };

        let mut item = ManifestItem {
            title,
            version: version_text.clone(),
            short_version: version.is_valid().then(|| version.version().to_string()),
            download_link: link,
            operating_system: BuildOptions::non_blank(opts.operating_system.as_ref())
                .map(String::from),
            update_size: meta.len(),
            mime_type: mime_type_for(binary).to_string(),
            download_signature,
            publication_date,
            description: String::new(),
            release_notes_link: None,
            release_notes_signature: None,
            channel: BuildOptions::non_blank(opts.channel.as_ref()).map(String::from),
            is_critical: false,
        };

        let changelog_dir = opts.change_log_path.as_deref().filter(|d| d.is_dir());
        if let Some(dir) = changelog_dir {
            let prefix = BuildOptions::non_blank(opts.change_log_file_name_prefix.as_ref());
            match changelog::find_changelog(dir, &version_text, prefix, product_name) {
                Some(path) => {
                    tracing::debug!(
                        path = %path.display(),
                        version = %version_text,
                        "Found changelog"
                    );
                    match BuildOptions::non_blank(opts.change_log_url.as_ref()) {
                        Some(url) => {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_default();
                            item.release_notes_link =
                                Some(changelog::release_notes_link(url, &name));
                            if self.signer.keys_exist() {
                                item.release_notes_signature = Some(self.signer.sign_file(&path)?);
                            }
                        }
                        None => {
                            let text =
                                fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
                            item.description = text.trim().to_string();
                        }
                    }
                }
                None => {
                    tracing::warn!(version = %version_text, "No changelog found");
                    notices.push(BuildNotice::ChangelogNotFound {
                        version: version_text.clone(),
                    });
                }
            }
        }

        Ok(item)
    }

    /// Write `manifest` to [`ManifestBuilder::output_path`], creating the
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write(&self, manifest: &Manifest) -> Result<PathBuf, BuildError> {
        let path = self.output_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        self.serializer.write(manifest, &path)?;
        tracing::info!(path = %path.display(), items = manifest.items.len(), "Wrote manifest");
        Ok(path)
    }

    /// Sign a written manifest file and store the signature beside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the signature cannot
    /// be written.
    pub fn sign_manifest_file(&self, path: &Path) -> Result<SignatureOutcome, BuildError> {
        Ok(write_signature_file(
            self.signer.as_ref(),
            path,
            &self.options.signature_file_extension,
        )?)
    }

    /// Build, write and sign.
    ///
    /// # Errors
    ///
    /// Returns the first error from building, writing or signing.
    pub fn generate(&self) -> Result<GenerateReport, BuildError> {
        let (manifest, notices) = self.build_with_notices()?;
        let output_path = self.write(&manifest)?;
        let signature = self.sign_manifest_file(&output_path)?;
        Ok(GenerateReport {
            manifest,
            output_path,
            signature,
            notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::{JsonSerializer, TomlSerializer};
    use crate::signing::Ed25519Signer;
    use tempfile::TempDir;

    fn builder(opts: BuildOptions) -> ManifestBuilder {
        ManifestBuilder::new(opts, Box::new(JsonSerializer), Box::new(Ed25519Signer::unsigned()))
    }

    fn opts(dir: &TempDir) -> BuildOptions {
        BuildOptions {
            source_binary_directory: dir.path().to_path_buf(),
            ..BuildOptions::default()
        }
    }

    #[test]
    fn output_path_uses_source_dir_and_extension() {
        let dir = TempDir::new().unwrap();
        let mut o = opts(&dir);
        o.output_file_name = " .feed. ".to_string();
        assert_eq!(builder(o.clone()).output_path(), dir.path().join("feed.json"));

        o.output_directory = Some(dir.path().join("out"));
        let toml = ManifestBuilder::new(
            o,
            Box::new(TomlSerializer),
            Box::new(Ed25519Signer::unsigned()),
        );
        assert_eq!(toml.output_path(), dir.path().join("out").join("feed.toml"));
    }

    #[test]
    fn creates_items_with_links_and_titles() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("My App 1.2.exe");
        fs::write(&binary, b"binary").unwrap();

        let mut o = opts(&dir);
        o.base_url = Some("https://example.com/dl".to_string());
        o.prefix_version = true;
        o.operating_system = Some(" windows ".to_string());
        let item = builder(o)
            .create_item(&binary, &SemVerLike::parse("1.2"), Some("My App"))
            .unwrap();

        assert_eq!(item.title, "My App 1.2");
        assert_eq!(item.version, "1.2");
        assert_eq!(item.short_version.as_deref(), Some("1.2"));
        assert_eq!(item.download_link, "https://example.com/dl/1.2/My%20App%201.2.exe");
        assert_eq!(item.operating_system.as_deref(), Some("windows"));
        assert_eq!(item.update_size, 6);
        assert!(item.download_signature.is_none());
        assert!(item.description.is_empty());
    }

    #[test]
    fn signs_items_when_keys_exist() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("app 1.0.exe");
        fs::write(&binary, b"payload").unwrap();

        let signer = Ed25519Signer::generate();
        let public = signer.public_key().unwrap();
        let b = ManifestBuilder::new(opts(&dir), Box::new(JsonSerializer), Box::new(signer));
        let item = b.create_item(&binary, &SemVerLike::parse("1.0"), None).unwrap();

        assert_eq!(item.title, "1.0");
        let verifier = Ed25519Signer::verify_only(&public).unwrap();
        assert!(
            verifier
                .verify_bytes(b"payload", item.download_signature.as_deref().unwrap())
                .unwrap()
        );
    }

    #[test]
    fn merges_critical_and_channel() {
        let dir = TempDir::new().unwrap();
        for name in ["app 1.0.exe", "app 1.1.exe", "app 2.0.0-beta.1.exe", "readme.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let mut o = opts(&dir);
        o.critical_versions = vec!["1.1".to_string()];
        o.channel = Some("beta".to_string());

        let (manifest, notices) = builder(o).build_with_notices().unwrap();
        assert!(notices.is_empty());
        assert_eq!(manifest.versions(), ["2.0.0-beta.1", "1.1", "1.0"]);
        assert!(manifest.items[1].is_critical);
        assert!(!manifest.items[0].is_critical);
        assert!(manifest.items.iter().all(|i| i.channel.as_deref() == Some("beta")));
    }

    #[test]
    fn unversioned_binaries_are_skipped_with_a_notice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("setup.exe"), b"x").unwrap();
        fs::write(dir.path().join("setup 3.0.exe"), b"x").unwrap();

        let (manifest, notices) = builder(opts(&dir)).build_with_notices().unwrap();
        assert_eq!(manifest.versions(), ["3.0"]);
        assert_eq!(
            notices,
            [BuildNotice::VersionResolutionFailed {
                path: std::path::absolute(dir.path()).unwrap().join("setup.exe")
            }]
        );
    }

    #[test]
    fn metadata_reader_supplies_versions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("setup.exe"), b"x").unwrap();

        let mut o = opts(&dir);
        o.file_extract_version = false;
        let manifest = builder(o)
            .with_version_reader(|_: &Path| Some("4.5.6".to_string()))
            .build()
            .unwrap();
        assert_eq!(manifest.versions(), ["4.5.6"]);
    }

    #[test]
    fn rejects_unknown_operating_system() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app 1.0.exe"), b"x").unwrap();
        let mut o = opts(&dir);
        o.operating_system = Some("beos".to_string());
        assert!(matches!(
            builder(o).build(),
            Err(BuildError::InvalidOperatingSystem(os)) if os == "beos"
        ));
    }

    #[test]
    fn no_binaries_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app 1.0.zip"), b"x").unwrap();
        assert!(matches!(builder(opts(&dir)).build(), Err(BuildError::NoBinariesFound { .. })));
    }

    #[test]
    fn inlines_changelog_without_url() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes");
        fs::create_dir(&notes).unwrap();
        fs::write(notes.join("App 1.0.md"), "\n- Fixed things\n").unwrap();
        fs::write(dir.path().join("app 1.0.exe"), b"x").unwrap();
        fs::write(dir.path().join("app 1.1.exe"), b"x").unwrap();

        let mut o = opts(&dir);
        o.product_name = Some("App".to_string());
        o.change_log_path = Some(notes);
        let (manifest, notices) = builder(o).build_with_notices().unwrap();

        assert_eq!(manifest.items[1].description, "- Fixed things");
        assert!(manifest.items[1].release_notes_link.is_none());
        assert!(manifest.items[0].description.is_empty());
        assert_eq!(
            notices,
            [BuildNotice::ChangelogNotFound {
                version: "1.1".to_string()
            }]
        );
    }
}
