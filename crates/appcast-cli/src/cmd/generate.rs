//! Generate command

use anyhow::{Context, Result, bail};
use appcast_core::discovery::extensions_from_str;
use appcast_core::options::comma_list;
use appcast_core::{
    ArtifactSigner, BuildOptions, Ed25519Signer, ManifestBuilder, SignatureOutcome,
};

use crate::GenerateArgs;

/// Merge the config file (if any) with command-line overrides.
pub fn build_options(args: &GenerateArgs) -> Result<BuildOptions> {
    let mut opts = match &args.config {
        Some(path) => BuildOptions::load(path)?,
        None => BuildOptions::default(),
    };

    if let Some(dir) = &args.source_binary_directory {
        opts.source_binary_directory.clone_from(dir);
    }
    if let Some(exts) = &args.extensions {
        opts.extensions = extensions_from_str(exts);
    }
    if let Some(dir) = &args.output_directory {
        opts.output_directory = Some(dir.clone());
    }
    if let Some(name) = &args.output_file_name {
        opts.output_file_name.clone_from(name);
    }
    if let Some(format) = args.format {
        opts.format = format;
    }
    if let Some(versions) = &args.critical_versions {
        opts.critical_versions = comma_list(versions);
    }
    if let Some(ext) = &args.signature_file_extension {
        opts.signature_file_extension.clone_from(ext);
    }

    let overrides = [
        (&mut opts.operating_system, &args.operating_system),
        (&mut opts.base_url, &args.base_url),
        (&mut opts.change_log_url, &args.change_log_url),
        (&mut opts.change_log_file_name_prefix, &args.change_log_name_prefix),
        (&mut opts.product_name, &args.product_name),
        (&mut opts.file_version, &args.file_version),
        (&mut opts.channel, &args.channel),
    ];
    for (field, value) in overrides {
        if value.is_some() {
            field.clone_from(value);
        }
    }
    if let Some(path) = &args.change_log_path {
        opts.change_log_path = Some(path.clone());
    }

    opts.search_subdirectories |= args.search_subdirectories;
    opts.prefix_version |= args.prefix_version;
    opts.overwrite_old_items |= args.overwrite_old_items;
    opts.reparse_existing |= args.reparse_existing;
    if args.no_file_extract_version {
        opts.file_extract_version = false;
    }

    Ok(opts)
}

pub fn generate(args: &GenerateArgs) -> Result<()> {
    let opts = build_options(args)?;
    let signer =
        Ed25519Signer::discover(args.key_file.as_deref()).context("Failed to load signing key")?;
    if args.require_signature && !signer.keys_exist() {
        bail!("--require-signature is set but no signing key was found (run `appcast keygen`)");
    }
    if !signer.keys_exist() {
        tracing::warn!("No signing key found; items and manifest will be unsigned");
    }

    let builder = ManifestBuilder::from_options(opts, Box::new(signer));
    let report = builder.generate().context("Failed to generate manifest")?;

    println!(
        "  wrote {} ({} items)",
        report.output_path.display(),
        report.manifest.items.len()
    );
    for notice in &report.notices {
        println!("  note: {notice}");
    }

    match report.signature {
        SignatureOutcome::Written(path) => println!("  signed -> {}", path.display()),
        SignatureOutcome::SkippedNoKeys => println!("  manifest not signed (no key)"),
        SignatureOutcome::VerificationFailed if args.require_signature => {
            bail!("Manifest signature failed verification; signature file not written")
        }
        SignatureOutcome::VerificationFailed => {
            tracing::warn!("Manifest signature failed verification; signature file not written");
        }
    }

    Ok(())
}
