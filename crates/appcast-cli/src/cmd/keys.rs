//! Key management and one-off signing

use anyhow::{Context, Result, bail};
use appcast_core::paths::default_key_path;
use appcast_core::signing::{SIGNING_KEY_ENV, signature_path};
use appcast_core::{ArtifactSigner, Ed25519Signer};
use std::fs;
use std::path::Path;

pub fn keygen(output: Option<&Path>, force: bool) -> Result<()> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_key_path()
            .context("Could not determine home directory. Set APPCAST_HOME.")?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }

    println!("  generating ed25519 keypair");
    let signer = Ed25519Signer::generate();
    signer
        .write_key_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!();
    println!("  public (embed in app):");
    println!("  {}", signer.public_key().unwrap_or_default());
    println!();
    println!("  wrote {}", path.display());
    println!("  export {SIGNING_KEY_ENV} from this file to sign in CI");
    Ok(())
}

pub fn sign(file: &Path, key_file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let signer = Ed25519Signer::discover(key_file).context("Failed to load signing key")?;
    if !signer.keys_exist() {
        bail!("No signing key found (set {SIGNING_KEY_ENV} or run `appcast keygen`)");
    }

    let signature = signer.sign_file(file)?;
    let out = output.map_or_else(|| signature_path(file, "signature"), Path::to_path_buf);
    fs::write(&out, signature).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("  signed {} -> {}", file.display(), out.display());
    Ok(())
}

pub fn verify(
    file: &Path,
    signature: Option<&Path>,
    public_key: Option<&str>,
    key_file: Option<&Path>,
) -> Result<()> {
    let verifier = match public_key {
        Some(key) => Ed25519Signer::verify_only(key)?,
        None => Ed25519Signer::discover(key_file).context("Failed to load signing key")?,
    };
    if verifier.public_key().is_none() {
        bail!("No key to verify with (pass --public-key or configure a signing key)");
    }

    let sig_path = signature.map_or_else(|| signature_path(file, "signature"), Path::to_path_buf);
    let sig = fs::read_to_string(&sig_path)
        .with_context(|| format!("Failed to read signature {}", sig_path.display()))?;

    if verifier.verify_file(file, &sig)? {
        println!("  valid signature for {}", file.display());
        Ok(())
    } else {
        bail!("Signature verification FAILED for {}", file.display())
    }
}
