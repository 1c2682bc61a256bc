//! Ed25519 signatures for artifacts and manifest files.
//!
//! Signatures are base64 strings over the raw file bytes. Keys are 32-byte
//! Ed25519 secrets, also base64, taken from `APPCAST_SIGNING_KEY` or a key
//! file. Having no key at all is a valid configuration: artifacts are then
//! published unsigned.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding a base64 Ed25519 secret key.
pub const SIGNING_KEY_ENV: &str = "APPCAST_SIGNING_KEY";

/// Errors that can occur while loading keys or signing.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("No signing key available: {0}")]
    MissingKey(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SigningError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Signs and verifies release files.
pub trait ArtifactSigner: std::fmt::Debug {
    /// Whether a secret key is loaded. Signing is skipped when it is not.
    fn keys_exist(&self) -> bool;

    /// Sign `data`, returning a base64 signature.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::MissingKey`] when no secret key is loaded.
    fn sign_bytes(&self, data: &[u8]) -> Result<String, SigningError>;

    /// Check a base64 `signature` over `data`.
    ///
    /// # Errors
    ///
    /// Returns an error when no public key is loaded or the signature is not
    /// well formed. A well-formed signature that does not match is `Ok(false)`.
    fn verify_bytes(&self, data: &[u8], signature: &str) -> Result<bool, SigningError>;

    /// Base64 public key, if any key is loaded.
    fn public_key(&self) -> Option<String>;

    /// Sign the contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or signing fails.
    fn sign_file(&self, path: &Path) -> Result<String, SigningError> {
        let data = fs::read(path).map_err(|e| SigningError::io(path, e))?;
        self.sign_bytes(&data)
    }

    /// Check a signature over the contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or verification cannot run.
    fn verify_file(&self, path: &Path, signature: &str) -> Result<bool, SigningError> {
        let data = fs::read(path).map_err(|e| SigningError::io(path, e))?;
        self.verify_bytes(&data, signature)
    }
}

/// [`ArtifactSigner`] backed by `ed25519-dalek`.
#[derive(Debug, Clone, Default)]
pub struct Ed25519Signer {
    signing: Option<SigningKey>,
    verifying: Option<VerifyingKey>,
}

fn decode_key_bytes(b64: &str, what: &str) -> Result<[u8; 32], SigningError> {
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| SigningError::InvalidKey(format!("{what} is not valid base64: {e}")))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| {
            SigningError::InvalidKey(format!("{what} must be 32 bytes, got {}", bytes.len()))
        })
}

impl Ed25519Signer {
    /// A signer with no keys. Every artifact is left unsigned.
    pub fn unsigned() -> Self {
        Self::default()
    }

    /// A signer holding `key`.
    pub fn from_signing_key(key: SigningKey) -> Self {
        Self {
            verifying: Some(key.verifying_key()),
            signing: Some(key),
        }
    }

    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::from_signing_key(SigningKey::from_bytes(&secret))
    }

    /// Load a base64 32-byte secret key.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidKey`] if the text is not base64 or
    /// does not decode to 32 bytes.
    pub fn from_base64_secret(secret: &str) -> Result<Self, SigningError> {
        let bytes = decode_key_bytes(secret, "secret key")?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&bytes)))
    }

    /// Load the secret key from [`SIGNING_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::MissingKey`] if the variable is unset or
    /// blank, or [`SigningError::InvalidKey`] if it is malformed.
    pub fn from_env() -> Result<Self, SigningError> {
        match std::env::var(SIGNING_KEY_ENV) {
            Ok(secret) if !secret.trim().is_empty() => Self::from_base64_secret(&secret),
            _ => Err(SigningError::MissingKey(format!("{SIGNING_KEY_ENV} not set"))),
        }
    }

    /// Load the secret key from a file holding its base64 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the key is malformed.
    pub fn from_key_file(path: &Path) -> Result<Self, SigningError> {
        let secret = fs::read_to_string(path).map_err(|e| SigningError::io(path, e))?;
        Self::from_base64_secret(&secret)
    }

    /// A verify-only signer from a base64 public key.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidKey`] if the key is malformed.
    pub fn verify_only(public_key: &str) -> Result<Self, SigningError> {
        let bytes = decode_key_bytes(public_key, "public key")?;
        let verifying = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| SigningError::InvalidKey(format!("public key: {e}")))?;
        Ok(Self {
            signing: None,
            verifying: Some(verifying),
        })
    }

    /// Find keys the usual way: the environment, then `key_file`, then the
    /// default key file if it exists. Falls back to [`Ed25519Signer::unsigned`].
    ///
    /// # Errors
    ///
    /// Returns an error when a key source exists but holds a malformed key.
    pub fn discover(key_file: Option<&Path>) -> Result<Self, SigningError> {
        match Self::from_env() {
            Ok(signer) => return Ok(signer),
            Err(SigningError::MissingKey(_)) => {}
            Err(e) => return Err(e),
        }

        if let Some(path) = key_file {
            return Self::from_key_file(path);
        }

        match crate::paths::default_key_path() {
            Some(path) if path.is_file() => Self::from_key_file(&path),
            _ => {
                tracing::debug!("No signing key found; artifacts will be unsigned");
                Ok(Self::unsigned())
            }
        }
    }

    /// Base64 secret key, if one is loaded.
    pub fn secret_base64(&self) -> Option<String> {
        self.signing.as_ref().map(|k| STANDARD.encode(k.to_bytes()))
    }

    /// Write the base64 secret key to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if no secret key is loaded or the file cannot be
    /// written.
    pub fn write_key_file(&self, path: &Path) -> Result<(), SigningError> {
        let secret = self
            .secret_base64()
            .ok_or_else(|| SigningError::MissingKey("verify-only signer".to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SigningError::io(parent, e))?;
        }
        fs::write(path, secret).map_err(|e| SigningError::io(path, e))
    }
}

impl ArtifactSigner for Ed25519Signer {
    fn keys_exist(&self) -> bool {
        self.signing.is_some()
    }

    fn sign_bytes(&self, data: &[u8]) -> Result<String, SigningError> {
        let key = self
            .signing
            .as_ref()
            .ok_or_else(|| SigningError::MissingKey("no secret key loaded".to_string()))?;
        Ok(STANDARD.encode(key.sign(data).to_bytes()))
    }

    fn verify_bytes(&self, data: &[u8], signature: &str) -> Result<bool, SigningError> {
        let key = self
            .verifying
            .as_ref()
            .ok_or_else(|| SigningError::MissingKey("no public key loaded".to_string()))?;
        let bytes = STANDARD
            .decode(signature.trim())
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
        let bytes: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            SigningError::InvalidSignature(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Ok(key.verify(data, &Signature::from_bytes(&bytes)).is_ok())
    }

    fn public_key(&self) -> Option<String> {
        self.verifying.as_ref().map(|k| STANDARD.encode(k.to_bytes()))
    }
}

/// Result of signing a manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutcome {
    /// The signature was verified and written to this path.
    Written(PathBuf),
    /// No secret key is loaded; nothing was written.
    SkippedNoKeys,
    /// The fresh signature did not verify against the file; nothing was
    /// written.
    VerificationFailed,
}

/// `{path}.{extension}`, e.g. `appcast.json.signature`.
pub fn signature_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension.trim_start_matches('.'));
    PathBuf::from(name)
}

/// Sign `path` and write the signature next to it.
///
/// The signature is checked against the file before anything is written,
/// so a stale or mismatched side file is never produced.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the signature file cannot
/// be written.
pub fn write_signature_file(
    signer: &dyn ArtifactSigner,
    path: &Path,
    extension: &str,
) -> Result<SignatureOutcome, SigningError> {
    if !signer.keys_exist() {
        tracing::debug!(path = %path.display(), "Skipping manifest signature, no keys");
        return Ok(SignatureOutcome::SkippedNoKeys);
    }

    let data = fs::read(path).map_err(|e| SigningError::io(path, e))?;
    let signature = signer.sign_bytes(&data)?;
    if !signer.verify_bytes(&data, &signature)? {
        tracing::warn!(path = %path.display(), "Manifest signature failed verification");
        return Ok(SignatureOutcome::VerificationFailed);
    }

    let out = signature_path(path, extension);
    fs::write(&out, &signature).map_err(|e| SigningError::io(&out, e))?;
    tracing::info!(path = %out.display(), "Wrote manifest signature");
    Ok(SignatureOutcome::Written(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sign_and_verify_round_trip() {
        let signer = Ed25519Signer::generate();
        assert!(signer.keys_exist());
        let sig = signer.sign_bytes(b"release").unwrap();
        assert!(signer.verify_bytes(b"release", &sig).unwrap());
        assert!(!signer.verify_bytes(b"tampered", &sig).unwrap());

        let verifier = Ed25519Signer::verify_only(&signer.public_key().unwrap()).unwrap();
        assert!(!verifier.keys_exist());
        assert!(verifier.verify_bytes(b"release", &sig).unwrap());
    }

    #[test]
    fn secret_round_trips_through_base64() {
        let signer = Ed25519Signer::generate();
        let reloaded = Ed25519Signer::from_base64_secret(&signer.secret_base64().unwrap()).unwrap();
        assert_eq!(signer.public_key(), reloaded.public_key());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            Ed25519Signer::from_base64_secret("not base64!"),
            Err(SigningError::InvalidKey(_))
        ));
        assert!(matches!(
            Ed25519Signer::from_base64_secret(&STANDARD.encode([1u8; 16])),
            Err(SigningError::InvalidKey(_))
        ));
    }

    #[test]
    fn unsigned_signer_refuses_to_sign() {
        let signer = Ed25519Signer::unsigned();
        assert!(!signer.keys_exist());
        assert!(signer.public_key().is_none());
        assert!(matches!(
            signer.sign_bytes(b"x"),
            Err(SigningError::MissingKey(_))
        ));
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let signer = Ed25519Signer::generate();
        assert!(signer.verify_bytes(b"x", "AAAA").is_err());
    }

    #[test]
    fn key_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("appcast.key");
        let signer = Ed25519Signer::generate();
        signer.write_key_file(&path).unwrap();
        let loaded = Ed25519Signer::from_key_file(&path).unwrap();
        assert_eq!(signer.public_key(), loaded.public_key());
    }

    #[test]
    fn writes_verified_signature_file() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("appcast.json");
        fs::write(&manifest, "[]").unwrap();

        let signer = Ed25519Signer::generate();
        let outcome = write_signature_file(&signer, &manifest, "signature").unwrap();
        let expected = dir.path().join("appcast.json.signature");
        assert_eq!(outcome, SignatureOutcome::Written(expected.clone()));

        let sig = fs::read_to_string(&expected).unwrap();
        assert!(signer.verify_file(&manifest, &sig).unwrap());
    }

    #[test]
    fn skips_signature_without_keys() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("appcast.json");
        fs::write(&manifest, "[]").unwrap();

        let outcome =
            write_signature_file(&Ed25519Signer::unsigned(), &manifest, ".signature").unwrap();
        assert_eq!(outcome, SignatureOutcome::SkippedNoKeys);
        assert!(!dir.path().join("appcast.json.signature").exists());
    }

    #[derive(Debug)]
    struct BrokenSigner(Ed25519Signer);

    impl ArtifactSigner for BrokenSigner {
        fn keys_exist(&self) -> bool {
            true
        }
        fn sign_bytes(&self, data: &[u8]) -> Result<String, SigningError> {
            self.0.sign_bytes(data)
        }
        fn verify_bytes(&self, _: &[u8], _: &str) -> Result<bool, SigningError> {
            Ok(false)
        }
        fn public_key(&self) -> Option<String> {
            self.0.public_key()
        }
    }

    #[test]
    fn failed_self_verification_writes_nothing() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("appcast.json");
        fs::write(&manifest, "[]").unwrap();

        let signer = BrokenSigner(Ed25519Signer::generate());
        let outcome = write_signature_file(&signer, &manifest, "signature").unwrap();
        assert_eq!(outcome, SignatureOutcome::VerificationFailed);
        assert!(!dir.path().join("appcast.json.signature").exists());
    }

    #[test]
    fn signature_path_appends_extension() {
        assert_eq!(
            signature_path(Path::new("out/appcast.toml"), ".sig"),
            PathBuf::from("out/appcast.toml.sig")
        );
    }
}
