//! Baseline engine on the RustCrypto crates
//!
//! - `v2.local`: XChaCha20-Poly1305
//! - `v2.public`, `v4.public`: Ed25519 (`ed25519-dalek`)
//! - `v3.public`: ECDSA P-384 with SHA-384

use super::{ED25519_SIGNATURE_LEN, ed25519_public, ed25519_seed, rfc8032, self_test_failed};
use crate::crypto::capability::{CryptoCapability, Version};
use crate::crypto::key::KeyMaterial;
use crate::crypto::provider::{CryptoEngine, CryptoOutput, CryptoProvider, CryptoRequest, EngineId};
use crate::error::{PasetoError, PasetoResult};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use zeroize::Zeroizing;

/// XChaCha20 nonce length
pub const XCHACHA_NONCE_LEN: usize = 24;
/// XChaCha20-Poly1305 key length
pub const XCHACHA_KEY_LEN: usize = 32;

/// The RustCrypto engine. Needs no global registration; its initialization
/// runs a known-answer test once per process.
pub struct RustCryptoEngine {
    ready: OnceCell<()>,
    runs: AtomicUsize,
}

/// Process-wide RustCrypto engine
pub static RUST_CRYPTO: RustCryptoEngine = RustCryptoEngine {
    ready: OnceCell::new(),
    runs: AtomicUsize::new(0),
};

impl RustCryptoEngine {
    /// How many times the one-time setup actually ran (0 or 1)
    pub fn initializations(&self) -> usize {
        self.runs.load(Ordering::Acquire)
    }

    fn self_test() -> PasetoResult<()> {
        use ed25519_dalek::{Signer, SigningKey};
        let signature = SigningKey::from_bytes(&rfc8032::SECRET).sign(b"");
        if signature.to_bytes() != rfc8032::SIGNATURE {
            return Err(self_test_failed(
                EngineId::RUST_CRYPTO.as_str(),
                "Ed25519 known-answer test failed",
            ));
        }
        Ok(())
    }
}

impl CryptoEngine for RustCryptoEngine {
    fn id(&self) -> EngineId {
        EngineId::RUST_CRYPTO
    }

    fn initialize(&self) -> PasetoResult<()> {
        self.ready
            .get_or_try_init(|| {
                self.runs.fetch_add(1, Ordering::AcqRel);
                Self::self_test()?;
                tracing::info!(engine = %EngineId::RUST_CRYPTO, "crypto engine initialized");
                Ok(())
            })
            .map(|_| ())
    }
}

/// `v2.local` authenticated encryption with XChaCha20-Poly1305
#[derive(Debug, Clone)]
pub struct XChaCha20Poly1305Provider {
    capability: CryptoCapability,
}

impl XChaCha20Poly1305Provider {
    /// `v2.local.encrypt`
    #[must_use]
    pub fn encryptor() -> Self {
        Self {
            capability: CryptoCapability::local_encrypt(Version::V2),
        }
    }

    /// `v2.local.decrypt`
    #[must_use]
    pub fn decryptor() -> Self {
        Self {
            capability: CryptoCapability::local_decrypt(Version::V2),
        }
    }

    fn cipher(key: &KeyMaterial) -> PasetoResult<XChaCha20Poly1305> {
        XChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| {
            PasetoError::InvalidKey(format!(
                "XChaCha20-Poly1305 key must be {XCHACHA_KEY_LEN} bytes"
            ))
        })
    }
}

impl CryptoProvider for XChaCha20Poly1305Provider {
    fn capability(&self) -> CryptoCapability {
        self.capability
    }

    fn engine(&self) -> &dyn CryptoEngine {
        &RUST_CRYPTO
    }

    fn execute(&self, key: &KeyMaterial, request: CryptoRequest<'_>) -> PasetoResult<CryptoOutput> {
        self.precheck(key, &request)?;
        let cipher = Self::cipher(key)?;
        match request {
            CryptoRequest::Encrypt {
                nonce,
                aad,
                plaintext,
            } => {
                if nonce.len() != XCHACHA_NONCE_LEN {
                    return Err(PasetoError::invalid_input("XChaCha20 nonce must be 24 bytes"));
                }
                cipher
                    .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
                    .map(CryptoOutput::Ciphertext)
                    .map_err(|_| PasetoError::invalid_input("plaintext too long"))
            }
            CryptoRequest::Decrypt {
                nonce,
                aad,
                ciphertext,
            } => {
                if nonce.len() != XCHACHA_NONCE_LEN {
                    tracing::debug!(capability = %self.capability, "decryption rejected");
                    return Err(PasetoError::AuthenticationFailed);
                }
                cipher
                    .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
                    .map(|plaintext| CryptoOutput::Plaintext(Zeroizing::new(plaintext)))
                    .map_err(|_| {
                        tracing::debug!(capability = %self.capability, "decryption rejected");
                        PasetoError::AuthenticationFailed
                    })
            }
            // precheck rejects every other operation
            other => Err(PasetoError::OperationMismatch {
                expected: self.capability.operation(),
                requested: other.operation(),
            }),
        }
    }
}

/// Ed25519 signatures for `v2.public` and `v4.public`
#[derive(Debug, Clone)]
pub struct Ed25519Provider {
    capability: CryptoCapability,
}

impl Ed25519Provider {
    /// Signer for `version`
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] unless `version` signs with Ed25519.
    pub fn signer(version: Version) -> PasetoResult<Self> {
        ed25519_version(version).map(|v| Self::for_capability(CryptoCapability::public_sign(v)))
    }

    /// Verifier for `version`
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] unless `version` signs with Ed25519.
    pub fn verifier(version: Version) -> PasetoResult<Self> {
        ed25519_version(version).map(|v| Self::for_capability(CryptoCapability::public_verify(v)))
    }

    pub(crate) fn for_capability(capability: CryptoCapability) -> Self {
        Self { capability }
    }
}

/// Versions whose public purpose is Ed25519
pub(crate) fn ed25519_version(version: Version) -> PasetoResult<Version> {
    match version {
        Version::V2 | Version::V4 => Ok(version),
        other => Err(PasetoError::Configuration(format!(
            "{other}.public does not use Ed25519"
        ))),
    }
}

impl CryptoProvider for Ed25519Provider {
    fn capability(&self) -> CryptoCapability {
        self.capability
    }

    fn engine(&self) -> &dyn CryptoEngine {
        &RUST_CRYPTO
    }

    fn execute(&self, key: &KeyMaterial, request: CryptoRequest<'_>) -> PasetoResult<CryptoOutput> {
        use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

        self.precheck(key, &request)?;
        match request {
            CryptoRequest::Sign { message } => {
                let (seed, public) = ed25519_seed(key)?;
                let signing_key = SigningKey::from_bytes(&seed);
                if let Some(public) = public {
                    if signing_key.verifying_key().to_bytes() != public {
                        return Err(PasetoError::invalid_key(
                            "Ed25519 secret key does not match its public half",
                        ));
                    }
                }
                let signature = signing_key.sign(message);
                Ok(CryptoOutput::Signature(signature.to_bytes().to_vec()))
            }
            CryptoRequest::Verify { message, signature } => {
                let public = ed25519_public(key)?;
                // a point that does not decode fails like a bad signature
                let verified = signature.len() == ED25519_SIGNATURE_LEN
                    && VerifyingKey::from_bytes(&public)
                        .and_then(|verifying_key| {
                            let sig = Signature::from_slice(signature)?;
                            verifying_key.verify_strict(message, &sig)
                        })
                        .is_ok();
                if verified {
                    Ok(CryptoOutput::Verified)
                } else {
                    tracing::debug!(capability = %self.capability, "signature rejected");
                    Err(PasetoError::AuthenticationFailed)
                }
            }
            other => Err(PasetoError::OperationMismatch {
                expected: self.capability.operation(),
                requested: other.operation(),
            }),
        }
    }
}

/// ECDSA P-384 / SHA-384 signatures for `v3.public`.
///
/// Secret keys are the 48-byte scalar, public keys SEC1 points (compressed
/// or not), signatures the 96-byte `r || s` form.
#[derive(Debug, Clone)]
pub struct P384Provider {
    capability: CryptoCapability,
}

impl P384Provider {
    /// `v3.public.sign`
    #[must_use]
    pub fn signer() -> Self {
        Self {
            capability: CryptoCapability::public_sign(Version::V3),
        }
    }

    /// `v3.public.verify`
    #[must_use]
    pub fn verifier() -> Self {
        Self {
            capability: CryptoCapability::public_verify(Version::V3),
        }
    }
}

impl CryptoProvider for P384Provider {
    fn capability(&self) -> CryptoCapability {
        self.capability
    }

    fn engine(&self) -> &dyn CryptoEngine {
        &RUST_CRYPTO
    }

    fn execute(&self, key: &KeyMaterial, request: CryptoRequest<'_>) -> PasetoResult<CryptoOutput> {
        use p384::ecdsa::signature::{Signer, Verifier};
        use p384::ecdsa::{Signature, SigningKey, VerifyingKey};

        self.precheck(key, &request)?;
        match request {
            CryptoRequest::Sign { message } => {
                let signing_key = SigningKey::from_slice(key.as_bytes())
                    .map_err(|_| PasetoError::invalid_key("P-384 secret key must be a 48-byte scalar"))?;
                let signature: Signature = signing_key.sign(message);
                Ok(CryptoOutput::Signature(signature.to_bytes().to_vec()))
            }
            CryptoRequest::Verify { message, signature } => {
                let verifying_key = VerifyingKey::from_sec1_bytes(key.as_bytes())
                    .map_err(|_| PasetoError::invalid_key("malformed P-384 public key"))?;
                let verified = Signature::from_slice(signature)
                    .and_then(|sig| verifying_key.verify(message, &sig))
                    .is_ok();
                if verified {
                    Ok(CryptoOutput::Verified)
                } else {
                    tracing::debug!(capability = %self.capability, "signature rejected");
                    Err(PasetoError::AuthenticationFailed)
                }
            }
            other => Err(PasetoError::OperationMismatch {
                expected: self.capability.operation(),
                requested: other.operation(),
            }),
        }
    }
}

/// Public half of a P-384 secret scalar, SEC1 compressed
///
/// # Errors
///
/// [`PasetoError::InvalidKey`] when `secret` is not a valid scalar.
pub fn p384_public_key(secret: &KeyMaterial) -> PasetoResult<KeyMaterial> {
    let signing_key = p384::ecdsa::SigningKey::from_slice(secret.as_bytes())
        .map_err(|_| PasetoError::invalid_key("P-384 secret key must be a 48-byte scalar"))?;
    let point = signing_key.verifying_key().to_encoded_point(true);
    Ok(KeyMaterial::public(secret.version(), point.as_bytes()))
}

/// Public half of an Ed25519 secret key
///
/// # Errors
///
/// [`PasetoError::InvalidKey`] when `secret` is not 32 or 64 bytes.
pub fn ed25519_public_key(secret: &KeyMaterial) -> PasetoResult<KeyMaterial> {
    let (seed, _) = ed25519_seed(secret)?;
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
    Ok(KeyMaterial::public(
        secret.version(),
        signing_key.verifying_key().to_bytes().to_vec(),
    ))
}

/// Fresh random XChaCha20 nonce
#[must_use]
pub fn random_nonce() -> [u8; XCHACHA_NONCE_LEN] {
    use rand::RngCore;
    let mut nonce = [0u8; XCHACHA_NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}
