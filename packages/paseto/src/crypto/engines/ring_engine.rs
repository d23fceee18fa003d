//! Alternate engine on `ring`, serving Ed25519 for `v2.public` and `v4.public`
//!
//! Before any provider of this engine is published, the registry calls
//! [`RingEngine::initialize`], which runs the RFC 8032 known-answer test
//! exactly once per process and records the engine as registered.

use super::rustcrypto::ed25519_version;
use super::{ED25519_SIGNATURE_LEN, ed25519_public, ed25519_seed, rfc8032, self_test_failed};
use crate::crypto::capability::{CryptoCapability, Version};
use crate::crypto::key::KeyMaterial;
use crate::crypto::provider::{CryptoEngine, CryptoOutput, CryptoProvider, CryptoRequest, EngineId};
use crate::error::{PasetoError, PasetoResult};
use once_cell::sync::OnceCell;
use ring::signature::{ED25519, Ed25519KeyPair, KeyPair, UnparsedPublicKey};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The `ring` engine
pub struct RingEngine {
    ready: OnceCell<()>,
    runs: AtomicUsize,
}

/// Process-wide `ring` engine
pub static RING: RingEngine = RingEngine {
    ready: OnceCell::new(),
    runs: AtomicUsize::new(0),
};

impl RingEngine {
    /// How many times the one-time setup actually ran (0 or 1)
    pub fn initializations(&self) -> usize {
        self.runs.load(Ordering::Acquire)
    }

    /// True once [`CryptoEngine::initialize`] succeeded in this process
    pub fn is_initialized(&self) -> bool {
        self.ready.get().is_some()
    }

    fn self_test() -> PasetoResult<()> {
        let engine = EngineId::RING.as_str();
        let key_pair = Ed25519KeyPair::from_seed_and_public_key(&rfc8032::SECRET, &rfc8032::PUBLIC)
            .map_err(|_| self_test_failed(engine, "RFC 8032 key pair rejected"))?;
        if key_pair.sign(b"").as_ref() != rfc8032::SIGNATURE.as_slice() {
            return Err(self_test_failed(engine, "Ed25519 known-answer signature mismatch"));
        }
        UnparsedPublicKey::new(&ED25519, key_pair.public_key().as_ref())
            .verify(b"", &rfc8032::SIGNATURE)
            .map_err(|_| self_test_failed(engine, "Ed25519 known-answer verification failed"))
    }
}

impl CryptoEngine for RingEngine {
    fn id(&self) -> EngineId {
        EngineId::RING
    }

    fn initialize(&self) -> PasetoResult<()> {
        self.ready
            .get_or_try_init(|| {
                self.runs.fetch_add(1, Ordering::AcqRel);
                Self::self_test()?;
                tracing::info!(engine = %EngineId::RING, "crypto engine initialized");
                Ok(())
            })
            .map(|_| ())
    }
}

/// Ed25519 on `ring`, interchangeable with
/// [`Ed25519Provider`](super::Ed25519Provider)
#[derive(Debug, Clone)]
pub struct RingEd25519Provider {
    capability: CryptoCapability,
}

impl RingEd25519Provider {
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

impl CryptoProvider for RingEd25519Provider {
    fn capability(&self) -> CryptoCapability {
        self.capability
    }

    fn engine(&self) -> &dyn CryptoEngine {
        &RING
    }

    fn execute(&self, key: &KeyMaterial, request: CryptoRequest<'_>) -> PasetoResult<CryptoOutput> {
        self.precheck(key, &request)?;
        match request {
            CryptoRequest::Sign { message } => {
                let (seed, public) = ed25519_seed(key)?;
                let key_pair = match public {
                    Some(public) => Ed25519KeyPair::from_seed_and_public_key(seed.as_slice(), &public),
                    None => Ed25519KeyPair::from_seed_unchecked(seed.as_slice()),
                }
                .map_err(|_| {
                    PasetoError::invalid_key("Ed25519 secret key does not match its public half")
                })?;
                Ok(CryptoOutput::Signature(key_pair.sign(message).as_ref().to_vec()))
            }
            CryptoRequest::Verify { message, signature } => {
                let public = ed25519_public(key)?;
                let verified = signature.len() == ED25519_SIGNATURE_LEN
                    && UnparsedPublicKey::new(&ED25519, public)
                        .verify(message, signature)
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
