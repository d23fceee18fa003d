//! Crypto provider and engine contracts
//!
//! A [`CryptoProvider`] serves exactly one [`CryptoCapability`] on top of a
//! [`CryptoEngine`]. Providers never frame tokens: they consume and produce
//! the byte strings the token builder/parser has already assembled.

use super::capability::{CryptoCapability, Operation};
use super::key::KeyMaterial;
use crate::error::{PasetoError, PasetoResult};
use std::fmt;
use zeroize::Zeroizing;

/// Identifier of a crypto engine, e.g. `rustcrypto`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(&'static str);

impl EngineId {
    /// Pure-Rust RustCrypto implementations
    pub const RUST_CRYPTO: EngineId = EngineId("rustcrypto");
    /// The `ring` library
    pub const RING: EngineId = EngineId("ring");

    /// Engine identifier from a static name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Engine name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An underlying cryptographic engine.
///
/// `initialize` performs any process-wide setup the engine needs. The
/// registry calls it once per build for every engine it selects; it must be
/// idempotent.
pub trait CryptoEngine: Send + Sync {
    /// Engine identifier
    fn id(&self) -> EngineId;

    /// One-time setup
    ///
    /// # Errors
    ///
    /// [`PasetoError::EngineInitialization`] when the engine is unusable.
    fn initialize(&self) -> PasetoResult<()>;
}

/// Input of one provider call
#[derive(Debug, Clone, Copy)]
pub enum CryptoRequest<'a> {
    /// Sign an assembled message
    Sign {
        /// Pre-authentication encoded message
        message: &'a [u8],
    },
    /// Verify a signature over an assembled message
    Verify {
        /// Pre-authentication encoded message
        message: &'a [u8],
        /// Signature to check
        signature: &'a [u8],
    },
    /// Encrypt and authenticate
    Encrypt {
        /// Nonce
        nonce: &'a [u8],
        /// Authenticated, unencrypted data (header, footer)
        aad: &'a [u8],
        /// Message
        plaintext: &'a [u8],
    },
    /// Authenticate and decrypt
    Decrypt {
        /// Nonce
        nonce: &'a [u8],
        /// Authenticated, unencrypted data (header, footer)
        aad: &'a [u8],
        /// Ciphertext including the authentication tag
        ciphertext: &'a [u8],
    },
}

impl CryptoRequest<'_> {
    /// Operation this request asks for
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            CryptoRequest::Sign { .. } => Operation::Sign,
            CryptoRequest::Verify { .. } => Operation::Verify,
            CryptoRequest::Encrypt { .. } => Operation::Encrypt,
            CryptoRequest::Decrypt { .. } => Operation::Decrypt,
        }
    }
}

/// Output of one provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoOutput {
    /// Signature bytes
    Signature(Vec<u8>),
    /// Signature checked out
    Verified,
    /// Ciphertext with authentication tag
    Ciphertext(Vec<u8>),
    /// Recovered plaintext, wiped on drop
    Plaintext(Zeroizing<Vec<u8>>),
}

impl CryptoOutput {
    /// Output bytes; empty for [`CryptoOutput::Verified`]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CryptoOutput::Signature(bytes) | CryptoOutput::Ciphertext(bytes) => bytes.as_slice(),
            CryptoOutput::Plaintext(bytes) => bytes.as_slice(),
            CryptoOutput::Verified => &[],
        }
    }
}

/// Implementation of one capability.
///
/// Providers hold no key state; key material arrives with every call.
/// Verification and decryption report every failure as
/// [`PasetoError::AuthenticationFailed`], never which check failed.
pub trait CryptoProvider: Send + Sync {
    /// Capability served
    fn capability(&self) -> CryptoCapability;

    /// Engine the provider runs on
    fn engine(&self) -> &dyn CryptoEngine;

    /// Run the operation
    ///
    /// # Errors
    ///
    /// - [`PasetoError::OperationMismatch`] for a request of another operation
    /// - [`PasetoError::InvalidKey`] for key material of the wrong version,
    ///   kind or size
    /// - [`PasetoError::AuthenticationFailed`] when verification or
    ///   decryption fails
    fn execute(&self, key: &KeyMaterial, request: CryptoRequest<'_>) -> PasetoResult<CryptoOutput>;

    /// Reject requests and keys that do not match [`CryptoProvider::capability`]
    ///
    /// # Errors
    ///
    /// See [`CryptoProvider::execute`].
    fn precheck(&self, key: &KeyMaterial, request: &CryptoRequest<'_>) -> PasetoResult<()> {
        let capability = self.capability();
        if request.operation() != capability.operation() {
            return Err(PasetoError::OperationMismatch {
                expected: capability.operation(),
                requested: request.operation(),
            });
        }
        key.check(&capability)
    }
}

impl fmt::Debug for dyn CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("capability", &self.capability().to_string())
            .field("engine", &self.engine().id())
            .finish()
    }
}
