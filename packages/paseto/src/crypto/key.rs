//! Version-pinned key material

use super::capability::{CryptoCapability, Operation, Version};
use crate::claims::FooterClaims;
use crate::error::{PasetoError, PasetoResult};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// What a key may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Symmetric key for local tokens
    Local,
    /// Private signing key for public tokens
    Secret,
    /// Verification key for public tokens
    Public,
}

impl KeyKind {
    /// Kind of key `operation` consumes
    #[must_use]
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Encrypt | Operation::Decrypt => KeyKind::Local,
            Operation::Sign => KeyKind::Secret,
            Operation::Verify => KeyKind::Public,
        }
    }
}

/// Key bytes bound to one protocol version and one kind.
///
/// The bytes are wiped on drop and compared in constant time.
#[derive(Clone)]
pub struct KeyMaterial {
    version: Version,
    kind: KeyKind,
    bytes: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    /// Wrap raw key bytes
    #[must_use]
    pub fn new(version: Version, kind: KeyKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            kind,
            bytes: Zeroizing::new(bytes.into()),
        }
    }

    /// Symmetric key
    #[must_use]
    pub fn local(version: Version, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(version, KeyKind::Local, bytes)
    }

    /// Signing key
    #[must_use]
    pub fn secret(version: Version, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(version, KeyKind::Secret, bytes)
    }

    /// Verification key
    #[must_use]
    pub fn public(version: Version, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(version, KeyKind::Public, bytes)
    }

    /// Decode hex key bytes
    ///
    /// # Errors
    ///
    /// [`PasetoError::InvalidKey`] for malformed hex.
    pub fn from_hex(version: Version, kind: KeyKind, encoded: &str) -> PasetoResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(encoded.trim()).map_err(|_| PasetoError::invalid_key("malformed hex key"))?,
        );
        Ok(Self::new(version, kind, bytes.as_slice()))
    }

    /// Protocol version the key is pinned to
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Key kind
    #[must_use]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Raw key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check the key can serve `capability`
    ///
    /// # Errors
    ///
    /// [`PasetoError::InvalidKey`] on a version or kind mismatch.
    pub fn check(&self, capability: &CryptoCapability) -> PasetoResult<()> {
        if self.version != capability.version() {
            return Err(PasetoError::InvalidKey(format!(
                "{} key cannot be used for {capability}",
                self.version
            )));
        }
        let expected = KeyKind::for_operation(capability.operation());
        if self.kind != expected {
            return Err(PasetoError::InvalidKey(format!(
                "{capability} requires a {expected:?} key, got {:?}",
                self.kind
            )));
        }
        Ok(())
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.kind == other.kind
            && bool::from(self.bytes.as_slice().ct_eq(other.bytes.as_slice()))
    }
}

impl Eq for KeyMaterial {}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("version", &self.version)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Supplies key material for an operation.
///
/// The footer is handed over so suppliers can pick a key by `kid`.
pub trait KeySupplier {
    /// Key for `capability`
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically [`PasetoError::InvalidKey`].
    fn key_for(
        &self,
        capability: &CryptoCapability,
        footer: &FooterClaims,
    ) -> PasetoResult<KeyMaterial>;
}

impl KeySupplier for KeyMaterial {
    fn key_for(&self, _: &CryptoCapability, _: &FooterClaims) -> PasetoResult<KeyMaterial> {
        Ok(self.clone())
    }
}

impl<F> KeySupplier for F
where
    F: Fn(&CryptoCapability, &FooterClaims) -> PasetoResult<KeyMaterial>,
{
    fn key_for(
        &self,
        capability: &CryptoCapability,
        footer: &FooterClaims,
    ) -> PasetoResult<KeyMaterial> {
        self(capability, footer)
    }
}
