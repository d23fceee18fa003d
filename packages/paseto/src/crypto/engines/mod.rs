//! Built-in crypto engines and the providers they back

pub mod ring_engine;
pub mod rustcrypto;

pub use ring_engine::{RING, RingEd25519Provider, RingEngine};
pub use rustcrypto::{
    Ed25519Provider, P384Provider, RUST_CRYPTO, RustCryptoEngine, XChaCha20Poly1305Provider,
};

use crate::crypto::key::KeyMaterial;
use crate::error::{PasetoError, PasetoResult};
use zeroize::Zeroizing;

/// Ed25519 seed length
pub(crate) const ED25519_SEED_LEN: usize = 32;
/// Ed25519 public key length
pub(crate) const ED25519_PUBLIC_LEN: usize = 32;
/// Ed25519 signature length
pub(crate) const ED25519_SIGNATURE_LEN: usize = 64;

/// RFC 8032 section 7.1, TEST 1 (empty message)
pub(crate) mod rfc8032 {
    pub const SECRET: [u8; 32] = [
        0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
        0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
        0x7f, 0x60,
    ];
    pub const PUBLIC: [u8; 32] = [
        0xd7, 0x5a, 0x98, 0x01, 0x82, 0xb1, 0x0a, 0xb7, 0xd5, 0x4b, 0xfe, 0xd3, 0xc9, 0x64, 0x07,
        0x3a, 0x0e, 0xe1, 0x72, 0xf3, 0xda, 0xa6, 0x23, 0x25, 0xaf, 0x02, 0x1a, 0x68, 0xf7, 0x07,
        0x51, 0x1a,
    ];
    pub const SIGNATURE: [u8; 64] = [
        0xe5, 0x56, 0x43, 0x00, 0xc3, 0x60, 0xac, 0x72, 0x90, 0x86, 0xe2, 0xcc, 0x80, 0x6e, 0x82,
        0x8a, 0x84, 0x87, 0x7f, 0x1e, 0xb8, 0xe5, 0xd9, 0x74, 0xd8, 0x73, 0xe0, 0x65, 0x22, 0x49,
        0x01, 0x55, 0x5f, 0xb8, 0x82, 0x15, 0x90, 0xa3, 0x3b, 0xac, 0xc6, 0x1e, 0x39, 0x70, 0x1c,
        0xf9, 0xb4, 0x6b, 0xd2, 0x5b, 0xf5, 0xf0, 0x59, 0x5b, 0xbe, 0x24, 0x65, 0x51, 0x41, 0x43,
        0x8e, 0x7a, 0x10, 0x0b,
    ];
}

/// Ed25519 signing key: either the 32-byte seed, or seed followed by the
/// public key. Returns the seed and the embedded public key, if any.
pub(crate) fn ed25519_seed(
    key: &KeyMaterial,
) -> PasetoResult<(Zeroizing<[u8; ED25519_SEED_LEN]>, Option<[u8; ED25519_PUBLIC_LEN]>)> {
    let bytes = key.as_bytes();
    let (seed, public) = match bytes.len() {
        ED25519_SEED_LEN => (bytes, None),
        n if n == ED25519_SEED_LEN + ED25519_PUBLIC_LEN => {
            let (seed, public) = bytes.split_at(ED25519_SEED_LEN);
            (seed, Some(public))
        }
        n => {
            return Err(PasetoError::InvalidKey(format!(
                "Ed25519 secret key must be 32 or 64 bytes, got {n}"
            )));
        }
    };
    let mut out = Zeroizing::new([0u8; ED25519_SEED_LEN]);
    out.copy_from_slice(seed);
    let public = public.map(|p| {
        let mut pk = [0u8; ED25519_PUBLIC_LEN];
        pk.copy_from_slice(p);
        pk
    });
    Ok((out, public))
}

/// Ed25519 verification key bytes
pub(crate) fn ed25519_public(key: &KeyMaterial) -> PasetoResult<[u8; ED25519_PUBLIC_LEN]> {
    key.as_bytes().try_into().map_err(|_| {
        PasetoError::InvalidKey(format!(
            "Ed25519 public key must be 32 bytes, got {}",
            key.as_bytes().len()
        ))
    })
}

/// Fail a self-test
pub(crate) fn self_test_failed(engine: &str, reason: &str) -> PasetoError {
    PasetoError::EngineInitialization {
        engine: engine.to_string(),
        reason: reason.to_string(),
    }
}
