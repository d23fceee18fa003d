//! Statically enumerated built-in providers

use super::capability::{CryptoCapability, Version};
use super::engines::{Ed25519Provider, P384Provider, RingEd25519Provider, XChaCha20Poly1305Provider};
use super::provider::CryptoProvider;
use std::sync::Arc;

/// Every provider compiled into the crate, baseline and alternate alike.
///
/// The list order carries no meaning; selection is done by
/// [`RegistryConfig`](super::RegistryConfig).
#[must_use]
pub fn builtin_providers() -> Vec<Arc<dyn CryptoProvider>> {
    let mut providers: Vec<Arc<dyn CryptoProvider>> = vec![
        Arc::new(XChaCha20Poly1305Provider::encryptor()),
        Arc::new(XChaCha20Poly1305Provider::decryptor()),
        Arc::new(P384Provider::signer()),
        Arc::new(P384Provider::verifier()),
    ];
    for version in [Version::V2, Version::V4] {
        for capability in [
            CryptoCapability::public_sign(version),
            CryptoCapability::public_verify(version),
        ] {
            providers.push(Arc::new(Ed25519Provider::for_capability(capability)));
            providers.push(Arc::new(RingEd25519Provider::for_capability(capability)));
        }
    }
    providers
}
