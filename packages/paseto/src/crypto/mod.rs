//! Crypto capabilities, providers and the registry that selects them

pub mod capability;
mod catalog;
pub mod config;
pub mod engines;
pub mod key;
pub mod provider;
pub mod registry;

pub use capability::{CryptoCapability, Operation, Purpose, Version};
pub use catalog::builtin_providers;
pub use config::{ENGINES_ENV, OVERRIDES_ENV, RegistryConfig};
pub use engines::rustcrypto::{
    XCHACHA_KEY_LEN, XCHACHA_NONCE_LEN, ed25519_public_key, p384_public_key, random_nonce,
};
pub use key::{KeyKind, KeyMaterial, KeySupplier};
pub use provider::{CryptoEngine, CryptoOutput, CryptoProvider, CryptoRequest, EngineId};
pub use registry::{ProviderRegistry, RegistryBuilder};
