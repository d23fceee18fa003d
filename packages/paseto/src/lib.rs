//! Typed PASETO claims and version-pinned crypto provider selection
//!
//! This crate provides:
//! - Ordered claim containers with typed, converting reads
//! - Payload and footer claims with the registered claim accessors
//! - A JSON claims (de)serializer with materializers for custom types
//! - Crypto capabilities (`v2.local.encrypt`, `v4.public.sign`, ...) and the
//!   providers serving them on the RustCrypto and `ring` engines
//! - A process-wide registry selecting one provider per capability

#![forbid(unsafe_code)]

pub mod claims;
pub mod crypto;
mod error;

pub use claims::{
    ClaimConverter, ClaimRead, ClaimType, ClaimValue, Claims, ClaimsDeserializer, ClaimsMap,
    ClaimsSerializer, CustomClaim, FooterClaims, FromClaim, JsonClaims, PayloadClaims, registered,
};
pub use crypto::{
    CryptoCapability, CryptoEngine, CryptoOutput, CryptoProvider, CryptoRequest, EngineId,
    KeyKind, KeyMaterial, KeySupplier, Operation, ProviderRegistry, Purpose, RegistryBuilder,
    RegistryConfig, Version,
};
pub use error::*;
