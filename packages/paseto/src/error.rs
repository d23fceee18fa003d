//! PASETO error types

use crate::crypto::{CryptoCapability, Operation};
use thiserror::Error;

/// PASETO operation result type
pub type PasetoResult<T> = Result<T, PasetoError>;

/// Types the claim converter handles on its own. Everything else has to be
/// materialized by the claims deserializer.
const CONVERSION_HINT: &str = "Only simple string, instant, date, long, int, short and byte claim \
     values are converted automatically. Anything more complex is expected to be materialized \
     into your desired type by the claims deserializer: register the type with \
     JsonClaims::materialize, or read the raw JSON with get_deserialized";

/// PASETO error types
#[derive(Debug, Clone, Error)]
pub enum PasetoError {
    /// A claim exists but cannot be converted to the requested type
    #[error(
        "Cannot convert existing claim value of type '{actual}' to desired type '{requested}'. {hint}",
        hint = CONVERSION_HINT
    )]
    TypeMismatch {
        /// Runtime type of the stored value
        actual: String,
        /// Type the caller asked for
        requested: &'static str,
    },

    /// A text claim read as a timestamp is not ISO-8601
    #[error("'{claim}' value does not appear to be ISO-8601-formatted: {value}")]
    Parse {
        /// Claim name
        claim: String,
        /// Offending text
        value: String,
        /// Underlying parser error
        #[source]
        source: chrono::ParseError,
    },

    /// A claim value has no conversion path to a timestamp
    #[error("Cannot derive a timestamp from '{claim}' value '{value}'")]
    IllegalState {
        /// Claim name
        claim: String,
        /// Rendered value
        value: String,
    },

    /// No backend is registered for the capability
    #[error("No crypto provider available for {0}")]
    ProviderNotAvailable(CryptoCapability),

    /// More than one provider shares the best rank for a capability
    #[error("Ambiguous crypto providers for {capability}: engines {engines:?} share the same precedence")]
    AmbiguousProvider {
        /// Capability being resolved
        capability: CryptoCapability,
        /// Engines of the tied candidates
        engines: Vec<String>,
    },

    /// Configuration names an engine nothing provides
    #[error("Unknown crypto engine: {0}")]
    UnknownEngine(String),

    /// Engine one-time setup failed
    #[error("Crypto engine '{engine}' failed to initialize: {reason}")]
    EngineInitialization {
        /// Engine identifier
        engine: String,
        /// Failure description
        reason: String,
    },

    /// The global registry was already published
    #[error("Crypto provider registry is already initialized")]
    AlreadyInitialized,

    /// Invalid registry configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Key material does not fit the operation
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Malformed operation input (nonce length, signature length)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A provider was handed a request for another operation
    #[error("Provider for {expected} cannot perform {requested}")]
    OperationMismatch {
        /// Operation the provider serves
        expected: Operation,
        /// Operation that was requested
        requested: Operation,
    },

    /// A provider answered with output of the wrong shape
    #[error("Provider for {0} returned unexpected output")]
    UnexpectedOutput(CryptoCapability),

    /// Verification or decryption failed. Intentionally carries no detail.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Claims could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PasetoError {
    /// Create a type mismatch error
    #[inline]
    #[must_use]
    pub fn type_mismatch(actual: impl Into<String>, requested: &'static str) -> Self {
        PasetoError::TypeMismatch {
            actual: actual.into(),
            requested,
        }
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        PasetoError::InvalidKey(msg.to_string())
    }

    /// Create an invalid input error
    #[inline]
    #[must_use]
    pub fn invalid_input(msg: &str) -> Self {
        PasetoError::InvalidInput(msg.to_string())
    }

    /// Create a configuration error
    #[inline]
    #[must_use]
    pub fn configuration(msg: &str) -> Self {
        PasetoError::Configuration(msg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        PasetoError::Serialization(msg.to_string())
    }

    /// True for the undifferentiated verify/decrypt failure
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, PasetoError::AuthenticationFailed)
    }
}

impl From<serde_json::Error> for PasetoError {
    fn from(e: serde_json::Error) -> Self {
        PasetoError::Serialization(e.to_string())
    }
}
