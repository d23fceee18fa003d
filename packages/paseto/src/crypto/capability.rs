//! Crypto capability identifiers: version × purpose × operation

use crate::error::{PasetoError, PasetoResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    /// v1: AES-256-CTR + HMAC-SHA384 / RSA-PSS
    V1,
    /// v2: XChaCha20-Poly1305 / Ed25519
    V2,
    /// v3: AES-256-CTR + HMAC-SHA384 / ECDSA P-384
    V3,
    /// v4: XChaCha20 + BLAKE2b-MAC / Ed25519
    V4,
}

/// Token purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Purpose {
    /// Symmetric authenticated encryption
    Local,
    /// Asymmetric signatures
    Public,
}

/// Cryptographic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Produce a signature
    Sign,
    /// Check a signature
    Verify,
    /// Authenticated encryption
    Encrypt,
    /// Authenticated decryption
    Decrypt,
}

impl Version {
    /// All versions, oldest first
    pub const ALL: [Version; 4] = [Version::V1, Version::V2, Version::V3, Version::V4];

    /// Header form, `v2`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
            Version::V3 => "v3",
            Version::V4 => "v4",
        }
    }
}

impl Purpose {
    /// Header form, `local`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Local => "local",
            Purpose::Public => "public",
        }
    }

    /// Operations valid for this purpose
    #[must_use]
    pub fn operations(self) -> [Operation; 2] {
        match self {
            Purpose::Local => [Operation::Encrypt, Operation::Decrypt],
            Purpose::Public => [Operation::Sign, Operation::Verify],
        }
    }
}

impl Operation {
    /// Lowercase name, `encrypt`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Sign => "sign",
            Operation::Verify => "verify",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
        }
    }

    /// Purpose this operation belongs to
    #[must_use]
    pub fn purpose(self) -> Purpose {
        match self {
            Operation::Encrypt | Operation::Decrypt => Purpose::Local,
            Operation::Sign | Operation::Verify => Purpose::Public,
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, $what:literal, [$($variant:ident),*]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = PasetoError;

            fn from_str(s: &str) -> PasetoResult<Self> {
                $(
                    if s == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )*
                Err(PasetoError::Configuration(format!(concat!("unknown ", $what, " '{}'"), s)))
            }
        }
    };
}

display_and_parse!(Version, "version", [V1, V2, V3, V4]);
display_and_parse!(Purpose, "purpose", [Local, Public]);
display_and_parse!(Operation, "operation", [Sign, Verify, Encrypt, Decrypt]);

/// A cryptographic function a token version needs, e.g. `v2.local.encrypt`.
///
/// Purpose and operation always agree: local capabilities encrypt and
/// decrypt, public ones sign and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CryptoCapability {
    version: Version,
    purpose: Purpose,
    operation: Operation,
}

impl CryptoCapability {
    /// Validated constructor
    ///
    /// # Errors
    ///
    /// [`PasetoError::Configuration`] when `operation` does not belong to
    /// `purpose`.
    pub fn new(version: Version, purpose: Purpose, operation: Operation) -> PasetoResult<Self> {
        if operation.purpose() != purpose {
            return Err(PasetoError::Configuration(format!(
                "{operation} is not a {purpose} operation"
            )));
        }
        Ok(Self {
            version,
            purpose,
            operation,
        })
    }

    /// Capability for `operation`; the purpose follows from it
    #[must_use]
    pub const fn of(version: Version, operation: Operation) -> Self {
        let purpose = match operation {
            Operation::Encrypt | Operation::Decrypt => Purpose::Local,
            Operation::Sign | Operation::Verify => Purpose::Public,
        };
        Self {
            version,
            purpose,
            operation,
        }
    }

    /// `vN.local.encrypt`
    #[must_use]
    pub const fn local_encrypt(version: Version) -> Self {
        Self::of(version, Operation::Encrypt)
    }

    /// `vN.local.decrypt`
    #[must_use]
    pub const fn local_decrypt(version: Version) -> Self {
        Self::of(version, Operation::Decrypt)
    }

    /// `vN.public.sign`
    #[must_use]
    pub const fn public_sign(version: Version) -> Self {
        Self::of(version, Operation::Sign)
    }

    /// `vN.public.verify`
    #[must_use]
    pub const fn public_verify(version: Version) -> Self {
        Self::of(version, Operation::Verify)
    }

    /// Every valid capability
    pub fn all() -> impl Iterator<Item = CryptoCapability> {
        Version::ALL.into_iter().flat_map(|version| {
            [Purpose::Local, Purpose::Public]
                .into_iter()
                .flat_map(Purpose::operations)
                .map(move |operation| Self::of(version, operation))
        })
    }

    /// Token version
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Token purpose
    #[must_use]
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Operation
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl fmt::Display for CryptoCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.version, self.purpose, self.operation)
    }
}

impl FromStr for CryptoCapability {
    type Err = PasetoError;

    fn from_str(s: &str) -> PasetoResult<Self> {
        let mut parts = s.trim().split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(version), Some(purpose), Some(operation), None) => {
                Self::new(version.parse()?, purpose.parse()?, operation.parse()?)
            }
            _ => Err(PasetoError::Configuration(format!(
                "capability '{s}' is not of the form version.purpose.operation"
            ))),
        }
    }
}

impl Serialize for CryptoCapability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CryptoCapability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
