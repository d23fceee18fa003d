//! Token footer claims

use super::map::{ClaimRead, Claims, ClaimsMap};
use super::payload::registered;
use super::value::ClaimValue;
use crate::error::PasetoResult;
use std::fmt;
use std::ops::Deref;

/// Immutable token footer.
///
/// A footer is either structured claims or an opaque string. Building from
/// claims leaves the raw value absent, unless there are no claims at all, in
/// which case the raw value is the empty string. [`FooterClaims::new`] stores
/// both parts exactly as given.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FooterClaims {
    claims: Claims,
    value: Option<String>,
}

impl FooterClaims {
    /// Store claims and raw value verbatim, without inferring either
    #[must_use]
    pub fn new(claims: Option<Claims>, value: Option<String>) -> Self {
        Self {
            claims: claims.unwrap_or_default(),
            value,
        }
    }

    /// Structured footer. An empty claim set yields an empty raw value.
    #[must_use]
    pub fn from_claims(claims: impl Into<Claims>) -> Self {
        let claims = claims.into();
        let value = claims.is_empty().then(String::new);
        Self { claims, value }
    }

    /// Opaque footer with no claims
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        Self {
            claims: Claims::empty(),
            value: Some(value.into()),
        }
    }

    /// Raw footer string, absent for structured footers
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Footer claims
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Key identifier (`kid`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn key_id(&self) -> PasetoResult<Option<String>> {
        self.get(registered::KEY_ID)
    }

    /// Wrapped key (`wpk`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn wrapped_key(&self) -> PasetoResult<Option<String>> {
        self.get(registered::WRAPPED_KEY)
    }
}

impl Default for FooterClaims {
    fn default() -> Self {
        Self::from_claims(Claims::empty())
    }
}

impl ClaimRead for FooterClaims {
    fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.claim(name)
    }
}

impl Deref for FooterClaims {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.claims
    }
}

impl From<ClaimsMap> for FooterClaims {
    fn from(map: ClaimsMap) -> Self {
        Self::from_claims(map)
    }
}

impl From<&str> for FooterClaims {
    fn from(value: &str) -> Self {
        Self::from_value(value)
    }
}

impl fmt::Debug for FooterClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FooterClaims")
            .field("claims", &self.claims)
            .field("value", &self.value)
            .finish()
    }
}
