//! Registered payload claims

use super::map::{ClaimRead, Claims, ClaimsMap};
use super::value::ClaimValue;
use crate::error::PasetoResult;
use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::Deref;

/// Names of the claims reserved by the token format.
pub mod registered {
    /// Issuer
    pub const ISSUER: &str = "iss";
    /// Subject
    pub const SUBJECT: &str = "sub";
    /// Audience
    pub const AUDIENCE: &str = "aud";
    /// Expiration time
    pub const EXPIRATION: &str = "exp";
    /// Not before
    pub const NOT_BEFORE: &str = "nbf";
    /// Issued at
    pub const ISSUED_AT: &str = "iat";
    /// Token identifier
    pub const TOKEN_ID: &str = "jti";
    /// Footer key identifier
    pub const KEY_ID: &str = "kid";
    /// Footer wrapped key
    pub const WRAPPED_KEY: &str = "wpk";

    /// Payload claims that always hold dates
    pub const DATES: [&str; 3] = [EXPIRATION, NOT_BEFORE, ISSUED_AT];
}

/// Frozen token payload with access to the registered claims.
///
/// `exp`, `nbf` and `iat` read as timestamps from timestamps, ISO-8601 text
/// or epoch milliseconds.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PayloadClaims {
    claims: Claims,
}

impl PayloadClaims {
    /// Wrap frozen claims
    #[must_use]
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    /// Issuer (`iss`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn issuer(&self) -> PasetoResult<Option<String>> {
        self.get(registered::ISSUER)
    }

    /// Subject (`sub`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn subject(&self) -> PasetoResult<Option<String>> {
        self.get(registered::SUBJECT)
    }

    /// Audience (`aud`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn audience(&self) -> PasetoResult<Option<String>> {
        self.get(registered::AUDIENCE)
    }

    /// Expiration (`exp`)
    ///
    /// # Errors
    ///
    /// Parse or illegal-state errors when the claim is not an ISO-8601 date.
    pub fn expiration(&self) -> PasetoResult<Option<DateTime<Utc>>> {
        self.get(registered::EXPIRATION)
    }

    /// Not before (`nbf`)
    ///
    /// # Errors
    ///
    /// Parse or illegal-state errors when the claim is not an ISO-8601 date.
    pub fn not_before(&self) -> PasetoResult<Option<DateTime<Utc>>> {
        self.get(registered::NOT_BEFORE)
    }

    /// Issued at (`iat`)
    ///
    /// # Errors
    ///
    /// Parse or illegal-state errors when the claim is not an ISO-8601 date.
    pub fn issued_at(&self) -> PasetoResult<Option<DateTime<Utc>>> {
        self.get(registered::ISSUED_AT)
    }

    /// Token identifier (`jti`)
    ///
    /// # Errors
    ///
    /// [`crate::PasetoError::TypeMismatch`] when the claim is not text.
    pub fn token_id(&self) -> PasetoResult<Option<String>> {
        self.get(registered::TOKEN_ID)
    }

    /// Underlying frozen claims
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

impl ClaimRead for PayloadClaims {
    fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.claim(name)
    }

    fn is_reserved_date(&self, name: &str) -> bool {
        registered::DATES.contains(&name)
    }
}

impl Deref for PayloadClaims {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.claims
    }
}

impl From<Claims> for PayloadClaims {
    fn from(claims: Claims) -> Self {
        Self::new(claims)
    }
}

impl From<ClaimsMap> for PayloadClaims {
    fn from(map: ClaimsMap) -> Self {
        Self::new(map.freeze())
    }
}

impl fmt::Display for PayloadClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.claims, f)
    }
}

impl fmt::Debug for PayloadClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PayloadClaims").field(&self.claims).finish()
    }
}
