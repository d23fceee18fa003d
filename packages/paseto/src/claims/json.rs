//! Claims (de)serialization plug-point and its JSON implementation

use super::map::{Claims, ClaimsMap};
use super::value::{ClaimValue, CustomClaim};
use crate::error::{PasetoError, PasetoResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Turns decoded payload or footer bytes into claims.
pub trait ClaimsDeserializer: Send + Sync {
    /// Decode claims
    ///
    /// # Errors
    ///
    /// [`PasetoError::Serialization`] when the bytes are not a claims object.
    fn deserialize(&self, bytes: &[u8]) -> PasetoResult<Claims>;
}

/// Turns claims into payload or footer bytes.
pub trait ClaimsSerializer: Send + Sync {
    /// Encode claims
    ///
    /// # Errors
    ///
    /// [`PasetoError::Serialization`] when a value cannot be encoded.
    fn serialize(&self, claims: &Claims) -> PasetoResult<Vec<u8>>;
}

type Materializer = Arc<dyn Fn(serde_json::Value) -> PasetoResult<ClaimValue> + Send + Sync>;

/// JSON claims codec.
///
/// Complex claim types can be materialized eagerly with
/// [`JsonClaims::materialize`]; readers then get them back through
/// `get_custom`.
#[derive(Clone, Default)]
pub struct JsonClaims {
    materializers: HashMap<String, Materializer>,
}

impl JsonClaims {
    /// Codec without custom types
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize `claim` into `T` while decoding
    #[must_use]
    pub fn materialize<T>(mut self, claim: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let claim = claim.into();
        let name = claim.clone();
        let materializer: Materializer = Arc::new(move |json| {
            serde_json::from_value::<T>(json)
                .map(|value| ClaimValue::Custom(CustomClaim::new(value)))
                .map_err(|e| PasetoError::Serialization(format!("claim '{name}': {e}")))
        });
        self.materializers.insert(claim, materializer);
        self
    }

    /// Decode claims from an already parsed JSON value
    ///
    /// # Errors
    ///
    /// [`PasetoError::Serialization`] when `json` is not an object or a
    /// materializer rejects its claim.
    pub fn from_value(&self, json: serde_json::Value) -> PasetoResult<Claims> {
        let serde_json::Value::Object(object) = json else {
            return Err(PasetoError::serialization("claims must be a JSON object"));
        };
        let mut map = ClaimsMap::with_capacity(object.len());
        for (name, json) in object {
            if json.is_null() {
                continue;
            }
            let value = match self.materializers.get(&name) {
                Some(materialize) => Some(materialize(json)?),
                None => ClaimValue::from_json(json),
            };
            map.put(name, value);
        }
        Ok(map.freeze())
    }

    /// Encode claims as a JSON value
    ///
    /// # Errors
    ///
    /// [`PasetoError::Serialization`] for custom claims.
    pub fn to_value<C: Serialize>(&self, claims: &C) -> PasetoResult<serde_json::Value> {
        Ok(serde_json::to_value(claims)?)
    }
}

impl ClaimsDeserializer for JsonClaims {
    fn deserialize(&self, bytes: &[u8]) -> PasetoResult<Claims> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        self.from_value(json)
    }
}

impl ClaimsSerializer for JsonClaims {
    fn serialize(&self, claims: &Claims) -> PasetoResult<Vec<u8>> {
        Ok(serde_json::to_vec(claims)?)
    }
}

impl fmt::Debug for JsonClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonClaims")
            .field("materialized", &self.materializers.keys().collect::<Vec<_>>())
            .finish()
    }
}
