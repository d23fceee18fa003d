//! Claims containers
//!
//! [`ClaimsMap`] is the mutable container used while building a payload or
//! footer. [`Claims`] is its frozen form, shared by readers of a parsed or
//! published token. Both read through [`ClaimRead`].

use super::converter::ClaimConverter;
use super::value::{ClaimType, ClaimValue};
use crate::error::{PasetoError, PasetoResult};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::SystemTime;

type Entries = IndexMap<String, ClaimValue>;

/// Read access to a set of claims, with typed conversion.
pub trait ClaimRead {
    /// Raw stored value
    fn claim(&self, name: &str) -> Option<&ClaimValue>;

    /// Whether `name` is a date claim whose format is fixed by the token
    /// format. Containers of registered claims override this.
    fn is_reserved_date(&self, _name: &str) -> bool {
        false
    }

    /// Read a claim converted to `target`. Absent claims are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// See [`ClaimConverter::convert`].
    fn get_as(&self, name: &str, target: ClaimType) -> PasetoResult<Option<ClaimValue>> {
        let Some(value) = self.claim(name) else {
            return Ok(None);
        };
        let value = if target.is_timestamp() && self.is_reserved_date(name) {
            ClaimValue::Instant(ClaimConverter::to_registered_date(name, value)?)
        } else {
            value.clone()
        };
        ClaimConverter::convert(name, value, target).map(Some)
    }

    /// Read a claim as `T`. Absent claims are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// See [`ClaimConverter::convert`].
    fn get<T: FromClaim>(&self, name: &str) -> PasetoResult<Option<T>> {
        self.get_as(name, T::TARGET)?
            .map(T::from_claim_value)
            .transpose()
    }

    /// Read a claim materialized by the deserializer as a caller type
    ///
    /// # Errors
    ///
    /// [`PasetoError::TypeMismatch`] when the claim holds anything else.
    fn get_custom<T: Any + Send + Sync>(&self, name: &str) -> PasetoResult<Option<Arc<T>>> {
        match self.claim(name) {
            None => Ok(None),
            Some(ClaimValue::Custom(custom)) => custom.downcast::<T>().map(Some).ok_or_else(|| {
                PasetoError::type_mismatch(custom.type_name(), std::any::type_name::<T>())
            }),
            Some(other) => Err(PasetoError::type_mismatch(
                other.type_name(),
                std::any::type_name::<T>(),
            )),
        }
    }

    /// Deserialize a claim into a caller type with serde
    ///
    /// # Errors
    ///
    /// [`PasetoError::TypeMismatch`] for custom values,
    /// [`PasetoError::Serialization`] when serde rejects the value.
    fn get_deserialized<T: DeserializeOwned>(&self, name: &str) -> PasetoResult<Option<T>> {
        let Some(value) = self.claim(name) else {
            return Ok(None);
        };
        if let ClaimValue::Custom(custom) = value {
            return Err(PasetoError::type_mismatch(
                custom.type_name(),
                std::any::type_name::<T>(),
            ));
        }
        let json = serde_json::to_value(value)?;
        Ok(Some(serde_json::from_value(json)?))
    }
}

/// Rust types a claim can be read as.
pub trait FromClaim: Sized {
    /// Conversion target
    const TARGET: ClaimType;

    /// Unwrap an already-converted value
    ///
    /// # Errors
    ///
    /// [`PasetoError::TypeMismatch`] when `value` is not of [`Self::TARGET`].
    fn from_claim_value(value: ClaimValue) -> PasetoResult<Self>;
}

macro_rules! from_claim {
    ($($ty:ty => $target:ident),* $(,)?) => {
        $(
            impl FromClaim for $ty {
                const TARGET: ClaimType = ClaimType::$target;

                fn from_claim_value(value: ClaimValue) -> PasetoResult<Self> {
                    match value {
                        ClaimValue::$target(v) => Ok(v),
                        other => Err(PasetoError::type_mismatch(
                            other.type_name(),
                            ClaimType::$target.name(),
                        )),
                    }
                }
            }
        )*
    };
}

from_claim! {
    String => String,
    DateTime<Utc> => Instant,
    SystemTime => Date,
    i64 => Long,
    i32 => Int,
    i16 => Short,
    i8 => Byte,
    f64 => Decimal,
    bool => Bool,
    serde_json::Value => Json,
}

/// Mutable, insertion-ordered claims container.
///
/// Storing an absent value removes the claim. Order is kept for display and
/// serialization only; equality and hashing ignore it.
#[derive(Clone, Default)]
pub struct ClaimsMap {
    entries: Entries,
}

impl ClaimsMap {
    /// Empty container
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty container with room for `capacity` claims
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Number of claims
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no claim is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `name` is stored
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Store a claim, or remove it when `value` is `None`. Returns the
    /// previous value.
    pub fn put(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Option<ClaimValue>>,
    ) -> Option<ClaimValue> {
        let name = name.into();
        match value.into() {
            Some(value) => self.entries.insert(name, value),
            None => self.entries.shift_remove(&name),
        }
    }

    /// Store a claim. Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Option<ClaimValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder-style [`ClaimsMap::insert`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Remove a claim, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<ClaimValue> {
        self.entries.shift_remove(name)
    }

    /// Merge claims; `None` values remove the name
    pub fn put_all<I, K>(&mut self, claims: I)
    where
        I: IntoIterator<Item = (K, Option<ClaimValue>)>,
        K: Into<String>,
    {
        for (name, value) in claims {
            self.put(name, value);
        }
    }

    /// Remove every claim
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Claim names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Claim values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &ClaimValue> {
        self.entries.values()
    }

    /// Claims in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn entries(&self) -> &Entries {
        &self.entries
    }

    /// Freeze into an immutable, shareable [`Claims`]
    #[must_use]
    pub fn freeze(self) -> Claims {
        Claims {
            entries: Arc::new(self.entries),
        }
    }
}

impl ClaimRead for ClaimsMap {
    fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.entries.get(name)
    }
}

impl<K: Into<String>> Extend<(K, Option<ClaimValue>)> for ClaimsMap {
    fn extend<I: IntoIterator<Item = (K, Option<ClaimValue>)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for ClaimsMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ClaimsMap {
    type Item = (String, ClaimValue);
    type IntoIter = indexmap::map::IntoIter<String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Immutable claims, cheap to clone and safe to share across threads.
#[derive(Clone, Default)]
pub struct Claims {
    entries: Arc<Entries>,
}

impl Claims {
    /// Empty claims
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of claims
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no claim is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `name` is stored
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Claim names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Claim values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &ClaimValue> {
        self.entries.values()
    }

    /// Claims in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn entries(&self) -> &Entries {
        &self.entries
    }

    /// Independent mutable copy
    #[must_use]
    pub fn thaw(&self) -> ClaimsMap {
        ClaimsMap {
            entries: (*self.entries).clone(),
        }
    }
}

impl ClaimRead for Claims {
    fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.entries.get(name)
    }
}

impl From<ClaimsMap> for Claims {
    fn from(map: ClaimsMap) -> Self {
        map.freeze()
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().collect::<ClaimsMap>().freeze()
    }
}

/// Order-insensitive hash: each entry hashes on its own, the results are summed.
fn hash_entries<H: Hasher>(entries: &Entries, state: &mut H) {
    let sum = entries.iter().fold(0u64, |acc, entry| {
        let mut hasher = DefaultHasher::new();
        entry.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    });
    state.write_usize(entries.len());
    state.write_u64(sum);
}

fn fmt_entries(entries: &Entries, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (name, value)) in entries.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}={value}")?;
    }
    f.write_str("}")
}

fn serialize_entries<S: Serializer>(entries: &Entries, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, value) in entries {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

macro_rules! container_traits {
    ($($ty:ty),*) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    // IndexMap equality ignores order
                    self.entries() == other.entries()
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    hash_entries(self.entries(), state);
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt_entries(self.entries(), f)
                }
            }

            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_map().entries(self.entries().iter()).finish()
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serialize_entries(self.entries(), serializer)
                }
            }
        )*
    };
}

container_traits!(ClaimsMap, Claims);
