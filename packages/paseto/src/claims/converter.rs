//! Conversion of stored claim values into requested types
//!
//! Every [`ClaimType`] has its own converter function. Conversion never
//! inspects Rust types at runtime; the target is always an explicit variant.

use super::value::{ClaimType, ClaimValue};
use crate::error::{PasetoError, PasetoResult};
use chrono::{DateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Stateless claim value converter
pub struct ClaimConverter;

impl ClaimConverter {
    /// Convert `value`, stored under `claim`, into `target`.
    ///
    /// # Errors
    ///
    /// - [`PasetoError::Parse`] for timestamp targets when text is not ISO-8601
    /// - [`PasetoError::IllegalState`] for timestamp targets when the value
    ///   has no timestamp projection
    /// - [`PasetoError::TypeMismatch`] when the value is not of the target
    ///   type after the automatic conversions
    pub fn convert(claim: &str, value: ClaimValue, target: ClaimType) -> PasetoResult<ClaimValue> {
        match target {
            ClaimType::Instant => Self::to_instant(claim, &value).map(ClaimValue::Instant),
            ClaimType::Date => Self::to_date(claim, &value).map(ClaimValue::Date),
            ClaimType::Long => Self::to_long(value),
            ClaimType::Int => Self::to_int(value),
            ClaimType::Short => Self::to_short(value),
            ClaimType::Byte => Self::to_byte(value),
            ClaimType::String => Self::expect(value, target, |v| matches!(v, ClaimValue::String(_))),
            ClaimType::Decimal => {
                Self::expect(value, target, |v| matches!(v, ClaimValue::Decimal(_)))
            }
            ClaimType::Bool => Self::expect(value, target, |v| matches!(v, ClaimValue::Bool(_))),
            ClaimType::Json => Self::expect(value, target, |v| matches!(v, ClaimValue::Json(_))),
        }
    }

    /// Project a value onto a UTC instant.
    ///
    /// Timestamps pass through, calendar values use their instant, numbers
    /// are epoch milliseconds and text must be ISO-8601.
    ///
    /// # Errors
    ///
    /// [`PasetoError::Parse`] for non ISO-8601 text,
    /// [`PasetoError::IllegalState`] for any other non-temporal value.
    pub fn to_instant(claim: &str, value: &ClaimValue) -> PasetoResult<DateTime<Utc>> {
        match value {
            ClaimValue::Instant(instant) => Ok(*instant),
            ClaimValue::Date(date) => Ok(DateTime::<Utc>::from(*date)),
            ClaimValue::Calendar(calendar) => Ok(calendar.with_timezone(&Utc)),
            ClaimValue::Long(millis) => Self::from_millis(claim, value, *millis),
            ClaimValue::Int(millis) => Self::from_millis(claim, value, i64::from(*millis)),
            ClaimValue::Short(millis) => Self::from_millis(claim, value, i64::from(*millis)),
            ClaimValue::Byte(millis) => Self::from_millis(claim, value, i64::from(*millis)),
            ClaimValue::Decimal(millis) if millis.is_finite() => {
                Self::from_millis(claim, value, millis.trunc() as i64)
            }
            ClaimValue::String(text) => Self::parse_iso8601(claim, text),
            _ => Err(Self::illegal_state(claim, value)),
        }
    }

    /// Like [`ClaimConverter::to_instant`], but returning a legacy timestamp
    ///
    /// # Errors
    ///
    /// Same as [`ClaimConverter::to_instant`].
    pub fn to_date(claim: &str, value: &ClaimValue) -> PasetoResult<SystemTime> {
        Self::to_instant(claim, value).map(SystemTime::from)
    }

    /// Resolve a registered date claim (`exp`, `nbf`, `iat`).
    ///
    /// Same projection as [`ClaimConverter::to_instant`], so ISO-8601 text
    /// and epoch milliseconds both resolve.
    ///
    /// # Errors
    ///
    /// Same as [`ClaimConverter::to_instant`].
    pub fn to_registered_date(claim: &str, value: &ClaimValue) -> PasetoResult<DateTime<Utc>> {
        Self::to_instant(claim, value)
    }

    fn to_long(value: ClaimValue) -> PasetoResult<ClaimValue> {
        let value = match value {
            ClaimValue::Int(v) => ClaimValue::Long(i64::from(v)),
            ClaimValue::Short(v) => ClaimValue::Long(i64::from(v)),
            ClaimValue::Byte(v) => ClaimValue::Long(i64::from(v)),
            other => other,
        };
        Self::expect(value, ClaimType::Long, |v| matches!(v, ClaimValue::Long(_)))
    }

    fn to_int(value: ClaimValue) -> PasetoResult<ClaimValue> {
        let value = match value {
            ClaimValue::Short(v) => ClaimValue::Int(i32::from(v)),
            ClaimValue::Byte(v) => ClaimValue::Int(i32::from(v)),
            other => other,
        };
        Self::expect(value, ClaimType::Int, |v| matches!(v, ClaimValue::Int(_)))
    }

    fn to_short(value: ClaimValue) -> PasetoResult<ClaimValue> {
        // narrowing only from the word-sized integer, and only when it fits
        let value = match value {
            ClaimValue::Int(v) => i16::try_from(v).map_or(ClaimValue::Int(v), ClaimValue::Short),
            ClaimValue::Byte(v) => ClaimValue::Short(i16::from(v)),
            other => other,
        };
        Self::expect(value, ClaimType::Short, |v| matches!(v, ClaimValue::Short(_)))
    }

    fn to_byte(value: ClaimValue) -> PasetoResult<ClaimValue> {
        let value = match value {
            ClaimValue::Int(v) => i8::try_from(v).map_or(ClaimValue::Int(v), ClaimValue::Byte),
            other => other,
        };
        Self::expect(value, ClaimType::Byte, |v| matches!(v, ClaimValue::Byte(_)))
    }

    fn expect(
        value: ClaimValue,
        target: ClaimType,
        is_instance: impl Fn(&ClaimValue) -> bool,
    ) -> PasetoResult<ClaimValue> {
        if is_instance(&value) {
            Ok(value)
        } else {
            Err(PasetoError::type_mismatch(value.type_name(), target.name()))
        }
    }

    fn from_millis(claim: &str, value: &ClaimValue, millis: i64) -> PasetoResult<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| Self::illegal_state(claim, value))
    }

    fn parse_iso8601(claim: &str, text: &str) -> PasetoResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|source| PasetoError::Parse {
                claim: claim.to_string(),
                value: text.to_string(),
                source,
            })
    }

    fn illegal_state(claim: &str, value: &ClaimValue) -> PasetoError {
        PasetoError::IllegalState {
            claim: claim.to_string(),
            value: value.to_string(),
        }
    }
}
