//! Raw claim values and conversion targets

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Serialize, Serializer, ser::Error as _};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::SystemTime;

/// A claim value as stored in a claims container.
///
/// Values keep the representation they arrived in. Conversion to the type a
/// caller asks for happens on read, see [`ClaimConverter`](super::ClaimConverter).
#[derive(Clone)]
pub enum ClaimValue {
    /// Text
    String(String),
    /// 64-bit integer
    Long(i64),
    /// Word-sized integer, the default for numbers that fit in 32 bits
    Int(i32),
    /// 16-bit integer
    Short(i16),
    /// 8-bit integer
    Byte(i8),
    /// Floating point number
    Decimal(f64),
    /// UTC instant
    Instant(DateTime<Utc>),
    /// Legacy system timestamp
    Date(SystemTime),
    /// Zoned calendar value, projected to an instant when read as a timestamp
    Calendar(DateTime<FixedOffset>),
    /// Boolean
    Bool(bool),
    /// Nested structured value (JSON object or array)
    Json(serde_json::Value),
    /// Caller type already materialized by a deserializer
    Custom(CustomClaim),
}

/// A materialized caller-defined claim value.
///
/// Equality is identity: two custom claims are equal only when they share the
/// same allocation.
#[derive(Clone)]
pub struct CustomClaim {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CustomClaim {
    /// Wrap an already-materialized value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap a shared value without copying it
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Rust type name of the wrapped value
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Downcast to the concrete type
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.value).cast::<()>() as usize
    }
}

impl PartialEq for CustomClaim {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for CustomClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomClaim<{}>", self.type_name)
    }
}

/// Closed set of types a claim can be read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimType {
    /// Text
    String,
    /// UTC instant
    Instant,
    /// Legacy system timestamp
    Date,
    /// 64-bit integer
    Long,
    /// 32-bit integer
    Int,
    /// 16-bit integer
    Short,
    /// 8-bit integer
    Byte,
    /// Floating point number
    Decimal,
    /// Boolean
    Bool,
    /// Nested JSON value
    Json,
}

impl ClaimType {
    /// Name used in conversion error messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ClaimType::String => "string",
            ClaimType::Instant => "instant",
            ClaimType::Date => "date",
            ClaimType::Long => "long",
            ClaimType::Int => "int",
            ClaimType::Short => "short",
            ClaimType::Byte => "byte",
            ClaimType::Decimal => "decimal",
            ClaimType::Bool => "boolean",
            ClaimType::Json => "json",
        }
    }

    /// Timestamp-like targets go through date resolution before conversion
    #[must_use]
    pub fn is_timestamp(self) -> bool {
        matches!(self, ClaimType::Instant | ClaimType::Date)
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ClaimValue {
    /// Runtime type name, as reported in conversion errors
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ClaimValue::String(_) => "string",
            ClaimValue::Long(_) => "long",
            ClaimValue::Int(_) => "int",
            ClaimValue::Short(_) => "short",
            ClaimValue::Byte(_) => "byte",
            ClaimValue::Decimal(_) => "decimal",
            ClaimValue::Instant(_) => "instant",
            ClaimValue::Date(_) => "date",
            ClaimValue::Calendar(_) => "calendar",
            ClaimValue::Bool(_) => "boolean",
            ClaimValue::Json(_) => "json",
            ClaimValue::Custom(custom) => custom.type_name(),
        }
    }

    /// Build a claim value from parsed JSON. `null` has no claim value.
    ///
    /// Integers that fit in 32 bits become [`ClaimValue::Int`], larger ones
    /// [`ClaimValue::Long`]. Unsigned values beyond `i64::MAX` are kept as
    /// decimals.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(ClaimValue::Bool(b)),
            Value::String(s) => Some(ClaimValue::String(s)),
            Value::Number(n) => Some(if let Some(i) = n.as_i64() {
                i32::try_from(i).map_or(ClaimValue::Long(i), ClaimValue::Int)
            } else {
                ClaimValue::Decimal(n.as_f64().unwrap_or(f64::NAN))
            }),
            nested @ (Value::Array(_) | Value::Object(_)) => Some(ClaimValue::Json(nested)),
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            ClaimValue::String(_) => 0,
            ClaimValue::Long(_) => 1,
            ClaimValue::Int(_) => 2,
            ClaimValue::Short(_) => 3,
            ClaimValue::Byte(_) => 4,
            ClaimValue::Decimal(_) => 5,
            ClaimValue::Instant(_) => 6,
            ClaimValue::Date(_) => 7,
            ClaimValue::Calendar(_) => 8,
            ClaimValue::Bool(_) => 9,
            ClaimValue::Json(_) => 10,
            ClaimValue::Custom(_) => 11,
        }
    }
}

pub(crate) fn iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl PartialEq for ClaimValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClaimValue::String(a), ClaimValue::String(b)) => a == b,
            (ClaimValue::Long(a), ClaimValue::Long(b)) => a == b,
            (ClaimValue::Int(a), ClaimValue::Int(b)) => a == b,
            (ClaimValue::Short(a), ClaimValue::Short(b)) => a == b,
            (ClaimValue::Byte(a), ClaimValue::Byte(b)) => a == b,
            // bitwise, so Eq and Hash stay consistent for NaN and signed zero
            (ClaimValue::Decimal(a), ClaimValue::Decimal(b)) => a.to_bits() == b.to_bits(),
            (ClaimValue::Instant(a), ClaimValue::Instant(b)) => a == b,
            (ClaimValue::Date(a), ClaimValue::Date(b)) => a == b,
            (ClaimValue::Calendar(a), ClaimValue::Calendar(b)) => {
                a == b && a.offset() == b.offset()
            }
            (ClaimValue::Bool(a), ClaimValue::Bool(b)) => a == b,
            (ClaimValue::Json(a), ClaimValue::Json(b)) => a == b,
            (ClaimValue::Custom(a), ClaimValue::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ClaimValue {}

impl Hash for ClaimValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.discriminant());
        match self {
            ClaimValue::String(s) => s.hash(state),
            ClaimValue::Long(v) => v.hash(state),
            ClaimValue::Int(v) => v.hash(state),
            ClaimValue::Short(v) => v.hash(state),
            ClaimValue::Byte(v) => v.hash(state),
            ClaimValue::Decimal(v) => v.to_bits().hash(state),
            ClaimValue::Instant(v) => v.hash(state),
            ClaimValue::Date(v) => v.hash(state),
            ClaimValue::Calendar(v) => {
                v.hash(state);
                v.offset().local_minus_utc().hash(state);
            }
            ClaimValue::Bool(v) => v.hash(state),
            // serde_json::Value has no Hash; its compact text is canonical
            // enough for equal values with identical key order
            ClaimValue::Json(v) => v.to_string().hash(state),
            ClaimValue::Custom(c) => c.addr().hash(state),
        }
    }
}

impl fmt::Debug for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::String(s) => write!(f, "String({s:?})"),
            ClaimValue::Long(v) => write!(f, "Long({v})"),
            ClaimValue::Int(v) => write!(f, "Int({v})"),
            ClaimValue::Short(v) => write!(f, "Short({v})"),
            ClaimValue::Byte(v) => write!(f, "Byte({v})"),
            ClaimValue::Decimal(v) => write!(f, "Decimal({v})"),
            ClaimValue::Instant(v) => write!(f, "Instant({})", iso8601(*v)),
            ClaimValue::Date(v) => write!(f, "Date({})", iso8601(DateTime::<Utc>::from(*v))),
            ClaimValue::Calendar(v) => write!(f, "Calendar({})", v.to_rfc3339()),
            ClaimValue::Bool(v) => write!(f, "Bool({v})"),
            ClaimValue::Json(v) => write!(f, "Json({v})"),
            ClaimValue::Custom(c) => c.fmt(f),
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::String(s) => f.write_str(s),
            ClaimValue::Long(v) => write!(f, "{v}"),
            ClaimValue::Int(v) => write!(f, "{v}"),
            ClaimValue::Short(v) => write!(f, "{v}"),
            ClaimValue::Byte(v) => write!(f, "{v}"),
            ClaimValue::Decimal(v) => write!(f, "{v}"),
            ClaimValue::Instant(v) => f.write_str(&iso8601(*v)),
            ClaimValue::Date(v) => f.write_str(&iso8601(DateTime::<Utc>::from(*v))),
            ClaimValue::Calendar(v) => f.write_str(&v.to_rfc3339()),
            ClaimValue::Bool(v) => write!(f, "{v}"),
            ClaimValue::Json(v) => write!(f, "{v}"),
            ClaimValue::Custom(c) => write!(f, "<{}>", c.type_name()),
        }
    }
}

impl Serialize for ClaimValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClaimValue::String(s) => serializer.serialize_str(s),
            ClaimValue::Long(v) => serializer.serialize_i64(*v),
            ClaimValue::Int(v) => serializer.serialize_i32(*v),
            ClaimValue::Short(v) => serializer.serialize_i16(*v),
            ClaimValue::Byte(v) => serializer.serialize_i8(*v),
            ClaimValue::Decimal(v) => serializer.serialize_f64(*v),
            ClaimValue::Instant(v) => serializer.serialize_str(&iso8601(*v)),
            ClaimValue::Date(v) => serializer.serialize_str(&iso8601(DateTime::<Utc>::from(*v))),
            ClaimValue::Calendar(v) => serializer.serialize_str(&v.to_rfc3339()),
            ClaimValue::Bool(v) => serializer.serialize_bool(*v),
            ClaimValue::Json(v) => v.serialize(serializer),
            ClaimValue::Custom(c) => Err(S::Error::custom(format!(
                "custom claim of type '{}' cannot be serialized; store it as JSON instead",
                c.type_name()
            ))),
        }
    }
}

macro_rules! claim_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ClaimValue {
                fn from(v: $ty) -> Self {
                    ClaimValue::$variant(v.into())
                }
            }
        )*
    };
}

claim_value_from! {
    String => String,
    &str => String,
    i64 => Long,
    i32 => Int,
    i16 => Short,
    i8 => Byte,
    f64 => Decimal,
    DateTime<Utc> => Instant,
    SystemTime => Date,
    DateTime<FixedOffset> => Calendar,
    bool => Bool,
    serde_json::Value => Json,
    CustomClaim => Custom,
}
