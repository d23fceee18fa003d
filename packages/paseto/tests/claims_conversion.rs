//! Tests for typed claim reads - conversions, widening, narrowing and errors

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use cryypt_paseto::*;
use proptest::prelude::*;
use std::hash::{BuildHasher, RandomState};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn instant(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("valid RFC 3339 literal")
        .with_timezone(&Utc)
}

proptest! {
    #[test]
    fn test_put_then_get_returns_same_string(name in "[a-z]{1,12}", value in ".*") {
        let mut claims = ClaimsMap::new();
        claims.put(name.as_str(), ClaimValue::from(value.clone()));
        prop_assert_eq!(claims.get::<String>(&name).unwrap(), Some(value));
    }

    #[test]
    fn test_put_then_get_returns_same_long(name in "[a-z]{1,12}", value in any::<i64>()) {
        let mut claims = ClaimsMap::new();
        claims.put(name.as_str(), ClaimValue::Long(value));
        prop_assert_eq!(claims.get::<i64>(&name).unwrap(), Some(value));
    }

    #[test]
    fn test_put_then_get_survives_freeze(name in "[a-z]{1,12}", value in any::<i32>()) {
        let claims = ClaimsMap::new().with(name.as_str(), value).freeze();
        prop_assert_eq!(claims.get::<i32>(&name).unwrap(), Some(value));
        prop_assert_eq!(claims.get::<i64>(&name).unwrap(), Some(i64::from(value)));
    }

    #[test]
    fn test_int_to_short_narrows_exactly_when_in_range(value in any::<i32>()) {
        let claims = ClaimsMap::new().with("n", value);
        let result = claims.get::<i16>("n");
        match i16::try_from(value) {
            Ok(short) => prop_assert_eq!(result.unwrap(), Some(short)),
            Err(_) => {
                let is_mismatch = matches!(result, Err(PasetoError::TypeMismatch { .. }));
                prop_assert!(is_mismatch);
            }
        }
    }
}

#[test]
fn test_put_none_removes_claim() {
    let mut claims = ClaimsMap::new().with("sub", "alice").with("n", 1_i32);
    let previous = claims.put("sub", None);

    assert_eq!(previous, Some(ClaimValue::from("alice")));
    assert!(!claims.contains_key("sub"));
    assert_eq!(claims.get::<String>("sub").unwrap(), None);
    assert_eq!(claims.len(), 1);
}

#[test]
fn test_absent_claim_is_none_for_every_type() {
    let claims = Claims::empty();
    for target in [
        ClaimType::String,
        ClaimType::Instant,
        ClaimType::Date,
        ClaimType::Long,
        ClaimType::Int,
        ClaimType::Short,
        ClaimType::Byte,
        ClaimType::Decimal,
        ClaimType::Bool,
        ClaimType::Json,
    ] {
        assert_eq!(claims.get_as("missing", target).unwrap(), None, "{target}");
    }
    assert!(claims.get_custom::<Vec<u8>>("missing").unwrap().is_none());
    assert!(claims.get_deserialized::<Vec<u8>>("missing").unwrap().is_none());
}

#[test]
fn test_int_30000_reads_as_short() {
    let claims = ClaimsMap::new().with("n", 30000_i32);
    assert_eq!(claims.get::<i16>("n").unwrap(), Some(30000));
}

#[test]
fn test_int_100000_as_short_is_type_mismatch() {
    let claims = ClaimsMap::new().with("n", 100_000_i32);
    match claims.get::<i16>("n") {
        Err(PasetoError::TypeMismatch { actual, requested }) => {
            assert_eq!(actual, "int");
            assert_eq!(requested, "short");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_int_narrows_to_byte_only_in_range() {
    let claims = ClaimsMap::new().with("small", -100_i32).with("big", 300_i32);
    assert_eq!(claims.get::<i8>("small").unwrap(), Some(-100));
    assert!(matches!(
        claims.get::<i8>("big"),
        Err(PasetoError::TypeMismatch { .. })
    ));
}

#[test]
fn test_long_does_not_narrow() {
    let claims = ClaimsMap::new().with("n", 5_i64);
    assert!(matches!(
        claims.get::<i32>("n"),
        Err(PasetoError::TypeMismatch { .. })
    ));
    assert!(matches!(
        claims.get::<i16>("n"),
        Err(PasetoError::TypeMismatch { .. })
    ));
}

#[test]
fn test_narrow_integers_widen() {
    let claims = ClaimsMap::new().with("b", -7_i8).with("s", 1234_i16);

    assert_eq!(claims.get::<i16>("b").unwrap(), Some(-7));
    assert_eq!(claims.get::<i32>("b").unwrap(), Some(-7));
    assert_eq!(claims.get::<i64>("b").unwrap(), Some(-7));
    assert_eq!(claims.get::<i32>("s").unwrap(), Some(1234));
    assert_eq!(claims.get::<i64>("s").unwrap(), Some(1234));
}

#[test]
fn test_short_does_not_narrow_to_byte() {
    let claims = ClaimsMap::new().with("s", 5_i16);
    assert!(matches!(
        claims.get::<i8>("s"),
        Err(PasetoError::TypeMismatch { .. })
    ));
}

#[test]
fn test_iso8601_text_reads_as_instant() {
    let claims = ClaimsMap::new().with("at", "2021-01-01T00:00:00Z");
    let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(claims.get::<DateTime<Utc>>("at").unwrap(), Some(expected));
    assert_eq!(
        claims.get::<SystemTime>("at").unwrap(),
        Some(SystemTime::from(expected))
    );
}

#[test]
fn test_iso8601_with_offset_is_normalized_to_utc() {
    let claims = ClaimsMap::new().with("at", "2021-01-01T02:00:00+02:00");
    assert_eq!(
        claims.get::<DateTime<Utc>>("at").unwrap(),
        Some(instant("2021-01-01T00:00:00Z"))
    );
}

#[test]
fn test_non_iso8601_text_is_parse_error() {
    let claims = ClaimsMap::new().with("at", "not-a-date");
    match claims.get::<DateTime<Utc>>("at") {
        Err(PasetoError::Parse { claim, value, .. }) => {
            assert_eq!(claim, "at");
            assert_eq!(value, "not-a-date");
        }
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn test_timestamps_convert_between_each_other() {
    let at = instant("2022-06-15T12:30:00Z");
    let zoned = at.with_timezone(&FixedOffset::east_opt(5 * 3600).unwrap());
    let claims = ClaimsMap::new()
        .with("instant", at)
        .with("date", SystemTime::from(at))
        .with("calendar", zoned);

    for name in ["instant", "date", "calendar"] {
        assert_eq!(claims.get::<DateTime<Utc>>(name).unwrap(), Some(at), "{name}");
        assert_eq!(
            claims.get::<SystemTime>(name).unwrap(),
            Some(SystemTime::from(at)),
            "{name}"
        );
    }
}

#[test]
fn test_numbers_read_as_timestamps_are_epoch_millis() {
    let claims = ClaimsMap::new()
        .with("long", 1_000_i64)
        .with("int", 2_000_i32)
        .with("decimal", 3_000.9_f64);

    assert_eq!(
        claims.get::<SystemTime>("long").unwrap(),
        Some(UNIX_EPOCH + Duration::from_millis(1_000))
    );
    assert_eq!(
        claims.get::<SystemTime>("int").unwrap(),
        Some(UNIX_EPOCH + Duration::from_millis(2_000))
    );
    assert_eq!(
        claims.get::<SystemTime>("decimal").unwrap(),
        Some(UNIX_EPOCH + Duration::from_millis(3_000))
    );
}

#[test]
fn test_structured_value_read_as_timestamp_is_illegal_state() {
    let claims = ClaimsMap::new()
        .with("json", serde_json::json!({"at": 1}))
        .with("flag", true)
        .with("nan", f64::NAN);

    for name in ["json", "flag", "nan"] {
        assert!(
            matches!(
                claims.get::<DateTime<Utc>>(name),
                Err(PasetoError::IllegalState { .. })
            ),
            "{name}"
        );
    }
}

#[test]
fn test_reserved_dates_accept_epoch_millis() {
    let payload = PayloadClaims::from(
        ClaimsMap::new()
            .with(registered::EXPIRATION, 1_609_459_200_000_i64)
            .with(registered::NOT_BEFORE, 1_609_459_200_000.0_f64)
            .with(registered::ISSUED_AT, "2021-01-01T00:00:00Z"),
    );

    let expected = instant("2021-01-01T00:00:00Z");
    assert_eq!(payload.expiration().unwrap(), Some(expected));
    assert_eq!(payload.not_before().unwrap(), Some(expected));
    assert_eq!(payload.issued_at().unwrap(), Some(expected));
}

#[test]
fn test_reserved_dates_reject_structured_values() {
    let payload = PayloadClaims::from(
        ClaimsMap::new()
            .with(registered::EXPIRATION, true)
            .with(registered::NOT_BEFORE, "tomorrow"),
    );

    assert!(matches!(
        payload.expiration(),
        Err(PasetoError::IllegalState { .. })
    ));
    assert!(matches!(
        payload.not_before(),
        Err(PasetoError::Parse { .. })
    ));
    assert_eq!(payload.issued_at().unwrap(), None);
}

#[test]
fn test_reserved_date_raw_read_is_untouched() {
    let payload = PayloadClaims::from(ClaimsMap::new().with(registered::EXPIRATION, 42_i64));
    assert_eq!(payload.get::<i64>(registered::EXPIRATION).unwrap(), Some(42));
}

#[test]
fn test_registered_text_accessors() {
    let payload = PayloadClaims::from(
        ClaimsMap::new()
            .with(registered::ISSUER, "issuer")
            .with(registered::SUBJECT, "subject")
            .with(registered::AUDIENCE, "audience")
            .with(registered::TOKEN_ID, "id-1"),
    );

    assert_eq!(payload.issuer().unwrap().as_deref(), Some("issuer"));
    assert_eq!(payload.subject().unwrap().as_deref(), Some("subject"));
    assert_eq!(payload.audience().unwrap().as_deref(), Some("audience"));
    assert_eq!(payload.token_id().unwrap().as_deref(), Some("id-1"));
}

#[test]
fn test_type_mismatch_message_names_both_types_and_hint() {
    let claims = ClaimsMap::new().with("flag", true);
    let err = claims.get::<i64>("flag").unwrap_err();
    let message = err.to_string();

    assert!(message.contains("'boolean'"), "{message}");
    assert!(message.contains("'long'"), "{message}");
    assert!(message.contains("string, instant, date, long, int, short and byte"));
    assert!(message.contains("deserializer"));
}

#[test]
fn test_custom_claim_downcasts() {
    #[derive(Debug, PartialEq)]
    struct Role(&'static str);

    let claims = ClaimsMap::new().with("role", CustomClaim::new(Role("admin")));

    let role = claims.get_custom::<Role>("role").unwrap().unwrap();
    assert_eq!(*role, Role("admin"));
    assert!(matches!(
        claims.get_custom::<String>("role"),
        Err(PasetoError::TypeMismatch { .. })
    ));
    assert!(matches!(
        claims.get::<String>("role"),
        Err(PasetoError::TypeMismatch { .. })
    ));
}

#[test]
fn test_custom_claims_compare_by_identity() {
    let shared = CustomClaim::new(7_u32);
    let same = ClaimValue::Custom(shared.clone());
    let other = ClaimValue::Custom(CustomClaim::new(7_u32));

    assert_eq!(ClaimValue::Custom(shared), same);
    assert_ne!(same, other);
}

#[test]
fn test_get_deserialized_reads_json_claims() {
    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Scope {
        read: bool,
        write: bool,
    }

    let claims = ClaimsMap::new().with("scope", serde_json::json!({"read": true, "write": false}));
    assert_eq!(
        claims.get_deserialized::<Scope>("scope").unwrap(),
        Some(Scope {
            read: true,
            write: false
        })
    );
    assert!(matches!(
        claims.get_deserialized::<u8>("scope"),
        Err(PasetoError::Serialization(_))
    ));
}

#[test]
fn test_container_equality_ignores_order() {
    let a = ClaimsMap::new().with("a", 1_i32).with("b", "two");
    let b = ClaimsMap::new().with("b", "two").with("a", 1_i32);

    assert_eq!(a, b);
    assert_eq!(a.clone().freeze(), b.clone().freeze());
    assert_ne!(a, ClaimsMap::new().with("a", 2_i32).with("b", "two"));

    let state = RandomState::new();
    assert_eq!(state.hash_one(&a), state.hash_one(&b));
    assert_eq!(
        state.hash_one(a.clone().freeze()),
        state.hash_one(b.clone().freeze())
    );
}

#[test]
fn test_display_keeps_insertion_order() {
    let claims = ClaimsMap::new().with("z", 1_i32).with("a", "x").with("m", true);
    assert_eq!(claims.to_string(), "{z=1, a=x, m=true}");
    assert_eq!(claims.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
}

#[test]
fn test_frozen_claims_are_independent_of_thawed_copy() {
    let frozen = ClaimsMap::new().with("a", 1_i32).freeze();
    let mut thawed = frozen.thaw();
    thawed.insert("b", 2_i32);
    thawed.remove("a");

    assert_eq!(frozen.len(), 1);
    assert!(frozen.contains_key("a"));
    assert_eq!(thawed.keys().collect::<Vec<_>>(), ["b"]);
}

#[test]
fn test_put_all_and_extend_apply_removals() {
    let mut claims = ClaimsMap::new().with("a", 1_i32).with("b", 2_i32);
    claims.put_all([("a", None), ("c", Some(ClaimValue::from(3_i32)))]);
    claims.extend([("b", None::<ClaimValue>)]);

    assert_eq!(claims.keys().collect::<Vec<_>>(), ["c"]);
}
