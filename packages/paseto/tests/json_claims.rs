//! Tests for the JSON claims codec

use chrono::{DateTime, Utc};
use cryypt_paseto::*;
use serde::Deserialize;

#[test]
fn test_numbers_map_to_int_long_and_decimal() {
    let claims = JsonClaims::new()
        .deserialize(br#"{"small": 30000, "big": 10000000000, "pi": 3.5}"#)
        .unwrap();

    assert_eq!(claims.claim("small"), Some(&ClaimValue::Int(30000)));
    assert_eq!(claims.claim("big"), Some(&ClaimValue::Long(10_000_000_000)));
    assert_eq!(claims.claim("pi"), Some(&ClaimValue::Decimal(3.5)));
    assert_eq!(claims.get::<i16>("small").unwrap(), Some(30000));
}

#[test]
fn test_null_claims_are_dropped() {
    let claims = JsonClaims::new()
        .deserialize(br#"{"sub": "alice", "nbf": null}"#)
        .unwrap();

    assert_eq!(claims.len(), 1);
    assert!(!claims.contains_key("nbf"));
}

#[test]
fn test_nested_values_stay_json() {
    let claims = JsonClaims::new()
        .deserialize(br#"{"roles": ["a", "b"], "ctx": {"ip": "::1"}}"#)
        .unwrap();

    assert_eq!(
        claims.get::<serde_json::Value>("roles").unwrap(),
        Some(serde_json::json!(["a", "b"]))
    );
    assert_eq!(
        claims.get_deserialized::<Vec<String>>("roles").unwrap(),
        Some(vec!["a".to_string(), "b".to_string()])
    );
}

#[test]
fn test_non_object_payload_is_rejected() {
    assert!(matches!(
        JsonClaims::new().deserialize(b"[1, 2]"),
        Err(PasetoError::Serialization(_))
    ));
    assert!(matches!(
        JsonClaims::new().deserialize(b"{not json"),
        Err(PasetoError::Serialization(_))
    ));
}

#[test]
fn test_materialized_claims_come_back_as_custom() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Scope {
        read: bool,
    }

    let codec = JsonClaims::new().materialize::<Scope>("scope");
    let claims = codec
        .deserialize(br#"{"scope": {"read": true}, "other": {"read": false}}"#)
        .unwrap();

    let scope = claims.get_custom::<Scope>("scope").unwrap().unwrap();
    assert_eq!(*scope, Scope { read: true });
    assert!(matches!(claims.claim("other"), Some(ClaimValue::Json(_))));

    assert!(matches!(
        codec.deserialize(br#"{"scope": 5}"#),
        Err(PasetoError::Serialization(_))
    ));
}

#[test]
fn test_serialize_keeps_order_and_formats_timestamps() {
    let at: DateTime<Utc> = "2021-01-01T00:00:00Z".parse().unwrap();
    let claims = ClaimsMap::new()
        .with("sub", "alice")
        .with("exp", at)
        .with("n", 5_i16)
        .freeze();

    let bytes = JsonClaims::new().serialize(&claims).unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"sub":"alice","exp":"2021-01-01T00:00:00Z","n":5}"#
    );

    let parsed = PayloadClaims::from(JsonClaims::new().deserialize(&bytes).unwrap());
    assert_eq!(parsed.expiration().unwrap(), Some(at));
    assert_eq!(parsed.subject().unwrap().as_deref(), Some("alice"));
}

#[test]
fn test_deserialize_keeps_document_order() {
    let bytes = br#"{"sub":"alice","exp":1609459200000,"aud":"api","iat":"2021-01-01T00:00:00Z"}"#;
    let claims = JsonClaims::new().deserialize(bytes).unwrap();

    assert_eq!(claims.keys().collect::<Vec<_>>(), ["sub", "exp", "aud", "iat"]);
    assert_eq!(JsonClaims::new().serialize(&claims).unwrap(), bytes.to_vec());

    let payload = PayloadClaims::from(claims);
    let at: DateTime<Utc> = "2021-01-01T00:00:00Z".parse().unwrap();
    assert_eq!(payload.expiration().unwrap(), Some(at));
    assert_eq!(payload.issued_at().unwrap(), Some(at));
}

#[test]
fn test_custom_claims_do_not_serialize() {
    let claims = ClaimsMap::new()
        .with("blob", CustomClaim::new(vec![1_u8, 2, 3]))
        .freeze();
    assert!(matches!(
        JsonClaims::new().serialize(&claims),
        Err(PasetoError::Serialization(_))
    ));
}
