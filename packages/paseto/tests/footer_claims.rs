//! Tests for footer claims construction and raw value inference

use cryypt_paseto::*;

#[test]
fn test_empty_claims_footer_has_empty_value() {
    let footer = FooterClaims::from_claims(Claims::empty());
    assert_eq!(footer.value(), Some(""));
    assert!(footer.claims().is_empty());

    assert_eq!(FooterClaims::default().value(), Some(""));
    assert_eq!(FooterClaims::from(ClaimsMap::new()).value(), Some(""));
}

#[test]
fn test_structured_footer_has_no_value() {
    let footer = FooterClaims::from_claims(ClaimsMap::new().with(registered::KEY_ID, "key-1"));
    assert_eq!(footer.value(), None);
    assert_eq!(footer.key_id().unwrap().as_deref(), Some("key-1"));
    assert_eq!(footer.wrapped_key().unwrap(), None);
}

#[test]
fn test_verbatim_construction_infers_nothing() {
    let footer = FooterClaims::new(None, None);
    assert!(footer.claims().is_empty());
    assert_eq!(footer.value(), None);

    let claims = ClaimsMap::new().with(registered::WRAPPED_KEY, "k3.local-wrap.pie.abc").freeze();
    let footer = FooterClaims::new(Some(claims.clone()), Some("raw".to_string()));
    assert_eq!(footer.value(), Some("raw"));
    assert_eq!(footer.claims(), &claims);
    assert_eq!(
        footer.wrapped_key().unwrap().as_deref(),
        Some("k3.local-wrap.pie.abc")
    );
}

#[test]
fn test_opaque_footer() {
    let footer = FooterClaims::from("opaque footer");
    assert_eq!(footer.value(), Some("opaque footer"));
    assert!(footer.is_empty());
    assert_eq!(footer.key_id().unwrap(), None);
}

#[test]
fn test_footer_equality_covers_claims_and_value() {
    let claims = || ClaimsMap::new().with(registered::KEY_ID, "key-1");

    assert_eq!(FooterClaims::from(claims()), FooterClaims::from(claims()));
    assert_ne!(
        FooterClaims::from(claims()),
        FooterClaims::new(Some(claims().freeze()), Some(String::new()))
    );
    assert_ne!(FooterClaims::from_value("a"), FooterClaims::from_value("b"));
}

#[test]
fn test_footer_key_id_of_wrong_type_is_mismatch() {
    let footer = FooterClaims::from(ClaimsMap::new().with(registered::KEY_ID, 7_i32));
    assert!(matches!(
        footer.key_id(),
        Err(PasetoError::TypeMismatch { .. })
    ));
}
