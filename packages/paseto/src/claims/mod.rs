//! Token claims: raw values, typed reads, payload and footer containers

pub mod converter;
pub mod footer;
pub mod json;
pub mod map;
pub mod payload;
pub mod value;

pub use converter::ClaimConverter;
pub use footer::FooterClaims;
pub use json::{ClaimsDeserializer, ClaimsSerializer, JsonClaims};
pub use map::{ClaimRead, Claims, ClaimsMap, FromClaim};
pub use payload::{PayloadClaims, registered};
pub use value::{ClaimType, ClaimValue, CustomClaim};
