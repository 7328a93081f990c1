//! `salesdesk-auth` — authentication/authorization boundary.
//!
//! Token issuance lives outside this workspace; this crate only verifies a
//! bearer token into an [`Actor`] and decides whether that actor owns a
//! resource. It is decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod token;

pub use authorize::{authorize, check, AuthzError, Decision};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use principal::Actor;
pub use token::{Hs256JwtValidator, JwtValidator};
