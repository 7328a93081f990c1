//! Bearer token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{validate_claims, JwtClaims, TokenValidationError};

/// Verifies a raw bearer token and returns its validated claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HMAC-SHA256 token verifier.
///
/// The time window is checked by [`validate_claims`] against our own
/// `issued_at`/`expires_at` claims, so the library's `exp` handling is off.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use salesdesk_core::SalespersonId;

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_claims() -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: SalespersonId::new(),
            email: Some("ana@example.com".to_string()),
            name: Some("Ana".to_string()),
            issued_at: now - Duration::seconds(1),
            expires_at: now + Duration::hours(24),
        }
    }

    #[test]
    fn round_trips_a_signed_token() {
        let claims = fresh_claims();
        let token = mint("s3cret", &claims);

        let validator = Hs256JwtValidator::new("s3cret");
        let decoded = validator.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = mint("other", &fresh_claims());

        let validator = Hs256JwtValidator::new("s3cret");
        let err = validator.validate(&token, Utc::now()).unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }

    #[test]
    fn rejects_expired_tokens_after_signature_check() {
        let claims = fresh_claims();
        let token = mint("s3cret", &claims);

        let validator = Hs256JwtValidator::new("s3cret");
        let later = claims.expires_at + Duration::seconds(1);
        assert_eq!(
            validator.validate(&token, later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_garbage() {
        let validator = Hs256JwtValidator::new("s3cret");
        assert!(validator.validate("not.a.token", Utc::now()).is_err());
    }
}
