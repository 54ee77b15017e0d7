use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token asserts ownership of.
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies the signed, expiring credentials that gate protected
/// routes. Built once from config; the secret is never read from the
/// environment after startup.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        // Pinning the algorithm rejects tokens signed with anything other
        // than HS256, including the classic alg-confusion tricks.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Sign a token for `user_id` expiring `ttl` from now. Signing itself
    /// failing is an internal error, not a client one.
    pub fn issue(&self, user_id: i32) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("failed to sign token: {e}"))?;
        Ok(token)
    }

    /// Verify signature and expiry, returning the embedded subject id.
    pub fn verify(&self, token: &str) -> Result<i32, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            }
        })?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_before_expiry() {
        let issuer = TokenIssuer::new("secret", 3600);
        let token = issuer.issue(7).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), 7);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let issuer = TokenIssuer::new("secret", -60);
        let token = issuer.issue(7).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = TokenIssuer::new("secret", 3600);
        let other = TokenIssuer::new("another-secret", 3600);
        let token = other.issue(7).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_other_algorithm_is_rejected() {
        let issuer = TokenIssuer::new("secret", 3600);
        let claims = Claims {
            sub: 7,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::seconds(3600)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn repeated_issues_differ_but_both_verify() {
        let issuer = TokenIssuer::new("secret", 3600);
        let first = issuer.issue(7).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = issuer.issue(7).unwrap();
        assert_ne!(first, second);
        assert_eq!(issuer.verify(&first).unwrap(), 7);
        assert_eq!(issuer.verify(&second).unwrap(), 7);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", 3600);
        assert!(matches!(
            issuer.verify("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}
