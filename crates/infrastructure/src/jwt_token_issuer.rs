//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use launchpad_application::{IssuedToken, TokenClaims, TokenIssuer, UserRecord};
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{UserId, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest accepted signing secret, in bytes.
pub const JWT_SECRET_MIN_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: UserRole,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Token issuer signing JWTs with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    /// Creates an issuer. The secret must be at least
    /// [`JWT_SECRET_MIN_LENGTH`] bytes and the ttl positive and small enough
    /// for expiry timestamps to stay representable.
    pub fn new(secret: &str, ttl_seconds: i64) -> AppResult<Self> {
        if secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT secret must be at least {JWT_SECRET_MIN_LENGTH} characters"
            )));
        }
        if ttl_seconds <= 0 {
            return Err(AppError::Validation(
                "token ttl must be positive".to_owned(),
            ));
        }

        let ttl = Duration::try_seconds(ttl_seconds)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ttl_out_of_range(ttl_seconds))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &UserRecord) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ttl_out_of_range(self.ttl.num_seconds()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|error| {
            match error.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("token has expired".to_owned()),
                _ => AppError::Unauthorized("invalid token".to_owned()),
            }
        })?;
        let claims = data.claims;

        Ok(TokenClaims {
            user_id: UserId::parse(&claims.sub)?,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }
}

fn ttl_out_of_range(ttl_seconds: i64) -> AppError {
    AppError::Validation(format!("token ttl of {ttl_seconds} seconds is out of range"))
}

fn timestamp(seconds: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::Unauthorized("token timestamp is out of range".to_owned()))
}
