use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::claims::Claims;
use crate::id::UserId;

const ACCESS_AUDIENCE: &str = "hammergen-access";
const RESET_AUDIENCE: &str = "hammergen-reset";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("tokens are only issued to users")]
    NotAUser,
    #[error("token lifetime out of range")]
    Lifetime,
}

/// Payload of a normal bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    aud: String,
    exp: i64,
    iat: i64,
    adm: bool,
    shrd_acc: Vec<String>,
}

/// Payload of a password-reset token. A different audience and a `jti` keep it
/// from ever verifying as an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    aud: String,
    exp: i64,
    iat: i64,
    jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// A verified, not yet redeemed reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub user_id: UserId,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, reset_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            reset_ttl,
        }
    }

    fn expiry(ttl: Duration) -> Result<(i64, i64), TokenError> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::Lifetime)?;
        let exp = now.checked_add_signed(ttl).ok_or(TokenError::Lifetime)?;
        Ok((now.timestamp(), exp.timestamp()))
    }

    fn validation(audience: &str) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        validation
    }

    fn sign<T: Serialize>(&self, claims: &T, exp: i64) -> Result<IssuedToken, TokenError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        Ok(IssuedToken {
            token,
            expires_at: DateTime::from_timestamp(exp, 0).ok_or(TokenError::Lifetime)?,
        })
    }

    pub fn issue_access(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        let user_id = claims.user_id().ok_or(TokenError::NotAUser)?;
        let (iat, exp) = Self::expiry(self.access_ttl)?;
        let payload = AccessClaims {
            sub: user_id.to_string(),
            aud: ACCESS_AUDIENCE.to_string(),
            exp,
            iat,
            adm: claims.is_admin(),
            shrd_acc: claims
                .shared_accounts()
                .iter()
                .map(|id| id.to_string())
                .collect(),
        };
        self.sign(&payload, exp)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Self::validation(ACCESS_AUDIENCE))?;
        let claims = data.claims;
        Ok(Claims::user(
            UserId::from(claims.sub),
            claims.adm,
            claims.shrd_acc.into_iter().map(UserId::from).collect(),
        ))
    }

    pub fn issue_reset(&self, user_id: &UserId) -> Result<IssuedToken, TokenError> {
        let (iat, exp) = Self::expiry(self.reset_ttl)?;
        let payload = ResetClaims {
            sub: user_id.to_string(),
            aud: RESET_AUDIENCE.to_string(),
            exp,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&payload, exp)
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetGrant, TokenError> {
        let data = decode::<ResetClaims>(token, &self.decoding, &Self::validation(RESET_AUDIENCE))?;
        let claims = data.claims;
        Ok(ResetGrant {
            user_id: UserId::from(claims.sub),
            jti: claims.jti,
            expires_at: DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Lifetime)?,
        })
    }
}
