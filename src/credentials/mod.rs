//! Password hashing, token issue and verification, and single-use reset tokens.

mod ledger;
mod password;
mod token;

use std::sync::Arc;

pub use ledger::{MemoryResetLedger, ResetTokenLedger};
pub use password::PasswordHasher;
pub use token::{IssuedToken, ResetGrant, TokenError, TokenService};

use crate::claims::Claims;
use crate::error::{ServiceError, ServiceResult};
use crate::id::UserId;

pub struct CredentialManager {
    hasher: PasswordHasher,
    tokens: TokenService,
    ledger: Arc<dyn ResetTokenLedger>,
}

impl CredentialManager {
    pub fn new(hasher: PasswordHasher, tokens: TokenService, ledger: Arc<dyn ResetTokenLedger>) -> Self {
        Self {
            hasher,
            tokens,
            ledger,
        }
    }

    pub async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        self.hasher.hash(password).await
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        self.hasher.verify(password, hash).await
    }

    pub fn issue_access(&self, claims: &Claims) -> ServiceResult<IssuedToken> {
        Ok(self.tokens.issue_access(claims)?)
    }

    /// Bearer token to claims. Any failure is `Unauthorized`.
    pub fn verify_access(&self, token: &str) -> ServiceResult<Claims> {
        Ok(self.tokens.verify_access(token)?)
    }

    pub fn issue_reset(&self, user_id: &UserId) -> ServiceResult<IssuedToken> {
        Ok(self.tokens.issue_reset(user_id)?)
    }

    pub fn verify_reset(&self, token: &str) -> ServiceResult<ResetGrant> {
        Ok(self.tokens.verify_reset(token)?)
    }

    /// Burns the grant. A grant that was already redeemed is `Unauthorized`.
    pub async fn redeem(&self, grant: &ResetGrant) -> ServiceResult<()> {
        if self.ledger.consume(&grant.jti, grant.expires_at).await? {
            Ok(())
        } else {
            tracing::warn!(user_id = %grant.user_id, "reset token replayed");
            Err(ServiceError::Unauthorized)
        }
    }
}
