//! Authenticated identity attached to every request.

use crate::error::{ServiceError, ServiceResult};
use crate::id::UserId;

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No bearer token was presented.
    Anonymous,
    /// A verified user token.
    User(UserId),
    /// In-process bootstrap work such as seeding canonical content.
    System,
}

/// Identity plus the privileges copied into the access token at issue time.
///
/// The fields are private so that an anonymous value can never carry the admin
/// flag or a shared-accounts list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    identity: Identity,
    admin: bool,
    shared_accounts: Vec<UserId>,
}

impl Claims {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            admin: false,
            shared_accounts: Vec::new(),
        }
    }

    pub fn user(id: UserId, admin: bool, shared_accounts: Vec<UserId>) -> Self {
        Self {
            identity: Identity::User(id),
            admin,
            shared_accounts,
        }
    }

    pub fn system() -> Self {
        Self {
            identity: Identity::System,
            admin: true,
            shared_accounts: Vec::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match &self.identity {
            Identity::User(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.identity, Identity::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn shared_accounts(&self) -> &[UserId] {
        &self.shared_accounts
    }

    /// Rejects anonymous callers. Used as the first step of every mutation.
    pub fn ensure_authenticated(&self) -> ServiceResult<()> {
        if self.is_anonymous() {
            return Err(ServiceError::Unauthorized);
        }
        Ok(())
    }

    /// The caller's user id, or `Unauthorized` for anyone who is not a user.
    pub fn require_user(&self) -> ServiceResult<&UserId> {
        self.user_id().ok_or(ServiceError::Unauthorized)
    }

    /// Self-service check for user-scoped operations. Admins get no bypass.
    pub fn require_self(&self, target: &UserId) -> ServiceResult<&UserId> {
        let id = self.require_user()?;
        if id != target {
            return Err(ServiceError::Unauthorized);
        }
        Ok(id)
    }

    /// Admin-only operations on user accounts.
    pub fn require_admin_user(&self) -> ServiceResult<&UserId> {
        let id = self.require_user()?;
        if !self.admin {
            return Err(ServiceError::Unauthorized);
        }
        Ok(id)
    }
}
