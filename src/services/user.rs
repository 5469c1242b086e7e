use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::claims::Claims;
use crate::credentials::CredentialManager;
use crate::database::{UserKey, UserRecord, UserRepository};
use crate::error::{ServiceError, ServiceResult};
use crate::external::{Email, Mailer};
use crate::id::UserId;
use crate::ownership::Owner;
use crate::validation::Validator;

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// User-editable profile. Shared accounts are referenced by username.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub shared_accounts: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ClaimsUpdate {
    pub admin: bool,
}

/// What callers see of an account. No password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub admin: bool,
    pub shared_accounts: Vec<String>,
    pub created_on: DateTime<Utc>,
    pub last_auth_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: UserView,
    pub claims: Claims,
}

/// Fixed development account.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub admin: bool,
    pub shared_accounts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResetMailSettings {
    pub front_end_url: String,
    pub from_address: String,
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    credentials: Arc<CredentialManager>,
    mailer: Arc<dyn Mailer>,
    validator: Arc<Validator>,
    reset_mail: ResetMailSettings,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        credentials: Arc<CredentialManager>,
        mailer: Arc<dyn Mailer>,
        validator: Arc<Validator>,
        reset_mail: ResetMailSettings,
    ) -> Self {
        Self {
            repo,
            credentials,
            mailer,
            validator,
            reset_mail,
        }
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub async fn create(&self, credentials: Credentials, profile: Profile) -> ServiceResult<UserView> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(ServiceError::invalid("username and password are required"));
        }
        self.validator.validate_username(&credentials.username)?;
        self.validator.validate_password(&credentials.password)?;
        self.validator.validate_shared_accounts(&profile.shared_accounts)?;

        if self.exists(&credentials.username).await? {
            return Err(ServiceError::AlreadyExists);
        }

        let password_hash = self.credentials.hash_password(&credentials.password).await?;
        let shared_account_ids = self.resolve_usernames(&profile.shared_accounts).await?;
        let now = Utc::now();
        let stored = self
            .repo
            .insert(UserRecord {
                id: UserId::generate(),
                username: credentials.username,
                password_hash,
                admin: false,
                shared_account_ids,
                created_on: now,
                last_auth_on: now,
            })
            .await?;

        info!(user_id = %stored.id, "user created");
        self.view(stored).await
    }

    pub async fn exists(&self, username: &str) -> ServiceResult<bool> {
        Ok(self.repo.find(UserKey::Username(username)).await?.is_some())
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<Authenticated> {
        let mut user = self
            .repo
            .find(UserKey::Username(username))
            .await?
            .ok_or(ServiceError::NotFound)?;

        if !self
            .credentials
            .verify_password(password, &user.password_hash)
            .await?
        {
            debug!(user_id = %user.id, "password mismatch");
            return Err(ServiceError::IncorrectPassword);
        }

        user.last_auth_on = Utc::now();
        let user = self.repo.update(user).await?;
        let shared = self.repo.find_many_by_ids(&user.shared_account_ids).await?;
        let claims = Claims::user(
            user.id.clone(),
            user.admin,
            shared.iter().map(|u| u.id.clone()).collect(),
        );
        Ok(Authenticated {
            user: to_view(user, &shared),
            claims,
        })
    }

    pub async fn get(&self, claims: &Claims, id: &UserId) -> ServiceResult<UserView> {
        claims.require_self(id)?;
        let user = self.load(id).await?;
        self.view(user).await
    }

    pub async fn update(&self, claims: &Claims, id: &UserId, profile: Profile) -> ServiceResult<UserView> {
        claims.require_self(id)?;
        self.validator.validate_shared_accounts(&profile.shared_accounts)?;

        let mut user = self.load(id).await?;
        user.shared_account_ids = self.resolve_usernames(&profile.shared_accounts).await?;
        let user = self.repo.update(user).await?;
        self.view(user).await
    }

    /// Empty fields in `new` leave the stored value unchanged.
    pub async fn update_credentials(
        &self,
        claims: &Claims,
        id: &UserId,
        current_password: &str,
        new: Credentials,
    ) -> ServiceResult<UserView> {
        claims.require_self(id)?;
        if !new.username.is_empty() {
            self.validator.validate_username(&new.username)?;
        }
        if !new.password.is_empty() {
            self.validator.validate_password(&new.password)?;
        }

        let mut user = self.load(id).await?;
        if !self
            .credentials
            .verify_password(current_password, &user.password_hash)
            .await?
        {
            return Err(ServiceError::IncorrectPassword);
        }

        if !new.username.is_empty() && new.username != user.username {
            if self.exists(&new.username).await? {
                return Err(ServiceError::AlreadyExists);
            }
            user.username = new.username;
        }
        if !new.password.is_empty() {
            user.password_hash = self.credentials.hash_password(&new.password).await?;
        }

        let user = self.repo.update(user).await?;
        info!(user_id = %user.id, "credentials updated");
        self.view(user).await
    }

    pub async fn update_claims(
        &self,
        claims: &Claims,
        id: &UserId,
        update: ClaimsUpdate,
    ) -> ServiceResult<UserView> {
        let caller = claims.require_admin_user()?;
        let mut user = self.load(id).await?;
        user.admin = update.admin;
        let user = self.repo.update(user).await?;
        info!(user_id = %user.id, admin = update.admin, by = %caller, "admin flag changed");
        self.view(user).await
    }

    pub async fn delete(&self, claims: &Claims, id: &UserId) -> ServiceResult<()> {
        claims.require_self(id)?;
        self.repo.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub async fn list(&self, claims: &Claims) -> ServiceResult<Vec<UserView>> {
        claims.require_admin_user()?;
        let users = self.repo.list().await?;
        let names: HashMap<UserId, String> = users
            .iter()
            .map(|u| (u.id.clone(), u.username.clone()))
            .collect();
        Ok(users
            .into_iter()
            .map(|user| {
                let shared_accounts = user
                    .shared_account_ids
                    .iter()
                    .filter_map(|id| names.get(id).cloned())
                    .collect();
                UserView {
                    shared_accounts,
                    ..to_view(user, &[])
                }
            })
            .collect())
    }

    /// Mails a reset link. Unknown usernames succeed silently.
    pub async fn send_reset_password(&self, username: &str) -> ServiceResult<()> {
        let Some(user) = self.repo.find(UserKey::Username(username)).await? else {
            debug!("reset requested for unknown username");
            return Ok(());
        };

        let issued = self.credentials.issue_reset(&user.id)?;
        let link = format!(
            "{}/resetPassword/{}",
            self.reset_mail.front_end_url.trim_end_matches('/'),
            issued.token
        );
        let email = Email {
            from_address: self.reset_mail.from_address.clone(),
            to_address: user.username.clone(),
            subject: "Hammergen password reset".to_string(),
            content: format!(
                "Use the link below to reset your password. It expires at {}.\n\n{link}",
                issued.expires_at.to_rfc3339()
            ),
        };
        self.mailer.send(email).await.map_err(ServiceError::internal)?;

        info!(user_id = %user.id, "password reset mail sent");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ServiceResult<()> {
        let grant = self.credentials.verify_reset(token)?;
        self.validator.validate_password(password)?;

        let mut user = self.load(&grant.user_id).await?;
        let password_hash = self.credentials.hash_password(password).await?;
        self.credentials.redeem(&grant).await?;

        user.password_hash = password_hash;
        if let Err(e) = self.repo.update(user).await {
            // The jti stays spent; the user has to request a new link.
            warn!(user_id = %grant.user_id, "reset token consumed but password not stored: {}", e);
            return Err(e.into());
        }
        info!(user_id = %grant.user_id, "password reset");
        Ok(())
    }

    /// Inserts fixed accounts, then resolves their shared accounts. Accounts
    /// that already exist are left untouched. An id equal to the canonical
    /// owner is rejected before anything is written.
    pub async fn seed(&self, seeds: Vec<SeedUser>) -> ServiceResult<usize> {
        if let Some(seed) = seeds
            .iter()
            .find(|s| Owner::from(s.id.to_string()) == Owner::Canonical)
        {
            return Err(ServiceError::invalid(format!("reserved user id {}", seed.id)));
        }

        let mut inserted = Vec::new();
        for seed in &seeds {
            if self.repo.find(UserKey::Id(&seed.id)).await?.is_some() {
                continue;
            }
            let now = Utc::now();
            let record = UserRecord {
                id: seed.id.clone(),
                username: seed.username.clone(),
                password_hash: self.credentials.hash_password(&seed.password).await?,
                admin: seed.admin,
                shared_account_ids: Vec::new(),
                created_on: now,
                last_auth_on: now,
            };
            inserted.push(self.repo.insert(record).await?);
        }

        for mut user in inserted.iter().cloned() {
            let Some(seed) = seeds.iter().find(|s| s.id == user.id) else {
                continue;
            };
            if seed.shared_accounts.is_empty() {
                continue;
            }
            user.shared_account_ids = self.resolve_usernames(&seed.shared_accounts).await?;
            self.repo.update(user).await?;
        }
        Ok(inserted.len())
    }

    async fn load(&self, id: &UserId) -> ServiceResult<UserRecord> {
        self.repo
            .find(UserKey::Id(id))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    async fn resolve_usernames(&self, usernames: &[String]) -> ServiceResult<Vec<UserId>> {
        let found = self.repo.find_many_by_usernames(usernames).await?;
        Ok(found.into_iter().map(|u| u.id).collect())
    }

    async fn view(&self, user: UserRecord) -> ServiceResult<UserView> {
        let shared = self.repo.find_many_by_ids(&user.shared_account_ids).await?;
        Ok(to_view(user, &shared))
    }
}

/// Public view; `shared` holds the shared accounts that still exist.
fn to_view(user: UserRecord, shared: &[UserRecord]) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        admin: user.admin,
        shared_accounts: shared.iter().map(|u| u.username.clone()).collect(),
        created_on: user.created_on,
        last_auth_on: user.last_auth_on,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::database::{MemoryUserRepository, StoreError, StoreResult};
    use crate::testing::{RecordingMailer, TestContext, creds, credential_manager};

    #[tokio::test]
    async fn create_returns_public_view() {
        let ctx = TestContext::new();
        let view = ctx
            .users
            .create(creds("alice@example.com", "secret1"), Profile::default())
            .await
            .unwrap();
        assert_eq!(view.username, "alice@example.com");
        assert!(!view.admin);
        assert!(view.shared_accounts.is_empty());
        assert!(ctx.users.exists("alice@example.com").await.unwrap());
        assert!(!ctx.users.exists("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn create_rejects_missing_or_invalid_fields() {
        let ctx = TestContext::new();
        for (username, password) in [
            ("", "secret1"),
            ("alice@example.com", ""),
            ("not-an-email", "secret1"),
            ("alice@example.com", "123"),
        ] {
            let err = ctx
                .users
                .create(creds(username, password), Profile::default())
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArguments(_)), "{username}/{password}");
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_already_exists_and_first_is_untouched() {
        let ctx = TestContext::new();
        let first = ctx
            .users
            .create(creds("alice@example.com", "secret1"), Profile::default())
            .await
            .unwrap();
        let err = ctx
            .users
            .create(creds("alice@example.com", "other-pass"), Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists));

        let auth = ctx
            .users
            .authenticate("alice@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(auth.user.id, first.id);
    }

    #[tokio::test]
    async fn authenticate_errors_and_claims() {
        let ctx = TestContext::new();
        ctx.users
            .create(creds("bob@example.com", "secret1"), Profile::default())
            .await
            .unwrap();
        let alice = ctx
            .users
            .create(
                creds("alice@example.com", "secret1"),
                Profile {
                    shared_accounts: vec!["bob@example.com".into(), "ghost@example.com".into()],
                },
            )
            .await
            .unwrap();
        assert_eq!(alice.shared_accounts, ["bob@example.com"]);

        assert!(matches!(
            ctx.users.authenticate("nobody@example.com", "x").await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            ctx.users.authenticate("alice@example.com", "wrong-pass").await,
            Err(ServiceError::IncorrectPassword)
        ));

        let auth = ctx
            .users
            .authenticate("alice@example.com", "secret1")
            .await
            .unwrap();
        assert!(auth.user.last_auth_on >= alice.last_auth_on);
        assert_eq!(auth.claims.user_id(), Some(&alice.id));
        assert_eq!(auth.claims.shared_accounts().len(), 1);
    }

    #[tokio::test]
    async fn self_service_only_even_for_admins() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let admin = ctx.admin("admin@example.com").await;

        assert!(matches!(
            ctx.users.get(&admin, alice.user_id().unwrap()).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.users.delete(&admin, alice.user_id().unwrap()).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.users
                .get(&Claims::anonymous(), alice.user_id().unwrap())
                .await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(ctx.users.get(&alice, alice.user_id().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn shared_accounts_are_pruned_after_delete() {
        let ctx = TestContext::new();
        let bob = ctx.user("bob@example.com").await;
        let alice = ctx.user("alice@example.com").await;
        let alice_id = alice.user_id().unwrap();

        let view = ctx
            .users
            .update(
                &alice,
                alice_id,
                Profile {
                    shared_accounts: vec!["bob@example.com".into()],
                },
            )
            .await
            .unwrap();
        assert_eq!(view.shared_accounts, ["bob@example.com"]);

        ctx.users.delete(&bob, bob.user_id().unwrap()).await.unwrap();
        let view = ctx.users.get(&alice, alice_id).await.unwrap();
        assert!(view.shared_accounts.is_empty());
    }

    #[tokio::test]
    async fn update_credentials_checks_current_password() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let id = alice.user_id().unwrap();
        ctx.user("bob@example.com").await;

        assert!(matches!(
            ctx.users
                .update_credentials(&alice, id, "wrong", creds("", "new-secret"))
                .await,
            Err(ServiceError::IncorrectPassword)
        ));
        assert!(matches!(
            ctx.users
                .update_credentials(&alice, id, TestContext::PASSWORD, creds("bob@example.com", ""))
                .await,
            Err(ServiceError::AlreadyExists)
        ));

        let view = ctx
            .users
            .update_credentials(&alice, id, TestContext::PASSWORD, creds("", "new-secret"))
            .await
            .unwrap();
        assert_eq!(view.username, "alice@example.com");
        assert!(ctx.users.authenticate("alice@example.com", "new-secret").await.is_ok());
    }

    #[tokio::test]
    async fn claims_and_list_require_admin() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let admin = ctx.admin("admin@example.com").await;
        let alice_id = alice.user_id().unwrap();

        assert!(matches!(
            ctx.users
                .update_claims(&alice, alice_id, ClaimsUpdate { admin: true })
                .await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            ctx.users.list(&alice).await,
            Err(ServiceError::Unauthorized)
        ));

        let view = ctx
            .users
            .update_claims(&admin, alice_id, ClaimsUpdate { admin: true })
            .await
            .unwrap();
        assert!(view.admin);
        assert!(matches!(
            ctx.users
                .update_claims(&admin, &UserId::from("missing"), ClaimsUpdate { admin: true })
                .await,
            Err(ServiceError::NotFound)
        ));
        assert_eq!(ctx.users.list(&admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reset_password_flow_is_single_use() {
        let ctx = TestContext::new();
        ctx.user("alice@example.com").await;

        ctx.users
            .send_reset_password("alice@example.com")
            .await
            .unwrap();
        let token = ctx.mailer.last_reset_token().expect("reset mail sent");

        ctx.users.reset_password(&token, "brand-new").await.unwrap();
        assert!(ctx.users.authenticate("alice@example.com", "brand-new").await.is_ok());
        assert!(matches!(
            ctx.users
                .authenticate("alice@example.com", TestContext::PASSWORD)
                .await,
            Err(ServiceError::IncorrectPassword)
        ));

        assert!(matches!(
            ctx.users.reset_password(&token, "another-one").await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn reset_rejects_access_tokens_and_weak_passwords() {
        let ctx = TestContext::new();
        let alice = ctx.user("alice@example.com").await;
        let access = ctx.users.credentials().issue_access(&alice).unwrap();
        assert!(matches!(
            ctx.users.reset_password(&access.token, "brand-new").await,
            Err(ServiceError::Unauthorized)
        ));

        ctx.users
            .send_reset_password("alice@example.com")
            .await
            .unwrap();
        let token = ctx.mailer.last_reset_token().unwrap();
        assert!(matches!(
            ctx.users.reset_password(&token, "abc").await,
            Err(ServiceError::InvalidArguments(_))
        ));
        // A rejected attempt does not burn the token.
        ctx.users.reset_password(&token, "brand-new").await.unwrap();
    }

    #[tokio::test]
    async fn reset_for_unknown_user_sends_nothing() {
        let ctx = TestContext::new();
        ctx.users
            .send_reset_password("ghost@example.com")
            .await
            .unwrap();
        assert!(ctx.mailer.last_reset_token().is_none());
    }

    #[tokio::test]
    async fn seed_resolves_shared_accounts_and_is_idempotent() {
        let ctx = TestContext::new();
        let seeds = vec![
            SeedUser {
                id: UserId::from("seed1"),
                username: "one@example.com".into(),
                password: "123456".into(),
                admin: true,
                shared_accounts: vec!["two@example.com".into()],
            },
            SeedUser {
                id: UserId::from("seed2"),
                username: "two@example.com".into(),
                password: "123456".into(),
                admin: false,
                shared_accounts: vec![],
            },
        ];
        assert_eq!(ctx.users.seed(seeds.clone()).await.unwrap(), 2);
        assert_eq!(ctx.users.seed(seeds).await.unwrap(), 0);

        let auth = ctx.users.authenticate("one@example.com", "123456").await.unwrap();
        assert!(auth.claims.is_admin());
        assert_eq!(auth.user.shared_accounts, ["two@example.com"]);
    }

    #[tokio::test]
    async fn seed_rejects_the_canonical_owner_id() {
        let ctx = TestContext::new();
        let seeds = vec![
            SeedUser {
                id: UserId::from("seed1"),
                username: "one@example.com".into(),
                password: "123456".into(),
                admin: false,
                shared_accounts: vec![],
            },
            SeedUser {
                id: UserId::from(Owner::Canonical.as_str()),
                username: "root@example.com".into(),
                password: "123456".into(),
                admin: true,
                shared_accounts: vec![],
            },
        ];
        let err = ctx.users.seed(seeds).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArguments(_)));
        assert!(!ctx.users.exists("one@example.com").await.unwrap());
    }

    /// Memory repository whose updates can be switched off.
    #[derive(Default)]
    struct FlakyUsers {
        inner: MemoryUserRepository,
        fail_updates: AtomicBool,
    }

    #[async_trait]
    impl UserRepository for FlakyUsers {
        async fn find(&self, key: UserKey<'_>) -> StoreResult<Option<UserRecord>> {
            self.inner.find(key).await
        }

        async fn find_many_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<UserRecord>> {
            self.inner.find_many_by_ids(ids).await
        }

        async fn find_many_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<UserRecord>> {
            self.inner.find_many_by_usernames(usernames).await
        }

        async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord> {
            self.inner.insert(user).await
        }

        async fn update(&self, user: UserRecord) -> StoreResult<UserRecord> {
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(StoreError::Internal("connection reset".into()));
            }
            self.inner.update(user).await
        }

        async fn delete(&self, id: &UserId) -> StoreResult<()> {
            self.inner.delete(id).await
        }

        async fn list(&self) -> StoreResult<Vec<UserRecord>> {
            self.inner.list().await
        }
    }

    #[tokio::test]
    async fn failed_reset_write_spends_the_token_and_keeps_the_old_password() {
        let repo = Arc::new(FlakyUsers::default());
        let mailer = Arc::new(RecordingMailer::default());
        let users = UserService::new(
            repo.clone(),
            Arc::new(credential_manager()),
            mailer.clone(),
            Arc::new(Validator::default()),
            ResetMailSettings {
                front_end_url: "http://localhost:8080".into(),
                from_address: "noreply@example.com".into(),
            },
        );
        users
            .create(creds("alice@example.com", "secret1"), Profile::default())
            .await
            .unwrap();
        users.send_reset_password("alice@example.com").await.unwrap();
        let token = mailer.last_reset_token().unwrap();

        repo.fail_updates.store(true, Ordering::SeqCst);
        let err = users.reset_password(&token, "brand-new").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));

        repo.fail_updates.store(false, Ordering::SeqCst);
        let err = users.reset_password(&token, "brand-new").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        users.authenticate("alice@example.com", "secret1").await.unwrap();
    }
}
