//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::claims::Claims;
use crate::credentials::{CredentialManager, MemoryResetLedger, PasswordHasher, TokenService};
use crate::database::{MemoryUserRepository, MemoryWhRepository, UserKey, UserRepository};
use crate::external::{Email, ExternalError, Mailer};
use crate::services::{Credentials, Profile, ResetMailSettings, UserService, WhService};
use crate::validation::Validator;

pub const TEST_SECRET: &str = "test-secret";

pub fn creds(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Keeps every message so tests can pull the reset link back out.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn last_reset_token(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let content = &sent.last()?.content;
        let (_, token) = content.split_once("/resetPassword/")?;
        Some(token.trim().to_string())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), ExternalError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn credential_manager() -> CredentialManager {
    CredentialManager::new(
        PasswordHasher::new(4),
        TokenService::new(TEST_SECRET, Duration::from_secs(3600), Duration::from_secs(600)),
        Arc::new(MemoryResetLedger::new()),
    )
}

pub struct TestContext {
    pub users: Arc<UserService>,
    pub wh: Arc<WhService>,
    pub user_repo: Arc<MemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub const PASSWORD: &'static str = "password123";

    pub fn new() -> Self {
        let validator = Arc::new(Validator::default());
        let user_repo = Arc::new(MemoryUserRepository::new());
        let mailer = Arc::new(RecordingMailer::default());
        let users = UserService::new(
            user_repo.clone(),
            Arc::new(credential_manager()),
            mailer.clone(),
            validator.clone(),
            ResetMailSettings {
                front_end_url: "http://localhost:8080/".to_string(),
                from_address: "noreply@example.com".to_string(),
            },
        );
        let wh = WhService::new(Arc::new(MemoryWhRepository::new()), validator);
        Self {
            users: Arc::new(users),
            wh: Arc::new(wh),
            user_repo,
            mailer,
        }
    }

    /// Registers a user and returns the claims its login would produce.
    pub async fn user(&self, username: &str) -> Claims {
        self.user_sharing_with(username, &[]).await
    }

    pub async fn user_sharing_with(&self, username: &str, shared: &[&str]) -> Claims {
        let profile = Profile {
            shared_accounts: shared.iter().map(|s| s.to_string()).collect(),
        };
        self.users
            .create(creds(username, Self::PASSWORD), profile)
            .await
            .unwrap();
        self.users
            .authenticate(username, Self::PASSWORD)
            .await
            .unwrap()
            .claims
    }

    pub async fn admin(&self, username: &str) -> Claims {
        self.user(username).await;
        let mut record = self
            .user_repo
            .find(UserKey::Username(username))
            .await
            .unwrap()
            .unwrap();
        record.admin = true;
        self.user_repo.update(record).await.unwrap();
        self.users
            .authenticate(username, Self::PASSWORD)
            .await
            .unwrap()
            .claims
    }
}
