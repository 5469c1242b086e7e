use std::sync::Arc;

use config::Config;
use credentials::{CredentialManager, MemoryResetLedger, PasswordHasher, ResetTokenLedger, TokenService};
use database::{MemoryUserRepository, MemoryWhRepository, UserRepository, WhRepository};
use external::{AlwaysPass, CaptchaVerifier, LogMailer, Mailer};
use services::{ResetMailSettings, UserService, WhService};
use validation::Validator;

pub mod claims;
pub mod config;
pub mod credentials;
pub mod database;
pub mod error;
pub mod external;
pub mod id;
pub mod kv;
pub mod middleware;
pub mod ownership;
pub mod router;
pub mod routes;
pub mod seed;
pub mod services;
pub mod utils;
pub mod validation;
pub mod wh;

#[cfg(test)]
mod testing;

/// Storage and outbound collaborators chosen at startup.
pub struct Backends {
    pub users: Arc<dyn UserRepository>,
    pub wh: Arc<dyn WhRepository>,
    pub reset_ledger: Arc<dyn ResetTokenLedger>,
    pub mailer: Arc<dyn Mailer>,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl Backends {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            wh: Arc::new(MemoryWhRepository::new()),
            reset_ledger: Arc::new(MemoryResetLedger::new()),
            mailer: Arc::new(LogMailer),
            captcha: Arc::new(AlwaysPass),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<UserService>,
    pub wh: Arc<WhService>,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl AppState {
    pub fn new(config: Config, backends: Backends) -> Self {
        let validator = Arc::new(Validator::new(config.validation.clone()));
        let credentials = CredentialManager::new(
            PasswordHasher::new(config.bcrypt_cost),
            TokenService::new(
                &config.jwt_secret,
                config.jwt_access_expiration(),
                config.jwt_reset_expiration(),
            ),
            backends.reset_ledger,
        );
        let users = UserService::new(
            backends.users,
            Arc::new(credentials),
            backends.mailer,
            validator.clone(),
            ResetMailSettings {
                front_end_url: config.front_end_url.clone(),
                from_address: config.email_from_address.clone(),
            },
        );
        let wh = WhService::new(backends.wh, validator);

        Self {
            config: Arc::new(config),
            users: Arc::new(users),
            wh: Arc::new(wh),
            captcha: backends.captcha,
        }
    }
}
