//! Outbound collaborators: mail delivery and captcha verification.

mod captcha;
mod email;

use thiserror::Error;

pub use captcha::{AlwaysPass, CaptchaVerifier, RecaptchaVerifier};
pub use email::{Email, LogMailer, Mailer};

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("email delivery failed: {0}")]
    Email(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}
