use async_trait::async_trait;
use serde::Deserialize;

use super::ExternalError;

const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_addr: &str) -> Result<bool, ExternalError>;
}

/// Used when no captcha secret is configured.
#[derive(Debug, Default)]
pub struct AlwaysPass;

#[async_trait]
impl CaptchaVerifier for AlwaysPass {
    async fn verify(&self, _token: &str, _remote_addr: &str) -> Result<bool, ExternalError> {
        Ok(true)
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret: secret.into(),
            verify_url: RECAPTCHA_VERIFY_URL.to_string(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_addr: &str) -> Result<bool, ExternalError> {
        if token.is_empty() {
            return Ok(false);
        }
        let response: SiteVerifyResponse = self
            .client
            .post(&self.verify_url)
            .form(&[
                ("secret", self.secret.as_str()),
                ("response", token),
                ("remoteip", remote_addr),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            tracing::debug!(errors = ?response.error_codes, "captcha rejected");
        }
        Ok(response.success)
    }
}
