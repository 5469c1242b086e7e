use async_trait::async_trait;

use super::ExternalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub content: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), ExternalError>;
}

/// Development mailer: writes the message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), ExternalError> {
        tracing::info!(
            from = %email.from_address,
            to = %email.to_address,
            subject = %email.subject,
            content = %email.content,
            "email not delivered, logged instead"
        );
        Ok(())
    }
}
