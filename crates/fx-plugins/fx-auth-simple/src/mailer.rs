use async_trait::async_trait;
use fx_core::error::Result;
use fx_core::traits::{Email, Mailer};

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from_name: &str, from_email: &str) -> Self {
        Self {
            from: format!("{from_name} <{from_email}>"),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<()> {
        tracing::info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            body_len = email.text_body.len(),
            "email delivery stubbed"
        );
        Ok(())
    }
}
