//! Outgoing email
//!
//! Sending is fire-and-forget for the caller: a failed email is logged and
//! never retried.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{ProviderError, ProviderResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[trait_variant::make(EmailSender: Send)]
pub trait LocalEmailSender {
    async fn send(&self, message: &EmailMessage) -> ProviderResult<()>;
}

/// Writes the message to the log instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> ProviderResult<()> {
        if !message.to.contains('@') {
            return Err(ProviderError::Rejected {
                provider: "email",
                message: format!("invalid recipient: {}", message.to),
            });
        }

        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.html.len(),
            "Email (log sender)"
        );
        Ok(())
    }
}

/// Spawn the send; failures are logged and swallowed.
pub fn send_in_background<E>(sender: Arc<E>, message: EmailMessage) -> JoinHandle<()>
where
    E: EmailSender + Sync + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = EmailSender::send(sender.as_ref(), &message).await {
            tracing::warn!(error = %e, to = %message.to, "Failed to send email");
        }
    })
}
