use serde_json::Value;

/// A message handed to the mail-transport collaborator. Delivery itself is
/// outside this crate; implementors decide what `options` means to them.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
    /// `None` lets the transport fall back to its configured sender.
    pub from: Option<String>,
    pub to: Vec<String>,
    pub options: Option<Value>,
}

pub trait Mailer {
    fn send(
        &self,
        mail: OutgoingEmail,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Transport that only logs the message. Useful in development and as the
/// default when no real delivery backend is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        tracing::info!(
            to = ?mail.to,
            from = ?mail.from,
            subject = %mail.subject,
            "outgoing email (log transport)"
        );
        Ok(())
    }
}
