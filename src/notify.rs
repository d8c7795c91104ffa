use axum::async_trait;
use tracing::info;

/// Out-of-band delivery of confirmation and reset codes.
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn deliver(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

/// Writes the code to the log instead of emailing it. Stand-in until a real
/// mail provider is wired in behind the trait.
pub struct LogSender;

#[async_trait]
impl CodeSender for LogSender {
    async fn deliver(&self, email: &str, code: &str) -> anyhow::Result<()> {
        info!(email = %email, code = %code, "code issued");
        Ok(())
    }
}
