//! Outbound mail port for email verification codes.

use async_trait::async_trait;

use crate::error::CoreResult;

/// Sends verification codes to domain contacts.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a verification code for `domain` to `email`.
    async fn send_verification_code(&self, email: &str, domain: &str, code: &str)
        -> CoreResult<()>;
}

/// Mailer that only logs. Useful for development environments without an
/// outbound mail relay.
#[derive(Debug, Default)]
pub struct LogMailer;

impl LogMailer {
    /// Create a log-backed mailer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(
        &self,
        email: &str,
        domain: &str,
        _code: &str,
    ) -> CoreResult<()> {
        // The code itself stays out of the logs.
        log::info!("verification code for {domain} sent to {email}");
        Ok(())
    }
}
