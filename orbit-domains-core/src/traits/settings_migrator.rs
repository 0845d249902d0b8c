//! Application settings migration port.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::TransferSource;

/// Moves application-level settings (redirects, env vars, routing rules)
/// off the source platform once DNS and delegation have moved.
#[async_trait]
pub trait AppSettingsMigrator: Send + Sync {
    /// Migrate settings for `domain` away from `source` and associate the
    /// domain with the application identified by `app_id`.
    async fn migrate(
        &self,
        user_id: &str,
        app_id: &str,
        domain: &str,
        source: TransferSource,
    ) -> CoreResult<()>;
}
