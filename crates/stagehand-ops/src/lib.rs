pub mod coordinator;
pub mod ops_nexus;
pub mod ops_portal;
pub mod ops_publish;

use stagehand_core::config::PortalConfig;
use stagehand_core::credentials::Credentials;
use stagehand_maven::portal::PortalClient;
use stagehand_util::errors::StagehandError;

/// Build a portal client from the `[portal]` settings.
pub fn portal_client(
    config: &PortalConfig,
    credentials: Credentials,
) -> Result<PortalClient, StagehandError> {
    Ok(PortalClient::new(&config.base_url, credentials)?
        .with_auth_scheme(config.auth_scheme)
        .with_polling(config.poll_interval(), config.validation_timeout()))
}
