//! Operations for the legacy Nexus staging workflow.

use stagehand_core::config::{GlobalConfig, NexusConfig};
use stagehand_core::credentials::Credentials;
use stagehand_maven::nexus::NexusClient;
use stagehand_maven::profile::StagingProfile;
use stagehand_util::errors::StagehandError;
use stagehand_util::progress::{spinner, status};

/// Build a Nexus client from the `[nexus]` settings.
pub fn nexus_client(
    config: &NexusConfig,
    credentials: Credentials,
) -> Result<NexusClient, StagehandError> {
    Ok(NexusClient::new(&config.base_url, credentials)?
        .with_polling(config.poll_interval(), config.close_timeout()))
}

/// List the account's staging profiles.
pub async fn profiles(
    config: &GlobalConfig,
    credentials: Credentials,
) -> miette::Result<Vec<StagingProfile>> {
    let client = nexus_client(&config.nexus, credentials)?;
    let sp = spinner("Fetching staging profiles...");
    let profiles = client.staging_profiles().await;
    sp.finish_and_clear();
    let profiles = profiles?;
    for profile in &profiles {
        println!("{}\t{}", profile.id, profile.name);
    }
    Ok(profiles)
}

/// Open a staging repository for `group` and print its id.
///
/// `profile` overrides the configured profile; with neither, the profile is
/// resolved from the group.
pub async fn create(
    config: &GlobalConfig,
    credentials: Credentials,
    group: &str,
    profile: Option<&str>,
) -> miette::Result<String> {
    let client = nexus_client(&config.nexus, credentials)?;
    let profile = profile.or(config.nexus.profile.as_deref());
    let id = client.create_repository(group, profile).await?;
    status("Created", &format!("staging repository {id}"));
    println!("{id}");
    Ok(id)
}

/// Close and release the selected staging repository.
pub async fn close_and_release(
    config: &GlobalConfig,
    credentials: Credentials,
    repository: Option<&str>,
) -> miette::Result<String> {
    let client = nexus_client(&config.nexus, credentials)?;
    let repository = repository.or(config.nexus.repository.as_deref());
    let id = client.close_and_release(repository).await?;
    status("Released", &format!("staging repository {id}"));
    Ok(id)
}

/// Drop a staging repository.
pub async fn drop_repository(
    config: &GlobalConfig,
    credentials: Credentials,
    repository: &str,
) -> miette::Result<()> {
    let client = nexus_client(&config.nexus, credentials)?;
    client.drop_repository(repository).await?;
    status("Dropped", &format!("staging repository {repository}"));
    Ok(())
}
