//! Operations on existing Central Portal deployments.

use stagehand_core::config::GlobalConfig;
use stagehand_core::credentials::Credentials;
use stagehand_maven::portal::Deployment;
use stagehand_util::progress::{spinner, status, status_info};

/// Print the current status of a deployment.
pub async fn status_of(
    config: &GlobalConfig,
    credentials: Credentials,
    deployment_id: &str,
) -> miette::Result<Deployment> {
    let portal = crate::portal_client(&config.portal, credentials)?;
    let sp = spinner(&format!("Fetching deployment {deployment_id}..."));
    let deployment = portal.deployment_status(deployment_id).await;
    sp.finish_and_clear();
    let deployment = deployment?;

    status_info("Deployment", &format!("{} ({})", deployment_id, deployment.deployment_name));
    println!("{}", deployment.state);
    for purl in &deployment.purls {
        println!("  {purl}");
    }
    if let Some(errors) = &deployment.errors {
        for (publication, messages) in errors {
            println!("{publication}:");
            for message in messages {
                println!("  * {message}");
            }
        }
    }
    Ok(deployment)
}

/// Wait until a deployment passes validation.
pub async fn validate(
    config: &GlobalConfig,
    credentials: Credentials,
    deployment_id: &str,
) -> miette::Result<Deployment> {
    let portal = crate::portal_client(&config.portal, credentials)?;
    let deployment = portal.validate_deployment(deployment_id).await?;
    status("Validated", &format!("deployment {deployment_id} is {}", deployment.state));
    Ok(deployment)
}

/// Publish a validated USER_MANAGED deployment.
pub async fn release(
    config: &GlobalConfig,
    credentials: Credentials,
    deployment_id: &str,
) -> miette::Result<()> {
    let portal = crate::portal_client(&config.portal, credentials)?;
    portal.publish_deployment(deployment_id).await?;
    status("Publishing", &format!("deployment {deployment_id}"));
    Ok(())
}
