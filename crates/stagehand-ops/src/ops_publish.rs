//! Operation: release locally staged modules through the Central Portal.

use std::path::PathBuf;

use stagehand_core::config::GlobalConfig;
use stagehand_core::coordinates::MavenCentralCoordinates;
use stagehand_core::credentials::Credentials;
use stagehand_util::errors::StagehandError;
use stagehand_util::progress::status;

use crate::coordinator::{BuildSession, PublishCoordinator, TeardownReport};

/// Inputs for one publish run.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub build_dir: PathBuf,
    /// `(coordinates, local repository)` per module, in registration order.
    pub projects: Vec<(MavenCentralCoordinates, PathBuf)>,
    pub automatic: bool,
    pub validate: bool,
}

/// Parse `group:artifact:version=path` as given on the command line.
pub fn parse_project_spec(spec: &str) -> Result<(MavenCentralCoordinates, PathBuf), StagehandError> {
    let Some((coords, path)) = spec.split_once('=') else {
        return Err(StagehandError::Configuration {
            message: format!("Invalid project '{spec}', expected group:artifact:version=path"),
        });
    };
    if path.trim().is_empty() {
        return Err(StagehandError::Configuration {
            message: format!("Project '{spec}' has an empty repository path"),
        });
    }
    Ok((coords.parse()?, PathBuf::from(path.trim())))
}

/// Register every project with a fresh session and run teardown as a
/// successful build.
pub async fn publish(
    config: &GlobalConfig,
    credentials: Credentials,
    request: PublishRequest,
) -> miette::Result<Option<TeardownReport>> {
    let portal_config = config.portal.clone();
    let build_dir = request.build_dir.clone();
    let mut session = BuildSession::new(move || {
        Ok(PublishCoordinator::new(
            crate::portal_client(&portal_config, credentials.clone())?,
            build_dir.clone(),
        ))
    });

    for (coords, repo) in request.projects {
        let coordinator = session.coordinator()?;
        coordinator.register_project(coords.clone(), repo);
        coordinator.record_task_finished(&format!("{coords}:publishToLocal"), true);
    }
    if session.is_started() {
        let coordinator = session.coordinator()?;
        if request.automatic {
            coordinator.enable_automatic_publishing();
        }
        if request.validate {
            coordinator.enable_validation();
        }
    }

    let report = session.close().await?;
    match &report {
        Some(TeardownReport {
            deployment_id: Some(id),
            deployment_name: Some(name),
            ..
        }) => {
            status("Deployed", &format!("{name} as {id}"));
            println!("{id}");
        }
        _ => status("Finished", "nothing to upload"),
    }
    Ok(report)
}

/// Drop an existing deployment.
pub async fn drop_deployment(
    config: &GlobalConfig,
    credentials: Credentials,
    deployment_id: &str,
) -> miette::Result<()> {
    let portal = crate::portal_client(&config.portal, credentials)?;
    portal.delete_deployment(deployment_id).await?;
    status("Dropped", &format!("deployment {deployment_id}"));
    Ok(())
}
