//! Build-wide publish coordination.
//!
//! Every module of a build writes its artifacts to its own local Maven
//! repository and then registers here. The Central Portal takes one atomic
//! deployment per release, so nothing touches the network until the build is
//! over: [`PublishCoordinator::finish`] looks at what was registered and at the
//! build outcome, then uploads one bundle spanning all modules (on success)
//! or makes a best-effort drop (on failure).
//!
//! Mutation goes through `&mut self`, so a host sharing the coordinator
//! between tasks has to serialize access (e.g. behind a mutex). `finish`
//! consumes the coordinator, which makes teardown happen at most once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use stagehand_core::coordinates::MavenCentralCoordinates;
use stagehand_core::outcome::BuildOutcome;
use stagehand_maven::bundle;
use stagehand_maven::portal::{DeploymentState, PortalClient, PublishingType};
use stagehand_maven::repository::LocalRepository;
use stagehand_util::errors::StagehandError;
use stagehand_util::fs::staged_bundle_path;
use stagehand_util::hash::sha256_file;
use stagehand_util::progress::{status, status_warn};

/// Work deferred to the end of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndOfBuildAction {
    /// Bundle every registered project and upload it as one deployment.
    Upload,
    /// Let the portal publish the upload automatically once validated.
    Publish,
    /// Wait for the uploaded deployment to pass validation.
    Validate,
    /// Delete the deployment. `run_after_failure` actions are cleanup and run
    /// only when the build failed; the others run only when it succeeded.
    Drop { run_after_failure: bool },
}

impl EndOfBuildAction {
    pub fn runs_after_failure(&self) -> bool {
        matches!(
            self,
            Self::Drop {
                run_after_failure: true
            }
        )
    }
}

/// A module whose release artifacts sit in a local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredProject {
    pub coordinates: MavenCentralCoordinates,
    pub local_repository: PathBuf,
}

/// What teardown did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub build_failed: bool,
    /// Actions selected for this outcome, in execution order.
    pub actions: Vec<EndOfBuildAction>,
    pub deployment_name: Option<String>,
    pub deployment_id: Option<String>,
    pub bundle: Option<PathBuf>,
    /// Final state observed when validation was requested.
    pub validated: Option<DeploymentState>,
    pub dropped: bool,
}

/// Collects registrations during a build and acts on them once at the end.
#[derive(Debug)]
pub struct PublishCoordinator {
    portal: PortalClient,
    build_dir: PathBuf,
    projects: Vec<RegisteredProject>,
    actions: BTreeSet<EndOfBuildAction>,
    explicit_deployment: Option<String>,
    outcome: BuildOutcome,
}

impl PublishCoordinator {
    /// `build_dir` is the root build directory; bundles are staged under
    /// `<build_dir>/publish/`.
    pub fn new(portal: PortalClient, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            portal,
            build_dir: build_dir.into(),
            projects: Vec::new(),
            actions: BTreeSet::new(),
            explicit_deployment: None,
            outcome: BuildOutcome::new(),
        }
    }

    /// Register a module for upload. Snapshot versions are ignored.
    pub fn register_project(
        &mut self,
        coordinates: MavenCentralCoordinates,
        local_repository: impl Into<PathBuf>,
    ) {
        if coordinates.is_snapshot() {
            tracing::debug!("Not registering snapshot {coordinates}");
            return;
        }
        let local_repository = local_repository.into();
        if !LocalRepository::new(&local_repository).contains(&coordinates) {
            tracing::warn!(
                "{} has no files for {coordinates}",
                local_repository.display()
            );
        }

        let project = RegisteredProject {
            coordinates,
            local_repository,
        };
        if !self.projects.contains(&project) {
            tracing::debug!("Registered {}", project.coordinates);
            self.projects.push(project);
        }
        self.actions.insert(EndOfBuildAction::Upload);
        self.actions.insert(EndOfBuildAction::Drop {
            run_after_failure: true,
        });
    }

    /// Publish automatically after upload instead of waiting for a manual release.
    pub fn enable_automatic_publishing(&mut self) {
        self.actions.insert(EndOfBuildAction::Publish);
    }

    /// Wait for the uploaded deployment to pass validation.
    pub fn enable_validation(&mut self) {
        self.actions.insert(EndOfBuildAction::Validate);
    }

    /// Drop an existing deployment at the end of a successful build.
    ///
    /// Call after any [`register_project`](Self::register_project) calls of
    /// the same build.
    pub fn drop_deployment(&mut self, id: impl Into<String>) {
        self.explicit_deployment = Some(id.into());
        self.actions.insert(EndOfBuildAction::Drop {
            run_after_failure: false,
        });
    }

    /// Feed a finish event from the host's task graph.
    pub fn record_task_finished(&self, task: &str, succeeded: bool) {
        self.outcome.record(task, succeeded);
    }

    pub fn registered_projects(&self) -> &[RegisteredProject] {
        &self.projects
    }

    pub fn pending_actions(&self) -> Vec<EndOfBuildAction> {
        self.actions.iter().copied().collect()
    }

    /// The pending actions that apply to a build that did or did not fail.
    pub fn selected_actions(&self, build_failed: bool) -> Vec<EndOfBuildAction> {
        self.actions
            .iter()
            .copied()
            .filter(|a| a.runs_after_failure() == build_failed)
            .collect()
    }

    /// Run the end-of-build actions. Consumes the coordinator.
    ///
    /// Upload and validation errors propagate. Drop errors are logged and
    /// swallowed so they never hide the failure that caused the drop.
    pub async fn finish(self) -> Result<TeardownReport, StagehandError> {
        let build_failed = self.outcome.is_failure();
        let selected = self.selected_actions(build_failed);
        let mut report = TeardownReport {
            build_failed,
            actions: selected.clone(),
            ..TeardownReport::default()
        };
        if selected.is_empty() {
            tracing::debug!("No end-of-build actions to run");
            return Ok(report);
        }

        if selected.contains(&EndOfBuildAction::Upload) && !self.projects.is_empty() {
            let stamp = chrono::Utc::now().timestamp_millis().to_string();
            let name = deployment_name(&self.projects, &stamp);
            let bundle = self.write_bundle(&name, &stamp)?;

            let publishing_type = if selected.contains(&EndOfBuildAction::Publish) {
                PublishingType::Automatic
            } else {
                PublishingType::UserManaged
            };
            status(
                "Uploading",
                &format!(
                    "{name} ({} files, {publishing_type})",
                    bundle.entries.len()
                ),
            );
            let id = self
                .portal
                .upload(&name, publishing_type, &bundle.path)
                .await?;
            report.deployment_name = Some(name);
            report.bundle = Some(bundle.path);
            report.deployment_id = Some(id.clone());

            if selected.contains(&EndOfBuildAction::Validate) {
                let deployment = self.portal.validate_deployment(&id).await?;
                status("Validated", &format!("deployment {id} is {}", deployment.state));
                report.validated = Some(deployment.state);
            }
        }

        let drop_selected = selected
            .iter()
            .any(|a| matches!(a, EndOfBuildAction::Drop { .. }));
        if drop_selected {
            let target = self
                .explicit_deployment
                .clone()
                .or_else(|| report.deployment_id.clone());
            match target {
                Some(id) => match self.portal.delete_deployment(&id).await {
                    Ok(()) => {
                        status("Dropped", &format!("deployment {id}"));
                        report.dropped = true;
                        report.deployment_id.get_or_insert(id);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to drop deployment {id}: {e}");
                        status_warn("Warning", &format!("could not drop deployment {id}"));
                    }
                },
                None => tracing::debug!("No deployment to drop"),
            }
        }

        Ok(report)
    }

    fn write_bundle(&self, name: &str, stamp: &str) -> Result<bundle::Bundle, StagehandError> {
        let path = staged_bundle_path(&self.build_dir, name, stamp);
        let roots: Vec<&Path> = self
            .projects
            .iter()
            .map(|p| p.local_repository.as_path())
            .collect();
        let bundle = bundle::write_bundle(&roots, &path)?;
        match sha256_file(&bundle.path) {
            Ok(digest) => tracing::info!("Bundle {} sha256 {digest}", bundle.path.display()),
            Err(e) => tracing::debug!("Could not hash {}: {e}", bundle.path.display()),
        }
        Ok(bundle)
    }
}

/// Name of the deployment for a set of projects.
///
/// One project: `group-artifact-version`. Several sharing group and version:
/// `group-version`. Anything else: `group-<stamp>` using the first group.
pub fn deployment_name(projects: &[RegisteredProject], stamp: &str) -> String {
    match projects {
        [] => format!("deployment-{stamp}"),
        [only] => {
            let c = &only.coordinates;
            format!("{}-{}-{}", c.group, c.artifact_id, c.version)
        }
        [first, rest @ ..] => {
            let c = &first.coordinates;
            let uniform = rest
                .iter()
                .all(|p| p.coordinates.group == c.group && p.coordinates.version == c.version);
            if uniform {
                format!("{}-{}", c.group, c.version)
            } else {
                format!("{}-{stamp}", c.group)
            }
        }
    }
}

/// Host-side owner of a coordinator for one build invocation.
///
/// The coordinator is created on first use and torn down by [`close`](Self::close).
pub struct BuildSession {
    factory: Box<dyn Fn() -> Result<PublishCoordinator, StagehandError> + Send>,
    coordinator: Option<PublishCoordinator>,
}

impl BuildSession {
    pub fn new(
        factory: impl Fn() -> Result<PublishCoordinator, StagehandError> + Send + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            coordinator: None,
        }
    }

    /// The session's coordinator, creating it if this is the first use.
    pub fn coordinator(&mut self) -> Result<&mut PublishCoordinator, StagehandError> {
        if self.coordinator.is_none() {
            self.coordinator = Some((self.factory)()?);
        }
        self.coordinator
            .as_mut()
            .ok_or_else(|| StagehandError::Generic {
                message: "Publish coordinator is unavailable".to_string(),
            })
    }

    pub fn is_started(&self) -> bool {
        self.coordinator.is_some()
    }

    /// End the build: run teardown if the coordinator was ever used.
    pub async fn close(self) -> Result<Option<TeardownReport>, StagehandError> {
        match self.coordinator {
            Some(coordinator) => coordinator.finish().await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(coords: &str) -> RegisteredProject {
        RegisteredProject {
            coordinates: coords.parse().unwrap(),
            local_repository: PathBuf::from("/tmp/repo"),
        }
    }

    #[test]
    fn name_for_single_project() {
        let projects = [project("com.example:lib:1.0.0")];
        assert_eq!(deployment_name(&projects, "1"), "com.example-lib-1.0.0");
    }

    #[test]
    fn name_for_uniform_projects() {
        let projects = [
            project("com.example:core:1.0.0"),
            project("com.example:extras:1.0.0"),
        ];
        assert_eq!(deployment_name(&projects, "1"), "com.example-1.0.0");
    }

    #[test]
    fn name_for_mixed_projects_uses_stamp() {
        let projects = [
            project("com.example:core:1.0.0"),
            project("com.example.plugin:gradle:2.0.0"),
        ];
        assert_eq!(
            deployment_name(&projects, "1700000000000"),
            "com.example-1700000000000"
        );
    }

    #[test]
    fn failure_selects_only_cleanup() {
        assert!(EndOfBuildAction::Drop {
            run_after_failure: true
        }
        .runs_after_failure());
        assert!(!EndOfBuildAction::Drop {
            run_after_failure: false
        }
        .runs_after_failure());
        assert!(!EndOfBuildAction::Upload.runs_after_failure());
        assert!(!EndOfBuildAction::Publish.runs_after_failure());
    }
}
