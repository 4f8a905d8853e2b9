//! Central Portal deployment workflow.
//!
//! A bundle is uploaded as one deployment, which the portal then moves through
//! `PENDING -> VALIDATING -> VALIDATED [-> PUBLISHING -> PUBLISHED]`, or to
//! `FAILED` from any non-terminal state.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stagehand_core::config::AuthScheme;
use stagehand_core::credentials::Credentials;
use stagehand_util::errors::StagehandError;
use stagehand_util::progress;

use crate::auth;
use crate::client::{self, ensure_success, network_error};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Whether the portal publishes a validated deployment by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishingType {
    Automatic,
    UserManaged,
}

impl PublishingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "AUTOMATIC",
            Self::UserManaged => "USER_MANAGED",
        }
    }
}

impl fmt::Display for PublishingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    Pending,
    Validating,
    Validated,
    Publishing,
    Published,
    Failed,
    /// A state this client does not know about; polled like `Pending`.
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    /// Validation did not reject the bundle, so waiting can stop.
    pub fn passed_validation(&self) -> bool {
        matches!(self, Self::Validated | Self::Publishing | Self::Published)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Validating => "VALIDATING",
            Self::Validated => "VALIDATED",
            Self::Publishing => "PUBLISHING",
            Self::Published => "PUBLISHED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status body returned by `publisher/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default)]
    pub deployment_id: String,
    #[serde(default)]
    pub deployment_name: String,
    #[serde(rename = "deploymentState", alias = "state")]
    pub state: DeploymentState,
    #[serde(default)]
    pub purls: Vec<String>,
    /// Publication name to validation messages, present once FAILED.
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Render validation errors as `<publication>:\n  * <message>` blocks.
pub fn format_validation_errors(errors: Option<&BTreeMap<String, Vec<String>>>) -> String {
    match errors {
        Some(errors) if !errors.is_empty() => errors
            .iter()
            .map(|(publication, messages)| {
                let mut block = format!("{publication}:");
                for message in messages {
                    block.push_str("\n  * ");
                    block.push_str(message);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => "No error details available".to_string(),
    }
}

/// Token-authenticated client for the Central Portal publisher API.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    auth_scheme: AuthScheme,
    poll_interval: Duration,
    timeout: Duration,
}

impl PortalClient {
    /// Create a client for the portal API root, e.g.
    /// `https://central.sonatype.com/api/v1`.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, StagehandError> {
        Ok(Self {
            http: client::build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            auth_scheme: AuthScheme::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Override how often status is polled and how long validation may take.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.timeout = timeout;
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self
            .http
            .request(method, client::join_url(&self.base_url, path));
        auth::apply_portal(req, &self.credentials, self.auth_scheme)
    }

    /// Upload `bundle` as a new deployment called `name`; returns its id.
    pub async fn upload(
        &self,
        name: &str,
        publishing_type: PublishingType,
        bundle: &Path,
    ) -> Result<String, StagehandError> {
        let bytes = tokio::fs::read(bundle).await?;
        let file_name = bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{name}.zip"));
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| network_error("Preparing bundle upload", e))?;
        let form = Form::new()
            .text("name", name.to_string())
            .text("publishingType", publishing_type.as_str())
            .part("bundle", part);

        tracing::debug!("Uploading {} as {name} ({publishing_type})", bundle.display());
        let resp = self
            .request(reqwest::Method::POST, "publisher/upload")
            .query(&[("name", name), ("publishingType", publishing_type.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error("Uploading bundle", e))?;

        let (status, body) = client::status_and_body(resp).await;
        if !(200..300).contains(&status) {
            return Err(StagehandError::UploadFailed { status, body });
        }
        let id = body.trim().to_string();
        tracing::info!("Uploaded deployment {id}");
        Ok(id)
    }

    /// Fetch the current status of a deployment.
    pub async fn deployment_status(&self, id: &str) -> Result<Deployment, StagehandError> {
        let operation = format!("Fetching status of deployment {id}");
        let resp = self
            .request(reqwest::Method::POST, "publisher/status")
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| network_error(&operation, e))?;
        let resp = ensure_success(&operation, resp).await?;
        resp.json::<Deployment>()
            .await
            .map_err(|e| StagehandError::Network {
                message: format!("{operation}: unexpected response: {e}"),
            })
    }

    /// Poll until the deployment passes validation, fails, or times out.
    ///
    /// VALIDATED, PUBLISHING and PUBLISHED all count as passed. Status fetch
    /// errors are logged and retried.
    pub async fn validate_deployment(&self, id: &str) -> Result<Deployment, StagehandError> {
        let started = Instant::now();
        let indicator = progress::poll_indicator(&format!("Validating deployment {id}"));
        let mut last_state: Option<DeploymentState> = None;
        loop {
            match self.deployment_status(id).await {
                Ok(deployment) if deployment.state.passed_validation() => {
                    indicator.finish_and_clear();
                    tracing::info!("Deployment {id} is {}", deployment.state);
                    return Ok(deployment);
                }
                Ok(deployment) if deployment.state.is_terminal() => {
                    indicator.finish_and_clear();
                    return Err(StagehandError::ValidationFailed {
                        deployment_id: id.to_string(),
                        details: format_validation_errors(deployment.errors.as_ref()),
                    });
                }
                Ok(deployment) => {
                    tracing::debug!("Deployment {id} is {}", deployment.state);
                    last_state = Some(deployment.state);
                }
                Err(e) => tracing::warn!("Polling deployment {id} failed: {e}"),
            }

            if started.elapsed() >= self.timeout {
                indicator.finish_and_clear();
                return Err(StagehandError::ValidationTimeout {
                    deployment_id: id.to_string(),
                    timeout: self.timeout,
                    last_state: last_state
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| DeploymentState::Unknown.to_string()),
                });
            }
            indicator.tick();
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Publish a validated USER_MANAGED deployment.
    pub async fn publish_deployment(&self, id: &str) -> Result<(), StagehandError> {
        let operation = format!("Publishing deployment {id}");
        let resp = self
            .request(reqwest::Method::POST, &format!("publisher/deployment/{id}"))
            .send()
            .await
            .map_err(|e| network_error(&operation, e))?;
        ensure_success(&operation, resp).await?;
        tracing::info!("Requested publication of deployment {id}");
        Ok(())
    }

    /// Delete a deployment that has not been published.
    pub async fn delete_deployment(&self, id: &str) -> Result<(), StagehandError> {
        let operation = format!("Dropping deployment {id}");
        let resp = self
            .request(reqwest::Method::DELETE, &format!("publisher/deployment/{id}"))
            .send()
            .await
            .map_err(|e| network_error(&operation, e))?;
        ensure_success(&operation, resp).await?;
        tracing::info!("Dropped deployment {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_parses_portal_body() {
        let body = r#"{
            "deploymentId": "28570f16-da32-4c14-bd2e-c1acc0782365",
            "deploymentName": "com.example-lib-1.0.0",
            "deploymentState": "PUBLISHED",
            "purls": ["pkg:maven/com.example/lib@1.0.0"]
        }"#;
        let deployment: Deployment = serde_json::from_str(body).unwrap();
        assert_eq!(deployment.state, DeploymentState::Published);
        assert_eq!(deployment.purls.len(), 1);
        assert!(deployment.errors.is_none());
    }

    #[test]
    fn deployment_accepts_short_state_field_and_unknown_states() {
        let deployment: Deployment =
            serde_json::from_str(r#"{"deploymentId": "x", "state": "QUARANTINED"}"#).unwrap();
        assert_eq!(deployment.state, DeploymentState::Unknown);
        assert!(!deployment.state.passed_validation());
    }

    #[test]
    fn success_exits() {
        assert!(DeploymentState::Validated.passed_validation());
        assert!(DeploymentState::Publishing.passed_validation());
        assert!(DeploymentState::Published.passed_validation());
        assert!(!DeploymentState::Pending.passed_validation());
        assert!(!DeploymentState::Validating.passed_validation());
        assert!(!DeploymentState::Failed.passed_validation());
        assert!(DeploymentState::Failed.is_terminal());
        assert!(!DeploymentState::Publishing.is_terminal());
    }

    #[test]
    fn format_errors_lists_each_message() {
        let mut errors = BTreeMap::new();
        errors.insert(
            "pkg:maven/com.example/lib@1.0".to_string(),
            vec!["Missing signature".to_string(), "Invalid POM".to_string()],
        );
        assert_eq!(
            format_validation_errors(Some(&errors)),
            "pkg:maven/com.example/lib@1.0:\n  * Missing signature\n  * Invalid POM"
        );
    }

    #[test]
    fn format_errors_without_details() {
        assert_eq!(format_validation_errors(None), "No error details available");
        assert_eq!(
            format_validation_errors(Some(&BTreeMap::new())),
            "No error details available"
        );
    }
}
