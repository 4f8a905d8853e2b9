//! Legacy Nexus staging-repository workflow.
//!
//! A release goes through a remote staging repository: it is created under a
//! staging profile, closed (Nexus runs its rule checks asynchronously while the
//! repository is `transitioning`), then promoted to the public repository or
//! dropped. Closing is the only step that needs polling; promotion is issued
//! with `autoDropAfterRelease` so nothing is left to clean up afterwards.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stagehand_core::credentials::Credentials;
use stagehand_util::errors::StagehandError;
use stagehand_util::progress;

use crate::auth;
use crate::client::{self, ensure_success, network_error};
use crate::profile::{self, StagingProfile};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Lifecycle state of a staging repository (`type` in the Nexus API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryState {
    Open,
    Closed,
    Released,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Released => "released",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A remote staging repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingRepository {
    pub repository_id: String,
    #[serde(rename = "type")]
    pub state: RepositoryState,
    /// True while a close or release is running on the server.
    #[serde(default)]
    pub transitioning: bool,
}

impl StagingRepository {
    /// `closed`, or `closed (transitioning)` while an operation is in flight.
    pub fn describe(&self) -> String {
        if self.transitioning {
            format!("{} (transitioning)", self.state)
        } else {
            self.state.to_string()
        }
    }

    fn is_settled(&self, state: RepositoryState) -> bool {
        self.state == state && !self.transitioning
    }
}

/// One entry of `staging/repository/{id}/activity` (e.g. `open`, `close`).
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryActivity {
    pub name: String,
    #[serde(default)]
    pub events: Vec<ActivityEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEvent {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ActivityProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityProperty {
    pub name: String,
    pub value: String,
}

// -----------------------------------------------------------------------
// Wire envelopes
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    staged_repository_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkRequest<'a> {
    staged_repository_ids: Vec<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_drop_after_release: Option<bool>,
}

// -----------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------

/// Basic-auth client for the Nexus staging REST API.
#[derive(Debug, Clone)]
pub struct NexusClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    poll_interval: Duration,
    close_timeout: Duration,
}

impl NexusClient {
    /// Create a client for the Nexus REST root, e.g.
    /// `https://s01.oss.sonatype.org/service/local`.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, StagehandError> {
        Ok(Self {
            http: client::build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            poll_interval: DEFAULT_POLL_INTERVAL,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        })
    }

    /// Override how often close status is polled and how long to wait overall.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.close_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        client::join_url(&self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<T, StagehandError> {
        let req = self.http.get(self.url(path)).header(ACCEPT, "application/json");
        let resp = auth::apply_basic(req, &self.credentials)
            .send()
            .await
            .map_err(|e| network_error(operation, e))?;
        let resp = ensure_success(operation, resp).await?;
        resp.json::<T>().await.map_err(|e| StagehandError::Network {
            message: format!("{operation}: unexpected response: {e}"),
        })
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> Result<reqwest::Response, StagehandError> {
        let req = self
            .http
            .post(self.url(path))
            .header(ACCEPT, "application/json")
            .json(body);
        auth::apply_basic(req, &self.credentials)
            .send()
            .await
            .map_err(|e| network_error(operation, e))
    }

    /// All staging profiles the account may publish under.
    pub async fn staging_profiles(&self) -> Result<Vec<StagingProfile>, StagehandError> {
        let envelope: Data<Vec<StagingProfile>> = self
            .get_json("staging/profiles", "Listing staging profiles")
            .await?;
        Ok(envelope.data)
    }

    /// The profile for `group`: the explicitly configured one when given,
    /// otherwise the best match from [`profile::resolve_profile`].
    pub async fn find_staging_profile(
        &self,
        group: &str,
        explicit: Option<&str>,
    ) -> Result<StagingProfile, StagehandError> {
        let profiles = self.staging_profiles().await?;
        let found = match explicit {
            Some(selector) => profile::find_profile(&profiles, selector)?,
            None => profile::resolve_profile(&profiles, group)?,
        };
        tracing::debug!("Using staging profile {} ({})", found.name, found.id);
        Ok(found.clone())
    }

    /// Open a new staging repository for `group` and return its id.
    pub async fn create_repository(
        &self,
        group: &str,
        explicit_profile: Option<&str>,
    ) -> Result<String, StagehandError> {
        let profile = self.find_staging_profile(group, explicit_profile).await?;
        let description = format!("Created by {} for {group}", client::USER_AGENT);
        let body = Data {
            data: StartRequest {
                description: &description,
            },
        };
        let operation = format!("Creating staging repository in profile {}", profile.name);
        let resp = self
            .post_json(
                &format!("staging/profiles/{}/start", profile.id),
                &body,
                &operation,
            )
            .await?;
        let resp = ensure_success(&operation, resp).await?;
        let started: Data<StartResponse> =
            resp.json().await.map_err(|e| StagehandError::Network {
                message: format!("{operation}: unexpected response: {e}"),
            })?;
        tracing::info!(
            "Created staging repository {}",
            started.data.staged_repository_id
        );
        Ok(started.data.staged_repository_id)
    }

    /// Every staging repository on the account.
    pub async fn profile_repositories(&self) -> Result<Vec<StagingRepository>, StagehandError> {
        let envelope: Data<Vec<StagingRepository>> = self
            .get_json("staging/profile_repositories", "Listing staging repositories")
            .await?;
        Ok(envelope.data)
    }

    /// Locate the single repository to operate on, optionally narrowed to `id`.
    pub async fn find_repository(
        &self,
        id: Option<&str>,
    ) -> Result<StagingRepository, StagehandError> {
        let mut candidates = self.profile_repositories().await?;
        if let Some(id) = id {
            candidates.retain(|r| r.repository_id == id);
        }
        match candidates.len() {
            0 => Err(StagehandError::NoRepositoriesFound {
                selector: id.map(|i| format!(" with id {i}")).unwrap_or_default(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(StagehandError::AmbiguousRepository {
                ids: candidates
                    .iter()
                    .map(|r| r.repository_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Current status of one repository.
    pub async fn repository(&self, id: &str) -> Result<StagingRepository, StagehandError> {
        self.get_json(
            &format!("staging/repository/{id}"),
            &format!("Fetching staging repository {id}"),
        )
        .await
    }

    /// Activity log of one repository.
    pub async fn repository_activity(
        &self,
        id: &str,
    ) -> Result<Vec<RepositoryActivity>, StagehandError> {
        self.get_json(
            &format!("staging/repository/{id}/activity"),
            &format!("Fetching activity of staging repository {id}"),
        )
        .await
    }

    async fn bulk(
        &self,
        action: &str,
        id: &str,
        auto_drop_after_release: Option<bool>,
    ) -> Result<reqwest::Response, StagehandError> {
        let description = format!("{action} by {}", client::USER_AGENT);
        let body = Data {
            data: BulkRequest {
                staged_repository_ids: vec![id],
                description: &description,
                auto_drop_after_release,
            },
        };
        self.post_json(
            &format!("staging/bulk/{action}"),
            &body,
            &format!("Bulk {action} of {id}"),
        )
        .await
    }

    /// Close `repository` and wait until Nexus reports it closed.
    ///
    /// Status fetch errors while waiting are logged and retried; only the
    /// overall timeout is fatal.
    pub async fn close_repository(
        &self,
        repository: &StagingRepository,
    ) -> Result<(), StagehandError> {
        let id = repository.repository_id.as_str();
        if repository.state != RepositoryState::Open {
            return Err(StagehandError::InvalidRepositoryState {
                id: id.to_string(),
                state: repository.describe(),
                expected: RepositoryState::Open.to_string(),
            });
        }

        let previous_closes = self.close_activity_count(id).await;

        let resp = self.bulk("close", id, None).await?;
        ensure_success(&format!("Closing staging repository {id}"), resp).await?;
        tracing::info!("Requested close of staging repository {id}");

        let started = Instant::now();
        let indicator = progress::poll_indicator(&format!("Closing {id}"));
        let mut last_state = repository.describe();
        loop {
            if started.elapsed() > self.close_timeout {
                indicator.finish_and_clear();
                return Err(StagehandError::CloseTimeout {
                    id: id.to_string(),
                    timeout: self.close_timeout,
                    last_state,
                });
            }

            tokio::time::sleep(self.poll_interval).await;

            match self.repository(id).await {
                Ok(current) => {
                    last_state = current.describe();
                    if current.is_settled(RepositoryState::Closed) {
                        indicator.finish_and_clear();
                        tracing::info!("Staging repository {id} closed");
                        return Ok(());
                    }
                    let settled_open = current.is_settled(RepositoryState::Open);
                    if let (true, Some(skip)) = (settled_open, previous_closes) {
                        if let Some(failures) = self.close_failures(id, skip).await {
                            indicator.finish_and_clear();
                            return Err(StagehandError::CloseFailed {
                                id: id.to_string(),
                                failures,
                            });
                        }
                    }
                }
                Err(e) => tracing::warn!("Polling staging repository {id} failed: {e}"),
            }
            indicator.tick();
        }
    }

    /// Number of close attempts already in the activity log. `None` when the
    /// log cannot be read; older failures are then indistinguishable from new
    /// ones, so only polling and the timeout decide the outcome.
    async fn close_activity_count(&self, id: &str) -> Option<usize> {
        match self.repository_activity(id).await {
            Ok(activity) => Some(activity.iter().filter(|a| a.name == "close").count()),
            Err(e) => {
                tracing::warn!("Could not read activity of {id} before closing: {e}");
                None
            }
        }
    }

    /// Rule failure messages from close attempts after the first `skip` ones,
    /// or `None` if there are none (or the log cannot be read right now).
    async fn close_failures(&self, id: &str, skip: usize) -> Option<String> {
        let activity = match self.repository_activity(id).await {
            Ok(activity) => activity,
            Err(e) => {
                tracing::warn!("Reading activity of staging repository {id} failed: {e}");
                return None;
            }
        };
        let messages: Vec<String> = activity
            .iter()
            .filter(|a| a.name == "close")
            .skip(skip)
            .flat_map(|a| a.events.iter())
            .filter(|e| e.name == "ruleFailed")
            .flat_map(|e| e.properties.iter())
            .filter(|p| p.name == "failureMessage")
            .map(|p| format!("  * {}", p.value))
            .collect();
        (!messages.is_empty()).then(|| messages.join("\n"))
    }

    /// Promote a closed repository; the server drops it afterwards.
    pub async fn release_repository(&self, id: &str) -> Result<(), StagehandError> {
        let resp = self.bulk("promote", id, Some(true)).await?;
        if !resp.status().is_success() {
            let (status, body) = client::status_and_body(resp).await;
            return Err(StagehandError::ReleaseFailed {
                id: id.to_string(),
                status,
                body,
            });
        }
        tracing::info!("Released staging repository {id}");
        Ok(())
    }

    /// Drop a repository that has not been released.
    pub async fn drop_repository(&self, id: &str) -> Result<(), StagehandError> {
        let resp = self.bulk("drop", id, None).await?;
        ensure_success(&format!("Dropping staging repository {id}"), resp).await?;
        tracing::info!("Dropped staging repository {id}");
        Ok(())
    }

    /// Close then release the selected repository, returning its id.
    ///
    /// A release failure leaves the repository closed; nothing is rolled back.
    pub async fn close_and_release(&self, id: Option<&str>) -> Result<String, StagehandError> {
        let repository = self.find_repository(id).await?;
        self.close_repository(&repository).await?;
        self.release_repository(&repository.repository_id).await?;
        Ok(repository.repository_id)
    }
}
