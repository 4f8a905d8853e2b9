//! Shared HTTP plumbing for the staging and portal clients.

use std::time::Duration;

use reqwest::{Client, Response};
use stagehand_util::errors::StagehandError;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("stagehand/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Build a reqwest client with the stagehand user agent and request timeout.
pub fn build_client() -> Result<Client, StagehandError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| StagehandError::Network {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Join a base URL and a relative API path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a transport-level failure for `operation` to a network error.
pub fn network_error(operation: &str, err: reqwest::Error) -> StagehandError {
    StagehandError::Network {
        message: format!("{operation}: {err}"),
    }
}

/// Pass successful responses through; turn anything else into
/// [`StagehandError::RemoteRejected`] carrying the status and body.
pub async fn ensure_success(operation: &str, resp: Response) -> Result<Response, StagehandError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let (status, body) = status_and_body(resp).await;
    Err(StagehandError::RemoteRejected {
        operation: operation.to_string(),
        status,
        body,
    })
}

/// Consume a response, returning its status code and body text.
pub async fn status_and_body(resp: Response) -> (u16, String) {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    (status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://host/api/v1/", "/publisher/upload"),
            "https://host/api/v1/publisher/upload"
        );
        assert_eq!(
            join_url("https://host/service/local", "staging/profiles"),
            "https://host/service/local/staging/profiles"
        );
    }

    #[test]
    fn user_agent_names_tool() {
        assert!(USER_AGENT.starts_with("stagehand/"));
    }
}
