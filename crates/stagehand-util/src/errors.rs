use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all stagehand operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StagehandError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid local configuration (credentials, profile, paths).
    #[error("Configuration error: {message}")]
    #[diagnostic(help(
        "Check ~/.stagehand/config.toml or pass --username/--password on the command line"
    ))]
    Configuration { message: String },

    /// The account has no staging profiles at all.
    #[error("No staging profiles found for this account")]
    #[diagnostic(help("Make sure the account has been granted publishing rights for a namespace"))]
    NoProfilesFound,

    /// None of the account's staging profiles covers the requested group.
    #[error("No staging profile matches group '{group}'. Available profiles: {available}")]
    #[diagnostic(help("Set `nexus.profile` to one of the available profiles"))]
    NoMatchingProfile { group: String, available: String },

    /// Repository discovery came back empty.
    #[error("No staging repositories found{selector}")]
    NoRepositoriesFound { selector: String },

    /// Repository discovery found more than one candidate.
    #[error("Found multiple staging repositories: {ids}")]
    #[diagnostic(help("Pass --repository <id> to select one of them"))]
    AmbiguousRepository { ids: String },

    /// A staging repository is not in the state an operation requires.
    #[error("Staging repository {id} is '{state}', expected '{expected}'")]
    InvalidRepositoryState {
        id: String,
        state: String,
        expected: String,
    },

    /// Closing a staging repository did not finish in time.
    #[error(
        "Timed out after {timeout:?} waiting for staging repository {id} to close. Last known state: {last_state}"
    )]
    #[diagnostic(help("The repository may still be closing; check it in the Nexus UI"))]
    CloseTimeout {
        id: String,
        timeout: Duration,
        last_state: String,
    },

    /// Nexus rejected the repository during close (rule failures).
    #[error("Closing staging repository {id} failed:\n{failures}")]
    CloseFailed { id: String, failures: String },

    /// Promoting a closed repository was rejected.
    #[error("Releasing staging repository {id} failed with HTTP {status}: {body}")]
    ReleaseFailed {
        id: String,
        status: u16,
        body: String,
    },

    /// Any other non-2xx response from a remote service.
    #[error("{operation} failed with HTTP {status}: {body}")]
    RemoteRejected {
        operation: String,
        status: u16,
        body: String,
    },

    /// Network request failed before a response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The portal refused a bundle upload.
    #[error("Uploading bundle failed with HTTP {status}: {body}")]
    UploadFailed { status: u16, body: String },

    /// A deployment reached the FAILED state.
    #[error("Deployment {deployment_id} failed validation:\n{details}")]
    ValidationFailed {
        deployment_id: String,
        details: String,
    },

    /// A deployment did not leave the validation phase in time.
    #[error(
        "Deployment {deployment_id} was not validated within {timeout:?}. Last known state: {last_state}"
    )]
    #[diagnostic(help("The deployment may still be validating; check it on the Central Portal"))]
    ValidationTimeout {
        deployment_id: String,
        timeout: Duration,
        last_state: String,
    },

    /// Assembling the upload bundle failed.
    #[error("Bundle error: {message}")]
    Bundle { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
