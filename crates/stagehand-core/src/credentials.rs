use std::fmt;

use stagehand_util::errors::StagehandError;

/// A resolved username/password pair for the repository service.
///
/// For the Central Portal these are the user token's name and secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials from optional parts, failing before any network call
    /// when either half is missing or blank.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, StagehandError> {
        let username = username.filter(|u| !u.trim().is_empty());
        let password = password.filter(|p| !p.trim().is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            (None, _) => Err(StagehandError::Configuration {
                message: "No username configured for the repository service".to_string(),
            }),
            (Some(_), None) => Err(StagehandError::Configuration {
                message: "No password configured for the repository service".to_string(),
            }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}
