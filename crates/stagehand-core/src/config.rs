use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stagehand_util::errors::StagehandError;

use crate::credentials::Credentials;
use crate::properties::interpolate;

/// Central Portal API root.
pub const DEFAULT_PORTAL_URL: &str = "https://central.sonatype.com/api/v1";

/// Legacy OSSRH Nexus REST root.
pub const DEFAULT_NEXUS_URL: &str = "https://s01.oss.sonatype.org/service/local";

/// Global user configuration loaded from `~/.stagehand/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub nexus: NexusConfig,
}

/// `[credentials]`, values may contain `${env:VAR}` references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// How the portal token is presented in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: UserToken <token>`
    UserToken,
}

/// `[portal]` settings for the deployment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_portal_url", rename = "base-url")]
    pub base_url: String,
    #[serde(default, rename = "auth-scheme")]
    pub auth_scheme: AuthScheme,
    #[serde(default = "default_portal_poll", rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout", rename = "validation-timeout-secs")]
    pub validation_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_url(),
            auth_scheme: AuthScheme::default(),
            poll_interval_secs: default_portal_poll(),
            validation_timeout_secs: default_timeout(),
        }
    }
}

impl PortalConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }
}

/// `[nexus]` settings for the legacy staging workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NexusConfig {
    #[serde(default = "default_nexus_url", rename = "base-url")]
    pub base_url: String,
    /// Staging profile id or name; resolved from the group when absent.
    #[serde(default)]
    pub profile: Option<String>,
    /// Staging repository id to operate on when several are open.
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default = "default_nexus_poll", rename = "poll-interval-secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout", rename = "close-timeout-secs")]
    pub close_timeout_secs: u64,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            base_url: default_nexus_url(),
            profile: None,
            repository: None,
            poll_interval_secs: default_nexus_poll(),
            close_timeout_secs: default_timeout(),
        }
    }
}

impl NexusConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

fn default_portal_url() -> String {
    DEFAULT_PORTAL_URL.to_string()
}

fn default_nexus_url() -> String {
    DEFAULT_NEXUS_URL.to_string()
}

fn default_portal_poll() -> u64 {
    5
}

fn default_nexus_poll() -> u64 {
    10
}

fn default_timeout() -> u64 {
    15 * 60
}

impl GlobalConfig {
    /// Load configuration from `path`, or from `~/.stagehand/config.toml` when
    /// `path` is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, StagehandError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };
        if !path.is_file() {
            if explicit {
                return Err(StagehandError::Configuration {
                    message: format!("Config file {} does not exist", path.display()),
                });
            }
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| StagehandError::Configuration {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content).map_err(|e| StagehandError::Configuration {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Resolve credentials: explicit overrides first, then the interpolated
    /// `[credentials]` table.
    pub fn credentials(
        &self,
        env: &BTreeMap<String, String>,
        username_override: Option<String>,
        password_override: Option<String>,
    ) -> Result<Credentials, StagehandError> {
        let username = username_override.or_else(|| {
            self.credentials
                .username
                .as_deref()
                .map(|u| interpolate(u, env))
        });
        let password = password_override.or_else(|| {
            self.credentials
                .password
                .as_deref()
                .map(|p| interpolate(p, env))
        });
        Credentials::resolve(username, password)
    }
}

/// Returns the path to the stagehand data directory (`~/.stagehand/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".stagehand")
}
