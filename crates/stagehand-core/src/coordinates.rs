use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stagehand_util::errors::StagehandError;

/// Version suffix marking a snapshot build. Snapshots never go through a release.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// `group:artifactId:version` of a module being released to Maven Central.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenCentralCoordinates {
    pub group: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenCentralCoordinates {
    pub fn new(
        group: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }
}

impl fmt::Display for MavenCentralCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact_id, self.version)
    }
}

impl FromStr for MavenCentralCoordinates {
    type Err = StagehandError;

    /// Parse `group:artifact:version`. Every part must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [g, a, v] if !g.is_empty() && !a.is_empty() && !v.is_empty() => {
                Ok(Self::new(*g, *a, *v))
            }
            _ => Err(StagehandError::Configuration {
                message: format!("Invalid coordinates '{s}', expected group:artifact:version"),
            }),
        }
    }
}
