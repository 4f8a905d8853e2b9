//! Local Maven repository layout as written by a module's local publish step.

use std::path::{Path, PathBuf};

use stagehand_core::coordinates::MavenCentralCoordinates;

/// A module's locally staged Maven repository tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this repository.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Standard Maven layout path for a given coordinate.
    ///
    /// `org.jetbrains.kotlinx:kotlinx-coroutines-core:1.8.0` becomes
    /// `org/jetbrains/kotlinx/kotlinx-coroutines-core/1.8.0`
    pub fn coordinate_path(coords: &MavenCentralCoordinates) -> String {
        format!(
            "{}/{}/{}",
            coords.group.replace('.', "/"),
            coords.artifact_id,
            coords.version
        )
    }

    /// Directory holding the files of one published version.
    pub fn artifact_dir(&self, coords: &MavenCentralCoordinates) -> PathBuf {
        self.root.join(Self::coordinate_path(coords))
    }

    /// Whether the local publish step has produced anything for `coords`.
    pub fn contains(&self, coords: &MavenCentralCoordinates) -> bool {
        self.artifact_dir(coords).is_dir()
    }
}
