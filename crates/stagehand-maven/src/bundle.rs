//! Bundle packaging: one zip spanning every module's local Maven repository.

use std::fs::File;
use std::path::{Path, PathBuf};

use stagehand_util::errors::StagehandError;
use stagehand_util::fs::{ensure_dir, relative_slash_path};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Files whose name contains this marker are repository bookkeeping and are
/// regenerated by the server, so they never go into a bundle.
pub const METADATA_MARKER: &str = "maven-metadata";

/// A bundle written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub path: PathBuf,
    /// Archive entry names in the order they were written.
    pub entries: Vec<String>,
}

/// Files of one local repository that belong in a bundle, as
/// `(entry name, source path)` pairs in file-name order.
pub fn bundle_entries(root: &Path) -> Result<Vec<(String, PathBuf)>, StagehandError> {
    if !root.is_dir() {
        return Err(StagehandError::Bundle {
            message: format!("Local repository {} does not exist", root.display()),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| StagehandError::Bundle {
            message: format!("Failed to walk {}: {e}", root.display()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_string_lossy()
            .contains(METADATA_MARKER)
        {
            tracing::trace!("Skipping {}", entry.path().display());
            continue;
        }
        if let Some(name) = relative_slash_path(root, entry.path()) {
            entries.push((name, entry.path().to_path_buf()));
        }
    }
    Ok(entries)
}

/// Write every bundle entry of every repository in `roots`, in order, into
/// a zip at `output`. Entries carry a fixed timestamp so identical inputs
/// produce identical archives.
pub fn write_bundle<P: AsRef<Path>>(roots: &[P], output: &Path) -> Result<Bundle, StagehandError> {
    if let Some(parent) = output.parent() {
        ensure_dir(parent)?;
    }

    let file = File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut written = Vec::new();
    for root in roots {
        let root = root.as_ref();
        let entries = bundle_entries(root)?;
        tracing::debug!("Adding {} files from {}", entries.len(), root.display());
        for (name, source) in entries {
            zip.start_file(name.as_str(), options)
                .map_err(|e| zip_error(output, e))?;
            let mut input = File::open(&source)?;
            std::io::copy(&mut input, &mut zip)?;
            written.push(name);
        }
    }
    zip.finish().map_err(|e| zip_error(output, e))?;

    Ok(Bundle {
        path: output.to_path_buf(),
        entries: written,
    })
}

fn zip_error(output: &Path, err: zip::result::ZipError) -> StagehandError {
    StagehandError::Bundle {
        message: format!("Failed to write {}: {err}", output.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn zip_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect::<Vec<_>>()
    }

    #[test]
    fn bundles_all_files_except_metadata() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let dir = "com/example/lib/1.0.0";
        write(&repo, &format!("{dir}/lib-1.0.0.jar"), "jar");
        write(&repo, &format!("{dir}/lib-1.0.0.jar.asc"), "sig");
        write(&repo, &format!("{dir}/lib-1.0.0.pom"), "<project/>");
        write(&repo, "com/example/lib/maven-metadata.xml", "<metadata/>");
        write(&repo, "com/example/lib/maven-metadata.xml.sha1", "abc");

        let out = tmp.path().join("out").join("bundle.zip");
        let bundle = write_bundle(&[&repo], &out).unwrap();

        let expected = vec![
            format!("{dir}/lib-1.0.0.jar"),
            format!("{dir}/lib-1.0.0.jar.asc"),
            format!("{dir}/lib-1.0.0.pom"),
        ];
        assert_eq!(bundle.entries, expected);
        let mut names = zip_names(&out);
        names.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn keeps_project_order() {
        let tmp = TempDir::new().unwrap();
        let second = tmp.path().join("b");
        let first = tmp.path().join("a");
        write(&second, "org/zeta/z/1/z-1.jar", "z");
        write(&first, "org/alpha/a/1/a-1.jar", "a");

        let out = tmp.path().join("bundle.zip");
        let bundle = write_bundle(&[&second, &first], &out).unwrap();
        assert_eq!(
            bundle.entries,
            vec!["org/zeta/z/1/z-1.jar", "org/alpha/a/1/a-1.jar"]
        );
    }

    #[test]
    fn content_survives() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        write(&repo, "g/a/1/a-1.pom", "<project>pom</project>");
        let out = tmp.path().join("bundle.zip");
        write_bundle(&[&repo], &out).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut entry = archive.by_name("g/a/1/a-1.pom").unwrap();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
        assert_eq!(content, "<project>pom</project>");
    }

    #[test]
    fn identical_inputs_give_identical_archives() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        write(&repo, "g/a/1/a-1.jar", "jar");
        write(&repo, "g/a/1/a-1.pom", "pom");
        let one = tmp.path().join("one.zip");
        let two = tmp.path().join("two.zip");
        write_bundle(&[&repo], &one).unwrap();
        write_bundle(&[&repo], &two).unwrap();
        assert_eq!(std::fs::read(one).unwrap(), std::fs::read(two).unwrap());
    }

    #[test]
    fn missing_repository_fails() {
        let tmp = TempDir::new().unwrap();
        let err = write_bundle(&[tmp.path().join("nope")], &tmp.path().join("b.zip")).unwrap_err();
        assert!(matches!(err, StagehandError::Bundle { .. }));
    }
}
