use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        tracing::trace!("Creating {}", path.display());
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Render `path` relative to `root` using `/` separators, as archive entry
/// names require.
///
/// Returns `None` when `path` is not inside `root`.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Path of the bundle staged for upload: `<build_dir>/publish/<name>-<stamp>.zip`.
pub fn staged_bundle_path(build_dir: &Path, name: &str, stamp: &str) -> PathBuf {
    build_dir.join("publish").join(format!("{name}-{stamp}.zip"))
}
