use std::path::Path;

use stagehand_util::fs::{ensure_dir, relative_slash_path, staged_bundle_path};
use tempfile::TempDir;

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y").join("z");
    assert!(!deep.exists());
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
}

#[test]
fn test_ensure_dir_idempotent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("already");
    std::fs::create_dir(&dir).unwrap();
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn test_relative_slash_path_nested() {
    let root = Path::new("/tmp/repo");
    let file = root.join("com").join("example").join("lib-1.0.jar");
    assert_eq!(
        relative_slash_path(root, &file).as_deref(),
        Some("com/example/lib-1.0.jar")
    );
}

#[test]
fn test_relative_slash_path_outside_root() {
    let root = Path::new("/tmp/repo");
    assert_eq!(relative_slash_path(root, Path::new("/etc/passwd")), None);
}

#[test]
fn test_relative_slash_path_root_itself() {
    let root = Path::new("/tmp/repo");
    assert_eq!(relative_slash_path(root, root), None);
}

#[test]
fn test_staged_bundle_path_layout() {
    let path = staged_bundle_path(Path::new("/build"), "com.example-1.0", "1700000000000");
    assert_eq!(
        path,
        Path::new("/build/publish/com.example-1.0-1700000000000.zip")
    );
}
