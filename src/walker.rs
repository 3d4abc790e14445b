//! Upload planning: CDN key derivation and directory traversal
//!
//! A directory is mapped onto one [`UploadTarget`] per regular file, keyed as
//! `{base_key}/{relative/path}`. Traversal is depth-first with siblings sorted
//! by file name, so the same tree always yields the same plan.

use crate::models::UploadTarget;
use crate::{Error, Result};
use std::path::Path;
use walkdir::WalkDir;

pub fn join_key(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment)
}

/// Key for a path given without an explicit key: its final segment.
pub fn derive_key(path: &Path) -> Result<String> {
    let name = match path.file_name() {
        Some(name) => name.to_os_string(),
        None => path
            .canonicalize()
            .map_err(|e| Error::invalid_path(path, e))?
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "Cannot derive a key from {}, please pass one explicitly",
                    path.display()
                ))
            })?,
    };

    name.into_string()
        .map_err(|_| Error::invalid_path(path, "file name is not valid UTF-8"))
}

/// Plan every file under `path`. A single file maps to `base_key` itself.
pub fn plan_uploads(path: &Path, base_key: &str) -> Result<Vec<UploadTarget>> {
    if base_key.trim().is_empty() {
        return Err(Error::Configuration("Key cannot be empty".to_string()));
    }

    let metadata = std::fs::metadata(path).map_err(|e| Error::invalid_path(path, e))?;
    if metadata.is_file() {
        return Ok(vec![UploadTarget {
            key: base_key.to_string(),
            path: path.to_path_buf(),
        }]);
    }
    if !metadata.is_dir() {
        return Err(Error::invalid_path(path, "not a regular file or directory"));
    }

    let mut targets = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let failed = e.path().unwrap_or(path).to_path_buf();
            Error::invalid_path(&failed, e)
        })?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            return Err(Error::invalid_path(
                entry.path(),
                "not a regular file or directory",
            ));
        }

        let relative = entry
            .path()
            .strip_prefix(path)
            .map_err(|e| Error::invalid_path(entry.path(), e))?;
        let mut segments = Vec::new();
        for component in relative.components() {
            let segment = component.as_os_str().to_str().ok_or_else(|| {
                Error::invalid_path(entry.path(), "file name is not valid UTF-8")
            })?;
            segments.push(segment);
        }

        targets.push(UploadTarget {
            key: join_key(base_key, &segments.join("/")),
            path: entry.into_path(),
        });
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn keys(targets: &[UploadTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("dist", "a.txt"), "dist/a.txt");
        assert_eq!(join_key("dist/", "sub/b.txt"), "dist/sub/b.txt");
    }

    #[test]
    fn test_derive_key_from_final_segment() {
        assert_eq!(derive_key(Path::new("out/report.txt")).unwrap(), "report.txt");
        assert_eq!(derive_key(Path::new("dist/")).unwrap(), "dist");
    }

    #[test]
    fn test_derive_key_for_parent_reference_uses_canonical_name() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("site");
        fs::create_dir_all(inner.join("nested")).unwrap();

        let parent_ref = inner.join("nested").join("..");
        assert_eq!(derive_key(&parent_ref).unwrap(), "site");
    }

    #[test]
    fn test_single_file_uses_base_key() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("report.txt");
        fs::write(&file, b"0123456789").unwrap();

        let plan = plan_uploads(&file, "custom/key.txt").unwrap();
        assert_eq!(
            plan,
            vec![UploadTarget {
                key: "custom/key.txt".to_string(),
                path: file
            }]
        );
    }

    #[test]
    fn test_nested_files_keep_relative_structure() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("dist");
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a/b/f"), b"f").unwrap();
        fs::write(root.join("z.txt"), b"z").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("sub/b.txt"), b"b").unwrap();

        let plan = plan_uploads(&root, "dist").unwrap();
        assert_eq!(
            keys(&plan),
            vec!["dist/a/b/f", "dist/a.txt", "dist/sub/b.txt", "dist/z.txt"]
        );
        assert_eq!(plan[0].path, root.join("a/b/f"));

        let again = plan_uploads(&root, "dist").unwrap();
        assert_eq!(plan, again);
    }

    #[test]
    fn test_empty_tree_plans_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("only/dirs")).unwrap();

        let plan = plan_uploads(dir.path(), "empty").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_key_is_configuration_error() {
        let dir = tempdir().unwrap();
        let err = plan_uploads(dir.path(), " ").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_missing_path_is_invalid() {
        let dir = tempdir().unwrap();
        let err = plan_uploads(&dir.path().join("nope"), "k").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_in_tree_aborts_plan() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("dist");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("link.txt")).unwrap();

        let err = plan_uploads(&root, "dist").unwrap_err();
        match err {
            Error::InvalidPath { path, .. } => assert!(path.ends_with("link.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
