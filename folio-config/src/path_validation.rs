//! Traversal-safe path resolution.
//!
//! Every resolver that touches the disk (manifest loader, bundled-library
//! resolver, asset-directory scanner) resolves file locations through this
//! module so that a served font file can never live outside its declared root.
//!
//! Two layers of checking are applied:
//! - a lexical pass that rejects absolute paths and `..` components climbing
//!   above the root, which works for files that do not exist yet;
//! - a canonical pass (`std::fs::canonicalize`) for files that exist, so that
//!   symlinks pointing outside the root are caught as well.

use crate::error::{ConfigError, TraversalKind};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve a relative path declared in some document (a manifest entry, a
/// package module specifier) against `root`.
///
/// Backslashes are treated as separators so that documents authored on
/// Windows resolve the same way everywhere.
///
/// Returns the canonical path when the target exists, or the lexically joined
/// path when it does not (callers decide whether a missing file is fatal).
///
/// # Errors
///
/// Returns `ConfigError::PathTraversal` when `relative` is absolute or climbs
/// out of `root`, `ConfigError::Validation` when it is empty, and
/// `ConfigError::Io` if an existing target cannot be canonicalized.
pub fn resolve_within_root(root: &Path, relative: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = relative.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(format!(
            "empty path cannot be resolved under '{}'",
            root.display()
        )));
    }

    let unified = trimmed.replace('\\', "/");
    let mut clean = PathBuf::new();
    let mut depth = 0usize;

    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => {
                clean.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(ConfigError::traversal(
                        relative,
                        root,
                        TraversalKind::ClimbsAboveRoot,
                    ));
                }
                clean.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::traversal(
                    relative,
                    root,
                    TraversalKind::Absolute,
                ));
            }
        }
    }

    if depth == 0 {
        return Err(ConfigError::Validation(format!(
            "path '{relative}' resolves to the root '{}' itself",
            root.display()
        )));
    }

    let joined = root.join(clean);
    if joined.exists() {
        validate_existing_path(&joined, root)
    } else {
        Ok(joined)
    }
}

/// Validate that `path` (which must already exist on disk) resolves, via
/// `canonicalize`, to a location inside `root`.
///
/// Symlinks are fully resolved before the containment check. Returns the
/// canonical path on success.
///
/// # Errors
///
/// Returns `ConfigError::PathTraversal` when the canonical path does not start
/// with the canonical `root`, and `ConfigError::Io` if `path` cannot be
/// canonicalized.
pub fn validate_existing_path(path: &Path, root: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = fs::canonicalize(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("cannot canonicalize {}: {e}", path.display()),
        )
    })?;

    // A root that cannot be canonicalized is compared as written.
    let canonical_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    if !canonical.starts_with(&canonical_root) {
        log::debug!(
            "{:?} canonicalizes to {:?}, outside {:?}",
            path,
            canonical,
            canonical_root
        );
        return Err(ConfigError::traversal(
            path,
            canonical_root,
            TraversalKind::ResolvesOutside,
        ));
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_existing_file_under_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pretendard")).unwrap();
        fs::write(dir.path().join("pretendard/regular.woff2"), b"wOF2").unwrap();

        let resolved = resolve_within_root(dir.path(), "pretendard/regular.woff2").unwrap();
        assert_eq!(
            resolved,
            fs::canonicalize(dir.path().join("pretendard/regular.woff2")).unwrap()
        );
    }

    #[test]
    fn test_missing_file_returns_joined_path() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_within_root(dir.path(), "./a/b/../c.ttf").unwrap();
        assert_eq!(resolved, dir.path().join("a/c.ttf"));
    }

    #[test]
    fn test_rejects_parent_escape() {
        let dir = TempDir::new().unwrap();
        let err = resolve_within_root(dir.path(), "../../outside").unwrap_err();
        assert!(err.is_traversal(), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_escape_after_descending() {
        let dir = TempDir::new().unwrap();
        let err = resolve_within_root(dir.path(), "fonts/../../secret.ttf").unwrap_err();
        assert!(err.is_traversal());
    }

    #[test]
    fn test_rejects_backslash_escape() {
        let dir = TempDir::new().unwrap();
        let err = resolve_within_root(dir.path(), "..\\..\\outside.ttf").unwrap_err();
        assert!(err.is_traversal());
    }

    #[test]
    fn test_rejects_absolute_path() {
        let dir = TempDir::new().unwrap();
        let err = resolve_within_root(dir.path(), "/etc/passwd").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PathTraversal {
                kind: TraversalKind::Absolute,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_empty_and_root_only() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            resolve_within_root(dir.path(), "   "),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            resolve_within_root(dir.path(), "a/.."),
            Err(ConfigError::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_escape() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.ttf"), b"OTTO").unwrap();

        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.ttf"),
            root.path().join("linked.ttf"),
        )
        .unwrap();

        let err = resolve_within_root(root.path(), "linked.ttf").unwrap_err();
        match err {
            ConfigError::PathTraversal { kind, path, .. } => {
                assert_eq!(kind, TraversalKind::ResolvesOutside);
                assert!(path.ends_with("linked.ttf"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_existing_path_requires_existence() {
        let dir = TempDir::new().unwrap();
        let err = validate_existing_path(&dir.path().join("nope.ttf"), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
