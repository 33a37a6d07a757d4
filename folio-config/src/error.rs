//! Typed error variants for the folio-config crate.
//!
//! Besides config file I/O and validation, this covers the containment checks
//! every disk-touching font resolver goes through. Traversal rejections carry
//! the offending path and root so resolvers can log them and move on.

use std::fmt;
use std::path::PathBuf;

/// How a path escaped its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalKind {
    /// An absolute path (or drive prefix) where a relative one was required.
    Absolute,
    /// A `..` component climbing above the root.
    ClimbsAboveRoot,
    /// The canonical form (after following symlinks) lies outside the root.
    ResolvesOutside,
}

impl fmt::Display for TraversalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalKind::Absolute => "absolute path not allowed",
            TraversalKind::ClimbsAboveRoot => "climbs above the root",
            TraversalKind::ResolvesOutside => "resolves outside the root",
        })
    }
}

/// Errors from loading the service config or validating paths.
///
/// # Example
///
/// ```rust,no_run
/// use folio_config::{ConfigError, resolve_within_root};
/// use std::path::Path;
///
/// match resolve_within_root(Path::new("/srv/fonts"), "../etc/passwd") {
///     Ok(path) => println!("serving {}", path.display()),
///     Err(ConfigError::PathTraversal { kind, .. }) => eprintln!("rejected: {kind}"),
///     Err(other) => eprintln!("unusable: {other}"),
/// }
/// ```
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file or canonicalizing a path failed.
    Io(std::io::Error),

    /// The config file is not valid YAML for `FontServiceConfig`.
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    /// A field value or path argument is unusable.
    Validation(String),

    /// A path is not contained in its allowed root.
    PathTraversal {
        /// The path as declared (or discovered)
        path: PathBuf,
        root: PathBuf,
        kind: TraversalKind,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config file '{}': {source}", path.display())
            }
            ConfigError::Validation(msg) => write!(f, "invalid config: {msg}"),
            ConfigError::PathTraversal { path, root, kind } => write!(
                f,
                "path '{}' rejected under root '{}': {kind}",
                path.display(),
                root.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Validation(_) | ConfigError::PathTraversal { .. } => None,
        }
    }
}

impl ConfigError {
    /// Whether this error is a containment failure rather than an I/O problem.
    pub fn is_traversal(&self) -> bool {
        matches!(self, ConfigError::PathTraversal { .. })
    }

    pub(crate) fn traversal(
        path: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        kind: TraversalKind,
    ) -> Self {
        ConfigError::PathTraversal {
            path: path.into(),
            root: root.into(),
            kind,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
