//! Font service configuration and candidate-path computation.
//!
//! Covers:
//! - `FontServiceConfig` (YAML loadable, environment overridable)
//! - Manifest candidate paths in precedence order (`manifest_candidates`)
//! - Asset roots for the directory scanner (`asset_root_candidates`)
//! - Package roots for library-shipped font modules (`package_roots`)

use crate::defaults;
use crate::env_vars;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the font service looks for fonts and how it serves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontServiceConfig {
    /// Resource scheme the protocol handler is registered for
    #[serde(default = "defaults::scheme")]
    pub scheme: String,

    /// Explicit manifest file, tried before every conventional location
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// Packaged application resources directory
    #[serde(default)]
    pub resource_dir: Option<PathBuf>,

    /// Base directory for working-directory-relative lookups
    #[serde(default)]
    pub working_dir: PathBuf,

    /// Extra asset roots, scanned before the conventional ones
    #[serde(default)]
    pub asset_roots: Vec<PathBuf>,

    /// Extra package roots for library-shipped font modules
    #[serde(default)]
    pub package_dirs: Vec<PathBuf>,
}

impl Default for FontServiceConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl FontServiceConfig {
    /// Create a config rooted at `working_dir` without consulting the environment.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            scheme: defaults::scheme(),
            manifest_path: None,
            resource_dir: None,
            working_dir: working_dir.into(),
            asset_roots: Vec::new(),
            package_dirs: Vec::new(),
        }
    }

    /// Build a config from the running process: current directory, the
    /// `resources` directory next to the executable (when present), and the
    /// environment overrides.
    pub fn from_env() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::new(working_dir);
        config.resource_dir = Self::packaged_resource_dir();
        config.apply_env_overrides();
        config
    }

    /// Load a YAML config file, then apply environment overrides on top.
    ///
    /// A relative `working_dir` (or none) is taken relative to the directory
    /// holding the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading font service config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let mut config: FontServiceConfig =
            serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if config.working_dir.as_os_str().is_empty() || config.working_dir.is_relative() {
            config.working_dir = base.join(&config.working_dir);
        }
        if config.resource_dir.is_none() {
            config.resource_dir = Self::packaged_resource_dir();
        }

        config.validate()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values the service cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = self.scheme.trim();
        let valid = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid {
            return Err(ConfigError::Validation(format!(
                "scheme '{}' is not a valid URL scheme",
                self.scheme
            )));
        }
        Ok(())
    }

    /// Apply `FOLIO_FONT_MANIFEST` and `FOLIO_FONT_DIRS`.
    ///
    /// Environment asset roots are placed ahead of configured ones.
    pub fn apply_env_overrides(&mut self) {
        if let Some(manifest) = env_vars::manifest_override_from_env() {
            log::info!("Manifest override from environment: {:?}", manifest);
            self.manifest_path = Some(manifest);
        }
        let env_dirs = env_vars::font_dirs_from_env();
        if !env_dirs.is_empty() {
            log::info!("Asset roots from environment: {:?}", env_dirs);
            let mut roots = env_dirs;
            roots.append(&mut self.asset_roots);
            self.asset_roots = roots;
        }
    }

    /// Builder: set the explicit manifest path.
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    /// Builder: set the packaged resource directory.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    /// Builder: append an asset root.
    pub fn with_asset_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_roots.push(dir.into());
        self
    }

    /// Builder: append a package root.
    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dirs.push(dir.into());
        self
    }

    /// Builder: override the resource scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Base directories in lookup precedence: packaged resources first, then
    /// the working directory.
    fn base_dirs(&self) -> Vec<&Path> {
        let mut bases = Vec::with_capacity(2);
        if let Some(resource) = &self.resource_dir {
            bases.push(resource.as_path());
        }
        bases.push(self.working_dir.as_path());
        bases
    }

    /// Manifest file candidates in precedence order.
    ///
    /// The explicit override comes first; then every conventional directory
    /// under the resource dir and the working dir, each combined with every
    /// conventional manifest file name.
    pub fn manifest_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(explicit) = &self.manifest_path {
            candidates.push(self.absolutize(explicit));
        }
        for base in self.base_dirs() {
            for suffix in defaults::MANIFEST_DIR_SUFFIXES {
                let dir = if suffix.is_empty() {
                    base.to_path_buf()
                } else {
                    base.join(suffix)
                };
                for name in defaults::MANIFEST_FILE_NAMES {
                    candidates.push(dir.join(name));
                }
            }
        }
        dedup_paths(candidates)
    }

    /// Asset roots for the directory scanner, de-duplicated, order preserving.
    pub fn asset_root_candidates(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .asset_roots
            .iter()
            .map(|p| self.absolutize(p))
            .collect();
        for base in self.base_dirs() {
            for suffix in defaults::ASSET_DIR_SUFFIXES {
                roots.push(base.join(suffix));
            }
        }
        dedup_paths(roots)
    }

    /// Package roots library-shipped font modules are resolved against.
    pub fn package_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .package_dirs
            .iter()
            .map(|p| self.absolutize(p))
            .collect();
        for base in self.base_dirs() {
            roots.push(base.join(defaults::PACKAGE_DIR_NAME));
        }
        dedup_paths(roots)
    }

    /// Resolve a possibly relative path against the working directory.
    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Per-user configuration directory (`~/.config/folio`, or the platform
    /// config dir on Windows).
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("folio")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("folio")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Config file loaded when no explicit path is given.
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join(defaults::CONFIG_FILE_NAME)
    }

    /// `<exe dir>/resources`, or `<exe dir>/../Resources` in a macOS bundle.
    fn packaged_resource_dir() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        let exe_dir = exe.parent()?;
        [
            exe_dir.join("resources"),
            exe_dir.join("..").join("Resources"),
        ]
        .into_iter()
        .find(|p| p.is_dir())
    }
}

/// Drop repeated paths, keeping the first occurrence. Existing paths are
/// compared by their canonical form so `a/../b` and `b` collapse.
fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| {
            let key = fs::canonicalize(p).unwrap_or_else(|_| p.clone());
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FontServiceConfig::new("/work");
        assert_eq!(config.scheme, "folio-font");
        assert!(config.manifest_path.is_none());
        assert!(config.asset_roots.is_empty());
    }

    #[test]
    fn test_manifest_candidates_precedence() {
        let config = FontServiceConfig::new("/work")
            .with_resource_dir("/app/resources")
            .with_manifest_path("custom/manifest.json");
        let candidates = config.manifest_candidates();

        assert_eq!(candidates[0], PathBuf::from("/work/custom/manifest.json"));
        assert_eq!(
            candidates[1],
            PathBuf::from("/app/resources/fonts/font-manifest.json")
        );
        let first_work = candidates
            .iter()
            .position(|p| p.starts_with("/work/fonts"))
            .unwrap();
        let last_resource = candidates
            .iter()
            .rposition(|p| p.starts_with("/app/resources"))
            .unwrap();
        assert!(last_resource < first_work);
    }

    #[test]
    fn test_asset_roots_dedup_keeps_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        let config = FontServiceConfig::new(dir.path())
            .with_asset_root(dir.path().join("fonts"))
            .with_asset_root(dir.path().join("x/../fonts"));
        let roots = config.asset_root_candidates();

        assert_eq!(roots[0], dir.path().join("fonts"));
        let canonical_fonts = fs::canonicalize(dir.path().join("fonts")).ok();
        let count = roots
            .iter()
            .filter(|p| fs::canonicalize(p).ok() == canonical_fonts)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_package_roots() {
        let config = FontServiceConfig::new("/work").with_package_dir("/opt/pkgs");
        assert_eq!(
            config.package_roots(),
            vec![PathBuf::from("/opt/pkgs"), PathBuf::from("/work/node_modules")]
        );
    }

    #[test]
    fn test_load_yaml_relative_working_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fonts.yaml");
        fs::write(
            &path,
            "scheme: my-fonts\nworking_dir: project\nasset_roots:\n  - extra\n",
        )
        .unwrap();

        let config = FontServiceConfig::load(&path).unwrap();
        assert_eq!(config.scheme, "my-fonts");
        assert_eq!(config.working_dir, dir.path().join("project"));
        assert!(
            config
                .asset_root_candidates()
                .contains(&dir.path().join("project/extra"))
        );
    }

    #[test]
    fn test_load_rejects_bad_scheme() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fonts.yaml");
        fs::write(&path, "scheme: \"9 bad\"\n").unwrap();
        assert!(matches!(
            FontServiceConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fonts.yaml");
        fs::write(&path, "scheme: [unterminated\n").unwrap();
        assert!(matches!(
            FontServiceConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
