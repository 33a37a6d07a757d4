//! Display metadata overlay for font sources that carry no metadata.
//!
//! Lookup priority for a folder/key name:
//! 1. An explicit override map, built once per discovery run from the
//!    root-level override files of every asset root.
//! 2. A per-folder override file (JSON or plain-text name), read lazily and
//!    cached per directory.
//! 3. Nothing: the caller infers a name.
//!
//! Malformed override content is logged and ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use folio_config::defaults::{FOLDER_NAME_FILES, FOLDER_OVERRIDE_FILES, ROOT_OVERRIDE_FILES};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::font_service::FontCategory;
use crate::normalize::sanitize_token;

/// Label and category supplied for a font source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOverride {
    pub display_name: Option<String>,
    pub category: Option<FontCategory>,
}

impl DisplayOverride {
    fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.category.is_none()
    }
}

/// On-disk shape of one override entry. A bare string is a display name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOverride {
    Name(String),
    Entry(RawEntry),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "label")]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl From<RawOverride> for DisplayOverride {
    fn from(raw: RawOverride) -> Self {
        match raw {
            RawOverride::Name(name) => DisplayOverride {
                display_name: non_blank(name),
                category: None,
            },
            RawOverride::Entry(entry) => DisplayOverride {
                display_name: entry.display_name.or(entry.name).and_then(non_blank),
                category: entry
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(FontCategory::parse),
            },
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Overlay resolver for family display metadata.
#[derive(Debug, Default)]
pub struct DisplayMetadataResolver {
    overrides: HashMap<String, DisplayOverride>,
    folder_cache: Mutex<HashMap<PathBuf, Option<DisplayOverride>>>,
}

impl DisplayMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the explicit override map from the root-level override files of
    /// every asset root, in root order.
    pub fn from_asset_roots(roots: &[PathBuf]) -> Self {
        let mut resolver = Self::new();
        for root in roots {
            for name in ROOT_OVERRIDE_FILES {
                let path = root.join(name);
                if path.is_file() {
                    resolver.load_override_file(&path);
                }
            }
        }
        resolver
    }

    /// Merge one root-level override file into the explicit map.
    fn load_override_file(&mut self, path: &Path) {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read font override file {:?}: {}", path, e);
                return;
            }
        };
        let entries: HashMap<String, RawOverride> = match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Ignoring malformed font override file {:?}: {}", path, e);
                return;
            }
        };
        log::debug!(
            "Loaded {} display override(s) from {:?}",
            entries.len(),
            path
        );
        // Sorted so that collisions between keys of one file resolve the same way every run.
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, raw) in entries {
            self.register(&key, raw.into());
        }
    }

    /// Register an override under the raw key, its sanitized form and its
    /// lowercase form. The first registration of a key wins.
    pub fn register(&mut self, key: &str, value: DisplayOverride) {
        if value.is_empty() {
            return;
        }
        for form in key_forms(key) {
            self.overrides.entry(form).or_insert_with(|| value.clone());
        }
    }

    /// Number of keys in the explicit override map.
    pub fn explicit_len(&self) -> usize {
        self.overrides.len()
    }

    /// Look up display metadata for `key`, optionally backed by a family folder.
    pub fn resolve(&self, key: &str, folder: Option<&Path>) -> Option<DisplayOverride> {
        for form in key_forms(key) {
            if let Some(found) = self.overrides.get(&form) {
                return Some(found.clone());
            }
        }
        folder.and_then(|dir| self.folder_override(dir))
    }

    /// Per-folder override, read at most once per directory.
    fn folder_override(&self, dir: &Path) -> Option<DisplayOverride> {
        if let Some(cached) = self.folder_cache.lock().get(dir) {
            return cached.clone();
        }
        let loaded = read_folder_override(dir);
        self.folder_cache
            .lock()
            .insert(dir.to_path_buf(), loaded.clone());
        loaded
    }
}

fn key_forms(key: &str) -> Vec<String> {
    let mut forms = vec![key.to_string()];
    for form in [sanitize_token(key), key.to_lowercase()] {
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    }
    forms
}

fn read_folder_override(dir: &Path) -> Option<DisplayOverride> {
    for name in FOLDER_OVERRIDE_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|c| serde_json::from_str::<RawOverride>(&c).map_err(|e| e.to_string()));
        match parsed {
            Ok(raw) => {
                let value = DisplayOverride::from(raw);
                if !value.is_empty() {
                    return Some(value);
                }
            }
            Err(e) => log::warn!("Ignoring malformed folder override {:?}: {}", path, e),
        }
    }

    for name in FOLDER_NAME_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(contents) => {
                if let Some(line) = contents.lines().map(str::trim).find(|l| !l.is_empty()) {
                    return Some(DisplayOverride {
                        display_name: Some(line.to_string()),
                        category: None,
                    });
                }
            }
            Err(e) => log::warn!("Failed to read font name file {:?}: {}", path, e),
        }
    }
    None
}
