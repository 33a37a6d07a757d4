//! Manifest loader: the first and preferred font source.
//!
//! The manifest is a JSON document with a required `families` array:
//!
//! ```json
//! {
//!   "families": [
//!     {
//!       "id": "pretendard",
//!       "displayName": "Pretendard",
//!       "category": "korean",
//!       "variants": [
//!         { "file": "pretendard/regular.woff2", "weight": 400, "style": "normal" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The document is validated into typed structures at the load boundary. A
//! missing or malformed `families` array aborts the pipeline; anything wrong
//! with a single variant only skips that variant.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use folio_config::{ConfigError, FontServiceConfig, resolve_within_root};
use serde::Deserialize;

use super::FontSourceResolver;
use crate::error::{FontError, Result};
use crate::font_service::{
    FontCategory, FontFamily, FontFormat, FontSource, FontStyle, FontVariant, canonical_weight,
    default_css_stack,
};
use crate::normalize::{build_variant_id, canonical_declared_id, sanitize_token};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    families: Vec<RawFamily>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFamily {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    css_family: Option<String>,
    #[serde(default)]
    is_system: bool,
    #[serde(default)]
    variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariant {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    weight: Option<RawWeight>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

/// Weights may be written as numbers or strings. Anything else is kept so
/// that one odd value only costs its variant, not the document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWeight {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawWeight {
    /// Canonical weight string, or `None` when the value is unusable.
    fn canonical(&self) -> Option<String> {
        match self {
            RawWeight::Number(n) if n.is_finite() && (1.0..=1000.0).contains(n) => {
                Some((n.round() as u32).to_string())
            }
            RawWeight::Number(_) | RawWeight::Other(_) => None,
            RawWeight::Text(s) => Some(canonical_weight(s)),
        }
    }
}

/// Loads families from the first manifest candidate that exists.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    candidates: Vec<PathBuf>,
}

impl ManifestLoader {
    pub fn new(config: &FontServiceConfig) -> Self {
        Self::with_candidates(config.manifest_candidates())
    }

    /// Use an explicit candidate list, in precedence order.
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists as a regular file.
    pub fn find_manifest(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .map(PathBuf::as_path)
    }

    /// Parse and validate a manifest file into families.
    ///
    /// # Errors
    ///
    /// `FontError::ManifestRead` if the file cannot be read and
    /// `FontError::ManifestInvalid` if it does not match the schema.
    pub fn load(path: &Path) -> Result<Vec<FontFamily>> {
        let contents = fs::read_to_string(path).map_err(|source| FontError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawManifest =
            serde_json::from_str(&contents).map_err(|e| FontError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let mut families = Vec::with_capacity(raw.families.len());
        for (index, entry) in raw.families.into_iter().enumerate() {
            if let Some(family) = convert_family(root, index, entry) {
                families.push(family);
            }
        }
        Ok(families)
    }
}

impl FontSourceResolver for ManifestLoader {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
        let Some(path) = self.find_manifest() else {
            log::info!(
                "No font manifest found among {} candidate(s)",
                self.candidates.len()
            );
            return Ok(None);
        };
        log::info!("Loading font manifest from {:?}", path);
        let families = Self::load(path)?;
        Ok((!families.is_empty()).then_some(families))
    }
}

fn convert_family(root: &Path, index: usize, raw: RawFamily) -> Option<FontFamily> {
    let key_source = raw
        .id
        .as_deref()
        .or(raw.name.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let Some(key_source) = key_source else {
        log::warn!("Manifest family #{index} has neither id nor name, skipping");
        return None;
    };
    let key = sanitize_token(key_source);
    if key.is_empty() {
        log::warn!("Manifest family '{key_source}' has no usable key, skipping");
        return None;
    }

    let display_name = raw
        .display_name
        .as_deref()
        .or(raw.name.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(key_source)
        .to_string();
    let css_family = raw
        .css_family
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if raw.is_system {
        if !raw.variants.is_empty() {
            log::debug!(
                "System family '{key}' declares {} variant(s); system families are resolved by name",
                raw.variants.len()
            );
        }
        let css = css_family.unwrap_or_else(|| display_name.clone());
        let mut family = FontFamily::system(key, display_name, css);
        if let Some(category) = raw.category.as_deref() {
            family.category = FontCategory::parse(category);
        }
        return Some(family);
    }

    let mut variants = Vec::with_capacity(raw.variants.len());
    for raw_variant in raw.variants {
        if let Some(variant) = convert_variant(root, &key, raw_variant) {
            variants.push(variant);
        }
    }
    if variants.is_empty() {
        log::warn!("Manifest family '{key}' has no valid variants, dropping it");
        return None;
    }

    let mut family = FontFamily {
        css_family: css_family.unwrap_or_else(|| default_css_stack(&display_name)),
        name: key,
        display_name,
        category: raw
            .category
            .as_deref()
            .map(FontCategory::parse)
            .unwrap_or_default(),
        is_system: false,
        source: FontSource::Manifest,
        variants,
    };
    family.sort_variants();
    Some(family)
}

fn convert_variant(root: &Path, family: &str, raw: RawVariant) -> Option<FontVariant> {
    let Some(file) = raw.file.as_deref().map(str::trim).filter(|f| !f.is_empty()) else {
        log::warn!("Variant of manifest family '{family}' has no file path, skipping");
        return None;
    };

    let path = match resolve_within_root(root, file) {
        Ok(p) => p,
        Err(e @ ConfigError::PathTraversal { .. }) => {
            log::warn!("Rejected variant of '{family}': {e}");
            return None;
        }
        Err(e) => {
            log::warn!("Variant of '{family}' ({file}) is unresolvable: {e}");
            return None;
        }
    };
    if !path.is_file() {
        log::warn!(
            "Variant of '{family}' is unresolvable: {:?} is not a file",
            path
        );
        return None;
    }

    let weight = match raw.weight.as_ref().map(RawWeight::canonical) {
        None => "400".to_string(),
        Some(Some(weight)) => weight,
        Some(None) => {
            log::warn!(
                "Variant of '{family}' ({file}) has an unusable weight {:?}, skipping",
                raw.weight
            );
            return None;
        }
    };
    let style = raw
        .style
        .as_deref()
        .map(FontStyle::parse)
        .unwrap_or_default();

    let declared = raw.id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let variant_id = match declared.map(|id| (id, canonical_declared_id(id))) {
        Some((_, Some(id))) => id,
        declared => {
            let file_name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let generated = build_variant_id(family, &weight, style, &file_name);
            if let Some((id, None)) = declared {
                log::warn!(
                    "Variant id '{id}' of '{family}' is not a single path segment, using '{generated}'"
                );
            }
            generated
        }
    };

    Some(FontVariant {
        family: family.to_string(),
        weight,
        style,
        format: detect_format(&path),
        file_path: path,
        variant_id,
        label: raw.label.filter(|l| !l.trim().is_empty()),
    })
}

/// Format from the extension, falling back to sniffing the container header.
fn detect_format(path: &Path) -> FontFormat {
    let by_ext = FontFormat::from_path(path);
    if by_ext != FontFormat::Unknown {
        return by_ext;
    }
    let mut header = [0u8; 4];
    match fs::File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => FontFormat::sniff(&header),
        Err(_) => FontFormat::Unknown,
    }
}
