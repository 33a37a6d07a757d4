//! Asset-directory scanner: the last-resort font source.
//!
//! Every immediate subdirectory of an asset root is a candidate family folder.
//! Font files inside it become variants whose weight and style are inferred
//! from the file name; display metadata comes from the overlay resolver, with
//! name-based inference as the final fallback.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use folio_config::{FontServiceConfig, validate_existing_path};

use super::FontSourceResolver;
use crate::error::Result;
use crate::font_service::{
    FontCategory, FontFamily, FontFormat, FontSource, FontStyle, FontVariant, default_css_stack,
    weight_keyword,
};
use crate::metadata::DisplayMetadataResolver;
use crate::normalize::{build_variant_id, sanitize_token};

/// Scans asset roots for per-family font folders.
#[derive(Debug, Clone)]
pub struct AssetDirectoryScanner {
    roots: Vec<PathBuf>,
}

impl AssetDirectoryScanner {
    pub fn new(config: &FontServiceConfig) -> Self {
        Self::with_roots(config.asset_root_candidates())
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn scan_root(
        &self,
        root: &Path,
        metadata: &DisplayMetadataResolver,
        seen: &mut HashSet<String>,
        families: &mut Vec<FontFamily>,
    ) {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Cannot list asset root {:?}: {}", root, e);
                return;
            }
        };
        let mut folders: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .filter(|p| !is_hidden(p))
            .collect();
        folders.sort();

        for folder in folders {
            let Some(family) = scan_family_folder(root, &folder, metadata) else {
                continue;
            };
            if !seen.insert(family.name.clone()) {
                log::debug!(
                    "Family '{}' in {:?} already found under an earlier root, skipping",
                    family.name,
                    folder
                );
                continue;
            }
            families.push(family);
        }
    }
}

impl FontSourceResolver for AssetDirectoryScanner {
    fn name(&self) -> &'static str {
        "asset-scan"
    }

    fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
        let existing: Vec<PathBuf> = self.roots.iter().filter(|r| r.is_dir()).cloned().collect();
        if existing.is_empty() {
            log::info!("None of {} asset root(s) exist", self.roots.len());
            return Ok(None);
        }

        let metadata = DisplayMetadataResolver::from_asset_roots(&existing);
        let mut seen = HashSet::new();
        let mut families = Vec::new();
        for root in &existing {
            log::debug!("Scanning asset root {:?}", root);
            self.scan_root(root, &metadata, &mut seen, &mut families);
        }
        Ok((!families.is_empty()).then_some(families))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Build a family from one folder, or `None` if it holds no font files.
fn scan_family_folder(
    root: &Path,
    folder: &Path,
    metadata: &DisplayMetadataResolver,
) -> Option<FontFamily> {
    let folder_name = folder.file_name()?.to_string_lossy().into_owned();
    let key = sanitize_token(&folder_name);
    if key.is_empty() {
        return None;
    }

    let mut files: Vec<PathBuf> = fs::read_dir(folder)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && FontFormat::is_font_extension(p))
        .collect();
    files.sort();

    let mut variants = Vec::with_capacity(files.len());
    for file in files {
        let path = match validate_existing_path(&file, root) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping font file {:?}: {}", file, e);
                continue;
            }
        };
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (weight, style) = infer_weight_style(&stem);
        // The extension keeps Foo.woff2 and Foo.ttf apart
        variants.push(FontVariant {
            family: key.clone(),
            variant_id: build_variant_id(&key, &weight, style, &file_name),
            weight,
            style,
            format: FontFormat::from_path(&file),
            file_path: path,
            label: None,
        });
    }
    if variants.is_empty() {
        return None;
    }

    let overlay = metadata.resolve(&folder_name, Some(folder)).unwrap_or_default();
    let display_name = overlay
        .display_name
        .unwrap_or_else(|| infer_display_name(&folder_name));
    let category = overlay
        .category
        .unwrap_or_else(|| infer_category(&format!("{folder_name} {display_name}")));

    let mut family = FontFamily {
        name: key,
        css_family: default_css_stack(&display_name),
        display_name,
        category,
        is_system: false,
        source: FontSource::Local,
        variants,
    };
    family.sort_variants();
    Some(family)
}

/// Infer weight and style from a font file stem.
///
/// A standalone number 100..=900 (multiple of 100) wins; otherwise a weight
/// keyword must end the part after the last `-`/`_`/space, so family names
/// do not leak into the weight. Defaults to `400`/normal.
pub fn infer_weight_style(stem: &str) -> (String, FontStyle) {
    let lower = stem.to_lowercase();
    let style = if lower.contains("italic") || lower.contains("oblique") {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    };

    let numeric = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|token| token.parse::<u16>().ok())
        .find(|n| (100..=900).contains(n) && n % 100 == 0);
    if let Some(weight) = numeric {
        return (weight.to_string(), style);
    }

    let suffix: String = lower
        .rsplit(['-', '_', ' '])
        .next()
        .unwrap_or(lower.as_str())
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let suffix = suffix
        .trim_end_matches("italic")
        .trim_end_matches("oblique");

    const KEYWORDS: &[&str] = &[
        "extrabold",
        "ultrabold",
        "semibold",
        "demibold",
        "extralight",
        "ultralight",
        "hairline",
        "thin",
        "light",
        "medium",
        "black",
        "heavy",
        "bold",
        "regular",
        "normal",
        "book",
    ];
    let weight = KEYWORDS
        .iter()
        .find(|kw| suffix.ends_with(*kw))
        .and_then(|kw| weight_keyword(kw))
        .unwrap_or(400);
    (weight.to_string(), style)
}

/// Turn a folder name into a human label: separators become spaces and each
/// word starts upper-case.
pub fn infer_display_name(folder: &str) -> String {
    folder
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guess a category from names: script detection first, then common hints.
pub fn infer_category(name: &str) -> FontCategory {
    if name.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c)) {
        return FontCategory::Korean;
    }
    if name
        .chars()
        .any(|c| ('\u{3040}'..='\u{30FF}').contains(&c))
    {
        return FontCategory::Japanese;
    }

    let lower = name.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let has_token = |wanted: &[&str]| tokens.iter().any(|t| wanted.contains(t));

    const KOREAN_HINTS: &[&str] = &["nanum", "pretendard", "myeongjo", "batang", "gowun", "hangul"];
    const JAPANESE_HINTS: &[&str] = &["mincho", "kaku", "maru", "hiragino", "shippori"];

    if has_token(&["kr", "ko", "korean"]) || KOREAN_HINTS.iter().any(|h| lower.contains(h)) {
        FontCategory::Korean
    } else if has_token(&["jp", "ja", "japanese"])
        || JAPANESE_HINTS.iter().any(|h| lower.contains(h))
    {
        FontCategory::Japanese
    } else {
        FontCategory::English
    }
}
