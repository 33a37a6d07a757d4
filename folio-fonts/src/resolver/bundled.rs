//! Bundled-library resolver: the second font source.
//!
//! Walks the fixed table of library-shipped font packages, locating each
//! variant's file through an [`AssetLocator`], then appends the system font
//! stand-ins. It only succeeds when at least one packaged variant was
//! located; stand-ins alone never stop the chain.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use folio_config::{ConfigError, FontServiceConfig, resolve_within_root};

use super::FontSourceResolver;
use crate::error::Result;
use crate::font_service::{
    BUNDLED_FAMILIES, BundledFamily, FontFamily, FontFormat, FontSource, FontVariant,
    SYSTEM_STAND_INS, SystemStandIn,
};
use crate::normalize::build_variant_id;

/// Host capability that maps a package module specifier to a file.
pub trait AssetLocator: Send + Sync {
    fn locate(&self, module: &str) -> Option<PathBuf>;
}

/// Resolves module specifiers under package directories, first match wins.
#[derive(Debug, Clone)]
pub struct PackageDirLocator {
    roots: Vec<PathBuf>,
}

impl PackageDirLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl AssetLocator for PackageDirLocator {
    fn locate(&self, module: &str) -> Option<PathBuf> {
        for root in self.roots.iter().filter(|r| r.is_dir()) {
            match resolve_within_root(root, module) {
                Ok(path) if path.is_file() => return Some(path),
                Ok(_) => {}
                Err(e @ ConfigError::PathTraversal { .. }) => {
                    log::warn!("Rejected bundled font module '{module}': {e}");
                    return None;
                }
                Err(e) => log::debug!("Bundled font module '{module}' not usable: {e}"),
            }
        }
        None
    }
}

/// Resolver over the fixed bundled-family and system-stand-in tables.
pub struct BundledLibraryResolver {
    locator: Arc<dyn AssetLocator>,
    families: &'static [BundledFamily],
    stand_ins: &'static [SystemStandIn],
}

impl BundledLibraryResolver {
    pub fn new(config: &FontServiceConfig) -> Self {
        Self::with_locator(Arc::new(PackageDirLocator::new(config.package_roots())))
    }

    pub fn with_locator(locator: Arc<dyn AssetLocator>) -> Self {
        Self {
            locator,
            families: BUNDLED_FAMILIES,
            stand_ins: SYSTEM_STAND_INS,
        }
    }

    /// Replace the tables (used to exercise the resolver with small fixtures).
    pub fn with_tables(
        mut self,
        families: &'static [BundledFamily],
        stand_ins: &'static [SystemStandIn],
    ) -> Self {
        self.families = families;
        self.stand_ins = stand_ins;
        self
    }

    fn resolve_family(&self, entry: &BundledFamily) -> Option<FontFamily> {
        let mut variants = Vec::with_capacity(entry.variants.len());
        for variant in entry.variants {
            let Some(path) = self.locator.locate(variant.module) else {
                log::warn!(
                    "Bundled font module '{}' of '{}' is unresolvable, skipping",
                    variant.module,
                    entry.name
                );
                continue;
            };
            let file_name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            variants.push(FontVariant {
                family: entry.name.to_string(),
                weight: variant.weight.to_string(),
                style: variant.style,
                variant_id: build_variant_id(entry.name, variant.weight, variant.style, &file_name),
                format: FontFormat::from_path(&path),
                file_path: path,
                label: None,
            });
        }
        if variants.is_empty() {
            return None;
        }
        let mut family = FontFamily {
            name: entry.name.to_string(),
            display_name: entry.display_name.to_string(),
            category: entry.category,
            css_family: entry.css_family.to_string(),
            is_system: false,
            source: FontSource::Bundled,
            variants,
        };
        family.sort_variants();
        Some(family)
    }
}

impl FontSourceResolver for BundledLibraryResolver {
    fn name(&self) -> &'static str {
        "bundled"
    }

    fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
        let mut families: Vec<FontFamily> = self
            .families
            .iter()
            .filter_map(|entry| self.resolve_family(entry))
            .collect();
        if families.is_empty() {
            log::info!("No bundled font packages could be located");
            return Ok(None);
        }

        families.extend(
            self.stand_ins
                .iter()
                .map(|s| FontFamily::system(s.name, s.display_name, s.css_stack())),
        );
        families.sort_by(compare_families);
        Ok(Some(families))
    }
}

/// System stand-ins last, then category order, then display name.
fn compare_families(a: &FontFamily, b: &FontFamily) -> Ordering {
    a.is_system
        .cmp(&b.is_system)
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        })
}
