//! Ordered fallback chain of font source resolvers.
//!
//! Each resolver is tried in a fixed order; the first one that yields at
//! least one admissible family wins and the chain stops:
//! 1. [`ManifestLoader`]: a pre-built manifest document
//! 2. [`BundledLibraryResolver`]: library-shipped font modules plus system stand-ins
//! 3. [`AssetDirectoryScanner`]: per-family folders under the asset roots
//!
//! Resolvers are synchronous; the service runs the chain on a blocking task.

mod bundled;
mod manifest;
mod scanner;

use std::sync::Arc;

use folio_config::FontServiceConfig;

use crate::error::Result;
use crate::font_service::FontFamily;

pub use bundled::{AssetLocator, BundledLibraryResolver, PackageDirLocator};
pub use manifest::ManifestLoader;
pub use scanner::{AssetDirectoryScanner, infer_category, infer_display_name, infer_weight_style};

/// One strategy for discovering font families.
pub trait FontSourceResolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Discover families.
    ///
    /// `Ok(None)` means "nothing here, try the next resolver". An `Err` aborts
    /// the whole pipeline and is reserved for invalid source documents.
    fn resolve(&self) -> Result<Option<Vec<FontFamily>>>;
}

/// Families produced by the winning resolver.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolver: &'static str,
    pub families: Vec<FontFamily>,
}

/// The standard chain for a configuration.
pub fn default_chain(config: &FontServiceConfig) -> Vec<Arc<dyn FontSourceResolver>> {
    vec![
        Arc::new(ManifestLoader::new(config)),
        Arc::new(BundledLibraryResolver::new(config)),
        Arc::new(AssetDirectoryScanner::new(config)),
    ]
}

/// Run resolvers in order until one yields an admissible family.
///
/// Returns `Ok(None)` when every resolver came up empty.
pub fn run_chain(resolvers: &[Arc<dyn FontSourceResolver>]) -> Result<Option<Resolution>> {
    for resolver in resolvers {
        log::debug!("Trying font resolver '{}'", resolver.name());
        match resolver.resolve()? {
            Some(families) if families.iter().any(FontFamily::is_admissible) => {
                log::info!(
                    "Font resolver '{}' yielded {} famil{}",
                    resolver.name(),
                    families.len(),
                    if families.len() == 1 { "y" } else { "ies" }
                );
                return Ok(Some(Resolution {
                    resolver: resolver.name(),
                    families,
                }));
            }
            _ => log::debug!("Font resolver '{}' yielded nothing", resolver.name()),
        }
    }
    log::warn!("No font source yielded any families; the font list will be empty");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FontError;
    use crate::font_service::FontFamily;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        families: Option<Vec<FontFamily>>,
        calls: AtomicUsize,
    }

    impl FontSourceResolver for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.families.clone())
        }
    }

    struct Failing;

    impl FontSourceResolver for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
            Err(FontError::ManifestInvalid {
                path: "m.json".into(),
                reason: "missing field `families`".to_string(),
            })
        }
    }

    fn fixed(name: &'static str, families: Option<Vec<FontFamily>>) -> Arc<Fixed> {
        Arc::new(Fixed {
            name,
            families,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_first_non_empty_wins() {
        let empty = fixed("empty", Some(Vec::new()));
        let first = fixed("first", Some(vec![FontFamily::system("serif", "Serif", "serif")]));
        let never = fixed("never", Some(vec![FontFamily::system("mono", "Mono", "monospace")]));
        let chain: Vec<Arc<dyn FontSourceResolver>> =
            vec![empty.clone(), first.clone(), never.clone()];

        let resolution = run_chain(&chain).unwrap().unwrap();
        assert_eq!(resolution.resolver, "first");
        assert_eq!(empty.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_empty_yields_none() {
        let chain: Vec<Arc<dyn FontSourceResolver>> =
            vec![fixed("a", None), fixed("b", Some(Vec::new()))];
        assert!(run_chain(&chain).unwrap().is_none());
    }

    #[test]
    fn test_error_aborts_chain() {
        let after = fixed("after", Some(vec![FontFamily::system("serif", "Serif", "serif")]));
        let chain: Vec<Arc<dyn FontSourceResolver>> = vec![Arc::new(Failing), after.clone()];
        assert!(matches!(
            run_chain(&chain),
            Err(FontError::ManifestInvalid { .. })
        ));
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }
}
