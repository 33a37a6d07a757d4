//! Font service facade.
//!
//! `FontService` owns the resolver chain, the family/variant cache and the
//! single-flight guard that makes initialization idempotent. It is a cheap
//! clonable handle; clones share all state.
//!
//! Read accessors (`list_fonts`, `get_family`, `stylesheet`, `variant`) never
//! trigger initialization and fail with [`FontError::NotInitialized`] before
//! the first successful run. `get_font_binary` initializes lazily.

mod library;
mod types;

use std::sync::Arc;

use folio_config::FontServiceConfig;

use crate::cache::{FontCache, FontIndex};
use crate::error::{FontError, Result};
use crate::normalize::normalize_variant_id;
use crate::resolver::{FontSourceResolver, default_chain, run_chain};
use crate::single_flight::SingleFlight;
use crate::stylesheet::build_stylesheet;

pub use library::{BUNDLED_FAMILIES, BundledFamily, BundledVariant, SYSTEM_STAND_INS, SystemStandIn};
pub(crate) use types::weight_keyword;
pub use types::{
    FontBinary, FontCategory, FontFamily, FontFormat, FontOption, FontSource, FontStyle,
    FontVariant, canonical_weight, compare_variants, default_css_stack, numeric_weight,
};

struct ServiceInner {
    config: FontServiceConfig,
    resolvers: Vec<Arc<dyn FontSourceResolver>>,
    cache: FontCache,
    init: Arc<SingleFlight>,
}

impl ServiceInner {
    /// One pipeline run: resolve, index, publish if still current.
    async fn populate(self: Arc<Self>, generation: u64) -> Result<()> {
        let resolvers = self.resolvers.clone();
        let resolution = tokio::task::spawn_blocking(move || run_chain(&resolvers))
            .await
            .map_err(|e| {
                log::error!("Font resolver task failed: {}", e);
                FontError::InitAborted
            })??;

        let (source, families) = match resolution {
            Some(resolution) => (resolution.resolver, resolution.families),
            None => ("none", Vec::new()),
        };
        let index = FontIndex::build(families);
        let (family_count, variant_count) = (index.family_count(), index.variant_count());

        if !self
            .init
            .commit_if_current(generation, || self.cache.publish(index))
        {
            log::debug!("Discarding font index from superseded run {generation}");
            return Ok(());
        }
        log::info!(
            "Font service ready: {} families, {} variants (source: {})",
            family_count,
            variant_count,
            source
        );
        Ok(())
    }
}

/// Handle to the font resolution and serving service.
#[derive(Clone)]
pub struct FontService {
    inner: Arc<ServiceInner>,
}

impl std::fmt::Debug for FontService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontService")
            .field("scheme", &self.inner.config.scheme)
            .field("resolvers", &self.inner.resolvers.len())
            .field("init", &self.inner.init)
            .finish()
    }
}

impl FontService {
    /// Service using the standard manifest → bundled → asset-scan chain.
    pub fn new(config: FontServiceConfig) -> Self {
        let resolvers = default_chain(&config);
        Self::with_resolvers(config, resolvers)
    }

    /// Service with a custom ordered resolver chain.
    pub fn with_resolvers(
        config: FontServiceConfig,
        resolvers: Vec<Arc<dyn FontSourceResolver>>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                config,
                resolvers,
                cache: FontCache::new(),
                init: Arc::new(SingleFlight::new()),
            }),
        }
    }

    pub fn config(&self) -> &FontServiceConfig {
        &self.inner.config
    }

    /// URL scheme fonts are served under.
    pub fn scheme(&self) -> &str {
        &self.inner.config.scheme
    }

    /// Populate the cache once.
    ///
    /// Concurrent callers share one pipeline run; after a success this
    /// returns immediately; after a failure the next call retries.
    pub async fn initialize(&self) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .init
            .run(move |generation| inner.populate(generation))
            .await
            .map_err(FontError::Initialization)
    }

    /// Drop the current cache and run the pipeline again.
    ///
    /// A run still in flight from before the reload cannot publish its
    /// results.
    pub async fn reload(&self) -> Result<()> {
        log::info!("Reloading font sources");
        self.inner.init.reset(|| self.inner.cache.clear());
        self.initialize().await
    }

    /// Clear all state; a later `initialize()` starts from scratch.
    pub fn shutdown(&self) {
        log::debug!("Shutting down font service");
        self.inner.init.reset(|| self.inner.cache.clear());
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.init.is_done() && self.inner.cache.is_populated()
    }

    fn index(&self) -> Result<Arc<FontIndex>> {
        self.inner.cache.snapshot().ok_or(FontError::NotInitialized)
    }

    /// Initialize if needed and return the current index.
    ///
    /// A caller that joined a run which a `reload()` then superseded gets
    /// that run's outcome but finds the cache cleared. It rejoins the run of
    /// the new generation instead, so this only loops once per reset.
    pub(crate) async fn ready_index(&self) -> Result<Arc<FontIndex>> {
        loop {
            let generation = self.inner.init.generation();
            let outcome = self.initialize().await;
            if self.inner.init.generation() != generation {
                log::debug!("Font sources were reset during initialization, rejoining");
                continue;
            }
            outcome?;
            return self.index();
        }
    }

    /// Selectable font options, sorted by category then label.
    pub fn list_fonts(&self) -> Result<Vec<FontOption>> {
        let index = self.index()?;
        let mut options: Vec<FontOption> = index
            .families()
            .map(|family| FontOption {
                value: family.css_family.clone(),
                label: family.display_name.clone(),
                category: family.category,
                source: family.source,
            })
            .collect();
        options.sort_by_cached_key(|o| (o.category, o.label.to_lowercase()));
        Ok(options)
    }

    /// Find a family by key, CSS stack, primary CSS name or display name.
    pub fn get_family(&self, key: &str) -> Result<Option<Arc<FontFamily>>> {
        let index = self.index()?;
        let needle = key.trim();
        if needle.is_empty() {
            return Ok(None);
        }
        if let Some(family) = index.family(needle) {
            return Ok(Some(Arc::clone(family)));
        }

        let lower = needle.to_lowercase();
        let unquoted = lower.trim_matches(|c| c == '"' || c == '\'');
        let found = index.families().find(|f| {
            f.name.to_lowercase() == lower
                || f.css_family.to_lowercase() == lower
                || f.primary_css_name().to_lowercase() == unquoted
                || f.display_name.to_lowercase() == lower
        });
        Ok(found.cloned())
    }

    /// `@font-face` rules for every non-system variant.
    pub fn stylesheet(&self) -> Result<String> {
        let index = self.index()?;
        Ok(build_stylesheet(&index, self.scheme()))
    }

    /// Indexed variant for an identifier or resource URL.
    pub fn variant(&self, id: &str) -> Result<Option<FontVariant>> {
        Ok(self.index()?.variant(id).cloned())
    }

    /// Binary content of a variant, initializing the service if needed.
    ///
    /// `Ok(None)` for empty or unknown identifiers.
    pub async fn get_font_binary(&self, id: &str) -> Result<Option<FontBinary>> {
        if normalize_variant_id(id).is_empty() {
            return Ok(None);
        }
        let index = self.ready_index().await?;
        match index.variant(id).cloned() {
            Some(variant) => read_variant(&variant).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Read a variant's file. The format tag comes from the index, not the bytes.
pub async fn read_variant(variant: &FontVariant) -> Result<FontBinary> {
    let bytes = tokio::fs::read(&variant.file_path)
        .await
        .map_err(|source| FontError::BinaryRead {
            variant_id: variant.variant_id.clone(),
            path: variant.file_path.clone(),
            source,
        })?;
    Ok(FontBinary {
        bytes,
        format: variant.format,
    })
}
