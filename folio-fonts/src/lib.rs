//! Font resolution and serving for the folio font service.
//!
//! This crate provides:
//! - Font family discovery through an ordered resolver chain
//!   (manifest → bundled library → asset-directory scan)
//! - A display metadata overlay for sources without metadata
//! - An immutable family/variant index swapped atomically on reload
//! - Idempotent, single-flight initialization
//! - A custom-scheme protocol handler serving font binaries
//!
//! # Architecture
//!
//! [`FontService`] runs the resolver chain once, builds a [`FontIndex`] and
//! publishes it to the cache. Read accessors and the [`FontProtocolHandler`]
//! consult the published index; the handler initializes lazily.
//! [`ProtocolRegistrar`] installs the handler with the host exactly once.

pub mod cache;
pub mod error;
pub mod font_service;
pub mod metadata;
pub mod normalize;
pub mod protocol;
pub mod resolver;
pub mod single_flight;
pub mod stylesheet;

// Re-export main types for convenience
pub use cache::{FontCache, FontIndex};
pub use error::{FontError, Result};
pub use font_service::{
    FontBinary, FontCategory, FontFamily, FontFormat, FontOption, FontService, FontSource,
    FontStyle, FontVariant,
};
pub use metadata::{DisplayMetadataResolver, DisplayOverride};
pub use normalize::{RequestIdentifier, extract_request_identifier, normalize_variant_id};
pub use protocol::{
    FontProtocolHandler, ProtocolHandlerFn, ProtocolRegistrar, ProtocolRequest, ProtocolResponse,
    SchemeRegistry,
};
pub use resolver::{
    AssetDirectoryScanner, BundledLibraryResolver, FontSourceResolver, ManifestLoader,
};
pub use single_flight::SingleFlight;
