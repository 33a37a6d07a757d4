//! Configuration system for the folio font service.
//!
//! This crate provides:
//!
//! - `FontServiceConfig`: where fonts are discovered and which scheme serves them
//! - Environment overrides (`FOLIO_FONT_MANIFEST`, `FOLIO_FONT_DIRS`)
//! - Conventional manifest, asset and override file names
//! - The traversal-safe path layer every disk-touching resolver goes through

pub mod defaults;
pub mod env_vars;
pub mod error;
pub mod font_config;
pub mod path_validation;

// Re-export main types for convenience
pub use error::{ConfigError, TraversalKind};
pub use font_config::FontServiceConfig;
pub use path_validation::{resolve_within_root, validate_existing_path};
