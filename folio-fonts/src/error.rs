//! Typed error types for folio-fonts.
//!
//! Only a genuinely invalid manifest aborts a resolver pipeline run. Every
//! other anomaly is isolated to the family, variant, or request it concerns:
//! resolvers log and skip, and the protocol handler maps the remaining
//! per-request failures to status codes.

use std::path::PathBuf;
use std::sync::Arc;

use folio_config::ConfigError;
use thiserror::Error;

/// Top-level error type for the font service.
#[derive(Debug, Error)]
pub enum FontError {
    // -----------------------------------------------------------------------
    // Pipeline (fatal to an initialization run)
    // -----------------------------------------------------------------------
    /// The manifest exists but does not match the expected schema.
    #[error("invalid font manifest '{}': {reason}", path.display())]
    ManifestInvalid {
        /// Manifest file that was rejected.
        path: PathBuf,
        /// Human-readable description of the schema or parse failure.
        reason: String,
    },

    /// The manifest exists but could not be read.
    #[error("failed to read font manifest '{}': {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -----------------------------------------------------------------------
    // Per-variant (logged and skipped by resolvers)
    // -----------------------------------------------------------------------
    /// A declared file path escaped its allowed root.
    #[error("rejected font path: {0}")]
    PathTraversal(#[from] ConfigError),

    /// A variant's backing file could not be located.
    #[error("font variant '{variant}' of family '{family}' is unresolvable: {reason}")]
    VariantUnresolvable {
        family: String,
        variant: String,
        reason: String,
    },

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------
    /// A read accessor was called before the first successful initialization.
    #[error("font service is not initialized")]
    NotInitialized,

    /// The shared initialization run failed; every caller waiting on it sees this.
    #[error("font service initialization failed: {0}")]
    Initialization(#[source] Arc<FontError>),

    /// The initialization task ended without reporting an outcome.
    #[error("font service initialization was aborted")]
    InitAborted,

    // -----------------------------------------------------------------------
    // Serving
    // -----------------------------------------------------------------------
    /// Reading a variant's binary content failed.
    #[error("failed to read font '{variant_id}' from '{}': {source}", path.display())]
    BinaryRead {
        variant_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host runtime refused the protocol handler.
    #[error("failed to register protocol handler: {0}")]
    Registration(String),
}

impl FontError {
    /// The root cause of a shared initialization failure, or `self`.
    pub fn root_cause(&self) -> &FontError {
        match self {
            FontError::Initialization(inner) => inner.root_cause(),
            other => other,
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FontError>;
