//! Shared integration test helpers for folio-fonts.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{FontFixture, WOFF2_BYTES};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use folio_config::FontServiceConfig;
use folio_fonts::{FontError, FontFamily, FontService, FontSourceResolver, Result};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Bytes with a WOFF2 signature; nothing parses them further.
pub const WOFF2_BYTES: &[u8] = b"wOF2\x00\x01\x00\x00folio-fixture";

/// A temporary working directory that font sources are written into.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub struct FontFixture {
    pub dir: TempDir,
}

impl FontFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `rel` under the fixture root, creating parents.
    pub fn write(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().expect("fixture path has a parent"))
            .expect("Failed to create fixture dirs");
        fs::write(&path, bytes).expect("Failed to write fixture file");
        path
    }

    pub fn write_manifest(&self, rel: &str, manifest: &Value) -> PathBuf {
        self.write(
            rel,
            serde_json::to_string_pretty(manifest)
                .expect("manifest serializes")
                .as_bytes(),
        )
    }

    /// Config rooted at the fixture, with no environment influence.
    pub fn config(&self) -> FontServiceConfig {
        FontServiceConfig::new(self.root())
    }

    /// Service using the standard resolver chain over the fixture.
    pub fn service(&self) -> FontService {
        FontService::new(self.config())
    }
}

/// Manifest with one Korean family and one regular variant.
pub fn pretendard_manifest() -> Value {
    json!({
        "families": [{
            "id": "pretendard",
            "displayName": "Pretendard",
            "category": "korean",
            "variants": [
                { "file": "pretendard/regular.woff2", "weight": 400, "style": "normal" }
            ]
        }]
    })
}

/// Write the Pretendard manifest and font under `<root>/fonts`.
pub fn write_pretendard(fixture: &FontFixture) {
    fixture.write("fonts/pretendard/regular.woff2", WOFF2_BYTES);
    fixture.write_manifest("fonts/font-manifest.json", &pretendard_manifest());
}

/// Resolver that counts its runs, optionally sleeping and failing first.
pub struct CountingResolver {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub failures_before_success: usize,
}

impl CountingResolver {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            failures_before_success: 0,
        })
    }

    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            failures_before_success: failures,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FontSourceResolver for CountingResolver {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn resolve(&self) -> Result<Option<Vec<FontFamily>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if call < self.failures_before_success {
            return Err(FontError::ManifestInvalid {
                path: PathBuf::from("counting.json"),
                reason: format!("simulated failure #{}", call + 1),
            });
        }
        Ok(Some(vec![FontFamily::system(
            "system-ui",
            "System UI",
            "system-ui, sans-serif",
        )]))
    }
}

/// Service whose only resolver is `resolver`.
pub fn service_with(resolver: Arc<CountingResolver>) -> FontService {
    FontService::with_resolvers(
        FontServiceConfig::new(std::env::temp_dir()),
        vec![resolver as Arc<dyn FontSourceResolver>],
    )
}
