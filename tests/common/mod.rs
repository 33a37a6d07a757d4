//! Shared integration test helpers for folio.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::fonts_workspace;
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use folio_config::FontServiceConfig;
use tempfile::TempDir;

pub const TTF_BYTES: &[u8] = &[0x00, 0x01, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x80];

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("fixture path has a parent"))
        .expect("Failed to create fixture dirs");
    fs::write(path, bytes).expect("Failed to write fixture file");
}

/// A working directory with two scannable family folders and no manifest.
///
/// ```text
/// <tmp>/
///   fonts/
///     font-overrides.json   # gives "lora" a display name
///     lora/Lora-Regular.ttf
///     lora/Lora-BoldItalic.ttf
///     gowun-batang/GowunBatang-Regular.ttf
/// ```
pub fn fonts_workspace() -> (FontServiceConfig, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write(root, "fonts/lora/Lora-Regular.ttf", TTF_BYTES);
    write(root, "fonts/lora/Lora-BoldItalic.ttf", TTF_BYTES);
    write(root, "fonts/gowun-batang/GowunBatang-Regular.ttf", TTF_BYTES);
    write(
        root,
        "fonts/font-overrides.json",
        br#"{ "lora": { "displayName": "Lora Serif", "category": "english" } }"#,
    );
    (FontServiceConfig::new(root), temp_dir)
}
