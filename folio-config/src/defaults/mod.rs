//! Default values for the font service configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on `FontServiceConfig` fields, and the constant tables list the
//! conventional file and directory names font discovery looks for.

mod font;

pub use font::{
    ASSET_DIR_SUFFIXES, CONFIG_FILE_NAME, FOLDER_OVERRIDE_FILES, FOLDER_NAME_FILES, MANIFEST_DIR_SUFFIXES,
    MANIFEST_FILE_NAMES, PACKAGE_DIR_NAME, ROOT_OVERRIDE_FILES, scheme,
};
