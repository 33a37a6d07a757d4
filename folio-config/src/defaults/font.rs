//! Default values and conventional names for font discovery.

/// Custom resource scheme the UI requests font binaries through.
pub fn scheme() -> String {
    "folio-font".to_string()
}

/// File name of the per-user service config.
pub const CONFIG_FILE_NAME: &str = "fonts.yaml";

/// Manifest file names, tried in order inside every candidate directory.
pub const MANIFEST_FILE_NAMES: &[&str] = &["font-manifest.json", "fonts.manifest.json", "fonts.json"];

/// Directories (relative to the resource dir, then the working dir) that may
/// hold a manifest. The empty suffix means the base directory itself.
pub const MANIFEST_DIR_SUFFIXES: &[&str] = &["fonts", "", "assets/fonts", "public/fonts"];

/// Directories (relative to the resource dir, then the working dir) scanned
/// for per-family font folders.
pub const ASSET_DIR_SUFFIXES: &[&str] = &["fonts", "assets/fonts", "public/fonts"];

/// Package directory that library-shipped font modules are resolved against.
pub const PACKAGE_DIR_NAME: &str = "node_modules";

/// Display-metadata override files looked for at the top of an asset root.
pub const ROOT_OVERRIDE_FILES: &[&str] = &["font-overrides.json", "fonts.meta.json"];

/// JSON display-metadata files looked for inside a family folder.
pub const FOLDER_OVERRIDE_FILES: &[&str] = &["font.json", "meta.json", "family.json"];

/// Plain-text display-name files looked for inside a family folder.
pub const FOLDER_NAME_FILES: &[&str] = &["name.txt", "NAME"];
