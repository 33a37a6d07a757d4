//! Environment-level overrides for font discovery.
//!
//! Two variables are consulted:
//! - [`FONT_MANIFEST_ENV`]: an explicit manifest file path, tried before any
//!   conventional location.
//! - [`FONT_DIRS_ENV`]: a list of additional asset roots for the directory
//!   scanner, separated by the platform path-list separator (`:` on Unix,
//!   `;` on Windows). Commas are accepted as well.

use std::path::PathBuf;

/// Explicit manifest path override.
pub const FONT_MANIFEST_ENV: &str = "FOLIO_FONT_MANIFEST";

/// Additional asset roots to scan.
pub const FONT_DIRS_ENV: &str = "FOLIO_FONT_DIRS";

/// Read the manifest override, ignoring blank values.
pub fn manifest_override_from_env() -> Option<PathBuf> {
    std::env::var_os(FONT_MANIFEST_ENV)
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
}

/// Read the additional asset roots, in declaration order.
pub fn font_dirs_from_env() -> Vec<PathBuf> {
    match std::env::var(FONT_DIRS_ENV) {
        Ok(value) => parse_path_list(&value),
        Err(_) => Vec::new(),
    }
}

/// Split a delimiter-separated directory list.
///
/// Empty entries are dropped and surrounding whitespace is trimmed.
pub fn parse_path_list(value: &str) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .flat_map(|chunk| {
            chunk
                .to_string_lossy()
                .split(',')
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_list_platform_separator() {
        let joined = std::env::join_paths(["/opt/fonts", "/srv/fonts"]).unwrap();
        let parsed = parse_path_list(&joined.to_string_lossy());
        assert_eq!(
            parsed,
            vec![PathBuf::from("/opt/fonts"), PathBuf::from("/srv/fonts")]
        );
    }

    #[test]
    fn test_parse_path_list_commas_and_blanks() {
        let parsed = parse_path_list(" /a/fonts , ,/b/fonts,");
        assert_eq!(
            parsed,
            vec![PathBuf::from("/a/fonts"), PathBuf::from("/b/fonts")]
        );
    }

    #[test]
    fn test_parse_path_list_empty() {
        assert!(parse_path_list("").is_empty());
        assert!(parse_path_list("   ").is_empty());
    }
}
