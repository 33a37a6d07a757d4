//! Font family and variant data types.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Language/usage grouping of a family.
///
/// Declaration order is the sort order used for font option lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontCategory {
    Korean,
    Japanese,
    English,
    System,
    #[default]
    Other,
}

impl FontCategory {
    /// Parse a category tag case-insensitively. Unknown tags map to `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "korean" | "ko" | "kr" => FontCategory::Korean,
            "japanese" | "ja" | "jp" => FontCategory::Japanese,
            "english" | "en" | "latin" => FontCategory::English,
            "system" => FontCategory::System,
            _ => FontCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontCategory::Korean => "korean",
            FontCategory::Japanese => "japanese",
            FontCategory::English => "english",
            FontCategory::System => "system",
            FontCategory::Other => "other",
        }
    }
}

impl fmt::Display for FontCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Slant of a variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    /// `italic` and `oblique` are italic, anything else is normal.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "italic" | "oblique" => FontStyle::Italic,
            _ => FontStyle::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Container format of a font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Woff2,
    Woff,
    Ttf,
    Otf,
    #[default]
    Unknown,
}

impl FontFormat {
    /// Derive the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(FontFormat::Unknown)
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "woff2" => FontFormat::Woff2,
            "woff" => FontFormat::Woff,
            "ttf" => FontFormat::Ttf,
            "otf" => FontFormat::Otf,
            _ => FontFormat::Unknown,
        }
    }

    /// Identify the container from its leading magic bytes.
    ///
    /// Only the container signature is inspected; the table data is not validated.
    pub fn sniff(header: &[u8]) -> Self {
        match header.get(..4) {
            Some(b"wOF2") => FontFormat::Woff2,
            Some(b"wOFF") => FontFormat::Woff,
            Some(b"OTTO") => FontFormat::Otf,
            Some([0x00, 0x01, 0x00, 0x00]) | Some(b"true") => FontFormat::Ttf,
            _ => FontFormat::Unknown,
        }
    }

    /// MIME type served for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "font/woff2",
            FontFormat::Woff => "font/woff",
            FontFormat::Ttf => "font/ttf",
            FontFormat::Otf => "font/otf",
            FontFormat::Unknown => "application/octet-stream",
        }
    }

    /// Value for the `format()` hint of an `@font-face` `src` descriptor.
    pub fn css_format(&self) -> Option<&'static str> {
        match self {
            FontFormat::Woff2 => Some("woff2"),
            FontFormat::Woff => Some("woff"),
            FontFormat::Ttf => Some("truetype"),
            FontFormat::Otf => Some("opentype"),
            FontFormat::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "ttf",
            FontFormat::Otf => "otf",
            FontFormat::Unknown => "unknown",
        }
    }

    /// Whether files with this extension are considered font files.
    pub fn is_font_extension(path: &Path) -> bool {
        Self::from_path(path) != FontFormat::Unknown
    }
}

/// Which discovery strategy produced a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    Manifest,
    Bundled,
    Local,
    System,
}

impl FontSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSource::Manifest => "manifest",
            FontSource::Bundled => "bundled",
            FontSource::Local => "local",
            FontSource::System => "system",
        }
    }
}

/// One concrete weight/style of a family, backed by exactly one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontVariant {
    /// Key of the owning family
    pub family: String,
    /// Numeric weight as a string (100-900 convention)
    pub weight: String,
    pub style: FontStyle,
    /// Absolute, validated file location
    pub file_path: PathBuf,
    /// Globally unique normalized identifier
    pub variant_id: String,
    pub format: FontFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A family of variants sharing one CSS name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamily {
    /// Stable lowercase key, unique across the cache
    pub name: String,
    pub display_name: String,
    pub category: FontCategory,
    /// Font stack used in generated style sheets
    pub css_family: String,
    /// System families carry no variants and are resolved by name at render time
    pub is_system: bool,
    pub source: FontSource,
    pub variants: Vec<FontVariant>,
}

impl FontFamily {
    /// A system font stand-in: no variants, resolved purely by name.
    pub fn system(
        name: impl Into<String>,
        display_name: impl Into<String>,
        css_family: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            category: FontCategory::System,
            css_family: css_family.into(),
            is_system: true,
            source: FontSource::System,
            variants: Vec::new(),
        }
    }

    /// First family name of the CSS stack, without quotes.
    pub fn primary_css_name(&self) -> &str {
        self.css_family
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
    }

    /// A family may enter the cache when it is a system family without
    /// variants, or a regular family with at least one variant.
    pub fn is_admissible(&self) -> bool {
        if self.is_system {
            self.variants.is_empty()
        } else {
            !self.variants.is_empty()
        }
    }

    /// Sort variants by numeric weight, then style.
    pub fn sort_variants(&mut self) {
        self.variants.sort_by(compare_variants);
    }
}

/// An entry in the selectable font list offered to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontOption {
    /// CSS family stack applied when the option is selected
    pub value: String,
    pub label: String,
    pub category: FontCategory,
    pub source: FontSource,
}

/// Binary content of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontBinary {
    pub bytes: Vec<u8>,
    pub format: FontFormat,
}

impl FontBinary {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Map a weight keyword or number to its canonical string form.
///
/// Numbers are kept as written (after trimming); known keywords become their
/// numeric value; anything else is kept verbatim.
pub fn canonical_weight(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u16>() {
        return n.to_string();
    }
    let key: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match weight_keyword(&key) {
        Some(n) => n.to_string(),
        None if trimmed.is_empty() => "400".to_string(),
        None => trimmed.to_string(),
    }
}

/// Numeric value of a weight keyword (`bold` → 700).
pub(crate) fn weight_keyword(key: &str) -> Option<u16> {
    let weight = match key {
        "thin" | "hairline" => 100,
        "extralight" | "ultralight" => 200,
        "light" => 300,
        "regular" | "normal" | "book" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => return None,
    };
    Some(weight)
}

/// Parse a weight string as a number.
pub fn numeric_weight(weight: &str) -> Option<u16> {
    weight.trim().parse::<u16>().ok()
}

/// Ordering used for variants within a family.
///
/// Numeric weights sort ascending and come before non-numeric ones; two
/// non-numeric weights compare by their string, then by label. Style breaks
/// the remaining ties (normal before italic).
pub fn compare_variants(a: &FontVariant, b: &FontVariant) -> Ordering {
    let by_weight = match (numeric_weight(&a.weight), numeric_weight(&b.weight)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .weight
            .cmp(&b.weight)
            .then_with(|| a.label.cmp(&b.label)),
    };
    by_weight.then_with(|| a.style.cmp(&b.style))
}

/// Build a CSS font stack for a family that declares none.
pub fn default_css_stack(display_name: &str) -> String {
    let lower = display_name.to_ascii_lowercase();
    let generic = if lower.contains("mono") || lower.contains("code") {
        "monospace"
    } else if (lower.contains("serif") && !lower.contains("sans"))
        || lower.contains("myeongjo")
        || lower.contains("mincho")
        || lower.contains("batang")
    {
        "serif"
    } else {
        "sans-serif"
    };
    format!("'{}', {generic}", display_name.replace('\'', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(weight: &str, style: FontStyle) -> FontVariant {
        FontVariant {
            family: "f".to_string(),
            weight: weight.to_string(),
            style,
            file_path: PathBuf::from("/x.ttf"),
            variant_id: format!("f-{weight}-{style}"),
            format: FontFormat::Ttf,
            label: None,
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(FontCategory::parse("Korean"), FontCategory::Korean);
        assert_eq!(FontCategory::parse("jp"), FontCategory::Japanese);
        assert_eq!(FontCategory::parse(" EN "), FontCategory::English);
        assert_eq!(FontCategory::parse("handwriting"), FontCategory::Other);
        assert!(FontCategory::Korean < FontCategory::System);
        assert!(FontCategory::System < FontCategory::Other);
    }

    #[test]
    fn test_format_sniff_and_mime() {
        assert_eq!(FontFormat::sniff(b"wOF2rest"), FontFormat::Woff2);
        assert_eq!(FontFormat::sniff(b"wOFF"), FontFormat::Woff);
        assert_eq!(FontFormat::sniff(b"OTTO"), FontFormat::Otf);
        assert_eq!(FontFormat::sniff(&[0, 1, 0, 0, 9]), FontFormat::Ttf);
        assert_eq!(FontFormat::sniff(b"PK"), FontFormat::Unknown);
        assert_eq!(FontFormat::Woff2.mime_type(), "font/woff2");
        assert_eq!(FontFormat::Unknown.mime_type(), "application/octet-stream");
        assert_eq!(
            FontFormat::from_path(Path::new("A/B.WOFF2")),
            FontFormat::Woff2
        );
    }

    #[test]
    fn test_canonical_weight() {
        assert_eq!(canonical_weight("400"), "400");
        assert_eq!(canonical_weight(" Bold "), "700");
        assert_eq!(canonical_weight("Semi-Bold"), "600");
        assert_eq!(canonical_weight(""), "400");
        assert_eq!(canonical_weight("variable"), "variable");
    }

    #[test]
    fn test_variant_ordering() {
        let mut family = FontFamily {
            name: "f".to_string(),
            display_name: "F".to_string(),
            category: FontCategory::English,
            css_family: "'F', sans-serif".to_string(),
            is_system: false,
            source: FontSource::Local,
            variants: vec![
                variant("variable", FontStyle::Normal),
                variant("700", FontStyle::Italic),
                variant("700", FontStyle::Normal),
                variant("300", FontStyle::Normal),
            ],
        };
        family.sort_variants();
        let order: Vec<_> = family
            .variants
            .iter()
            .map(|v| (v.weight.as_str(), v.style))
            .collect();
        assert_eq!(
            order,
            vec![
                ("300", FontStyle::Normal),
                ("700", FontStyle::Normal),
                ("700", FontStyle::Italic),
                ("variable", FontStyle::Normal),
            ]
        );
    }

    #[test]
    fn test_admissibility_and_css_name() {
        let system = FontFamily::system("serif", "Serif", "serif");
        assert!(system.is_admissible());

        let family = FontFamily {
            variants: Vec::new(),
            is_system: false,
            ..FontFamily::system("pretendard", "Pretendard", "'Pretendard', sans-serif")
        };
        assert!(!family.is_admissible());
        assert_eq!(family.primary_css_name(), "Pretendard");
    }

    #[test]
    fn test_default_css_stack() {
        assert_eq!(default_css_stack("Nanum Myeongjo"), "'Nanum Myeongjo', serif");
        assert_eq!(default_css_stack("Noto Sans KR"), "'Noto Sans KR', sans-serif");
        assert_eq!(default_css_stack("Fira Code"), "'Fira Code', monospace");
    }
}
