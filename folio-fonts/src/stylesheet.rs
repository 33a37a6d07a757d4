//! `@font-face` style sheet generation.

use std::fmt::Write;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::cache::FontIndex;
use crate::font_service::{FontFamily, FontVariant};

/// Bytes escaped in the id part of a source URL. Decoding happens again on
/// request, so the URL always normalizes back to the indexed id.
const ID_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'#')
    .add(b'%')
    .add(b'?')
    .add(b'/')
    .add(b'\\')
    .add(b'(')
    .add(b')');

/// One `@font-face` rule per non-system variant, in index order.
///
/// Sources point at `<scheme>://<variantId>` so the protocol handler can
/// serve them.
pub fn build_stylesheet(index: &FontIndex, scheme: &str) -> String {
    let mut css = String::new();
    for family in index.families().filter(|f| !f.is_system) {
        for variant in &family.variants {
            write_font_face(&mut css, family, variant, scheme);
        }
    }
    css
}

fn write_font_face(out: &mut String, family: &FontFamily, variant: &FontVariant, scheme: &str) {
    let name = escape_css_string(family.primary_css_name());
    let format = variant
        .format
        .css_format()
        .map(|f| format!(" format(\"{f}\")"))
        .unwrap_or_default();
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "@font-face {{\n  font-family: '{name}';\n  src: url(\"{scheme}://{id}\"){format};\n  font-weight: {weight};\n  font-style: {style};\n  font-display: swap;\n}}",
        id = utf8_percent_encode(&variant.variant_id, ID_ESCAPES),
        weight = variant.weight,
        style = variant.style,
    );
}

fn escape_css_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_service::{FontCategory, FontFormat, FontSource, FontStyle};
    use std::path::PathBuf;

    fn family(format: FontFormat) -> FontFamily {
        FontFamily {
            name: "pretendard".to_string(),
            display_name: "Pretendard".to_string(),
            category: FontCategory::Korean,
            css_family: "'Pretendard', sans-serif".to_string(),
            is_system: false,
            source: FontSource::Manifest,
            variants: vec![FontVariant {
                family: "pretendard".to_string(),
                weight: "400".to_string(),
                style: FontStyle::Normal,
                file_path: PathBuf::from("/fonts/pretendard/regular.woff2"),
                variant_id: "pretendard-400-normal-regular".to_string(),
                format,
                label: None,
            }],
        }
    }

    #[test]
    fn test_font_face_block() {
        let index = FontIndex::build(vec![
            family(FontFormat::Woff2),
            FontFamily::system("system-serif", "Serif", "Georgia, serif"),
        ]);
        let css = build_stylesheet(&index, "folio-font");
        assert_eq!(
            css,
            "@font-face {\n  font-family: 'Pretendard';\n  src: url(\"folio-font://pretendard-400-normal-regular\") format(\"woff2\");\n  font-weight: 400;\n  font-style: normal;\n  font-display: swap;\n}\n"
        );
    }

    #[test]
    fn test_unknown_format_omits_hint() {
        let index = FontIndex::build(vec![family(FontFormat::Unknown)]);
        let css = build_stylesheet(&index, "folio-font");
        assert!(css.contains("src: url(\"folio-font://pretendard-400-normal-regular\");"));
    }

    #[test]
    fn test_source_url_round_trips_declared_id() {
        let mut fam = family(FontFormat::Woff2);
        fam.variants[0].variant_id = "noto sans (regular)".to_string();
        let index = FontIndex::build(vec![fam]);
        let css = build_stylesheet(&index, "folio-font");
        let url = "folio-font://noto%20sans%20%28regular%29";
        assert!(css.contains(&format!("src: url(\"{url}\")")), "{css}");
        assert!(index.variant(url).is_some());
    }
}
