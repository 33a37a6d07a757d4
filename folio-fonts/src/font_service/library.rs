//! Library-shipped font modules and system font stand-ins.
//!
//! Module paths are package-relative specifiers, resolved at runtime against
//! the configured package roots. A module that cannot be located only removes
//! that one variant.

use super::types::FontStyle::{Italic, Normal};
use super::types::{FontCategory, FontStyle};

/// One weight/style of a bundled family.
#[derive(Debug, Clone, Copy)]
pub struct BundledVariant {
    pub weight: &'static str,
    pub style: FontStyle,
    pub module: &'static str,
}

/// A family shipped as a font package.
#[derive(Debug, Clone, Copy)]
pub struct BundledFamily {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: FontCategory,
    pub css_family: &'static str,
    pub variants: &'static [BundledVariant],
}

/// A font expected to be installed on the system, offered by name only.
#[derive(Debug, Clone, Copy)]
pub struct SystemStandIn {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Family names in priority order; generic keywords last
    pub stack: &'static [&'static str],
}

const fn v(weight: &'static str, style: FontStyle, module: &'static str) -> BundledVariant {
    BundledVariant {
        weight,
        style,
        module,
    }
}

/// Font packages known to ship with the application.
pub const BUNDLED_FAMILIES: &[BundledFamily] = &[
    // Korean
    BundledFamily {
        name: "pretendard",
        display_name: "Pretendard",
        category: FontCategory::Korean,
        css_family: "'Pretendard', sans-serif",
        variants: &[
            v("300", Normal, "pretendard/dist/web/static/woff2/Pretendard-Light.woff2"),
            v("400", Normal, "pretendard/dist/web/static/woff2/Pretendard-Regular.woff2"),
            v("500", Normal, "pretendard/dist/web/static/woff2/Pretendard-Medium.woff2"),
            v("600", Normal, "pretendard/dist/web/static/woff2/Pretendard-SemiBold.woff2"),
            v("700", Normal, "pretendard/dist/web/static/woff2/Pretendard-Bold.woff2"),
        ],
    },
    BundledFamily {
        name: "noto-sans-kr",
        display_name: "Noto Sans KR",
        category: FontCategory::Korean,
        css_family: "'Noto Sans KR', sans-serif",
        variants: &[
            v("400", Normal, "@fontsource/noto-sans-kr/files/noto-sans-kr-korean-400-normal.woff2"),
            v("700", Normal, "@fontsource/noto-sans-kr/files/noto-sans-kr-korean-700-normal.woff2"),
        ],
    },
    BundledFamily {
        name: "nanum-myeongjo",
        display_name: "Nanum Myeongjo",
        category: FontCategory::Korean,
        css_family: "'Nanum Myeongjo', serif",
        variants: &[
            v("400", Normal, "@fontsource/nanum-myeongjo/files/nanum-myeongjo-korean-400-normal.woff2"),
            v("700", Normal, "@fontsource/nanum-myeongjo/files/nanum-myeongjo-korean-700-normal.woff2"),
        ],
    },
    // Japanese
    BundledFamily {
        name: "noto-sans-jp",
        display_name: "Noto Sans JP",
        category: FontCategory::Japanese,
        css_family: "'Noto Sans JP', sans-serif",
        variants: &[
            v("400", Normal, "@fontsource/noto-sans-jp/files/noto-sans-jp-japanese-400-normal.woff2"),
            v("700", Normal, "@fontsource/noto-sans-jp/files/noto-sans-jp-japanese-700-normal.woff2"),
        ],
    },
    BundledFamily {
        name: "noto-serif-jp",
        display_name: "Noto Serif JP",
        category: FontCategory::Japanese,
        css_family: "'Noto Serif JP', serif",
        variants: &[
            v("400", Normal, "@fontsource/noto-serif-jp/files/noto-serif-jp-japanese-400-normal.woff2"),
            v("700", Normal, "@fontsource/noto-serif-jp/files/noto-serif-jp-japanese-700-normal.woff2"),
        ],
    },
    // English
    BundledFamily {
        name: "inter",
        display_name: "Inter",
        category: FontCategory::English,
        css_family: "'Inter', sans-serif",
        variants: &[
            v("400", Normal, "@fontsource/inter/files/inter-latin-400-normal.woff2"),
            v("400", Italic, "@fontsource/inter/files/inter-latin-400-italic.woff2"),
            v("700", Normal, "@fontsource/inter/files/inter-latin-700-normal.woff2"),
        ],
    },
    BundledFamily {
        name: "merriweather",
        display_name: "Merriweather",
        category: FontCategory::English,
        css_family: "'Merriweather', serif",
        variants: &[
            v("400", Normal, "@fontsource/merriweather/files/merriweather-latin-400-normal.woff2"),
            v("400", Italic, "@fontsource/merriweather/files/merriweather-latin-400-italic.woff2"),
            v("700", Normal, "@fontsource/merriweather/files/merriweather-latin-700-normal.woff2"),
        ],
    },
];

/// System fonts offered as-is, without bundled files.
pub const SYSTEM_STAND_INS: &[SystemStandIn] = &[
    SystemStandIn {
        name: "system-ui",
        display_name: "System UI",
        stack: &["system-ui", "-apple-system", "Segoe UI", "sans-serif"],
    },
    SystemStandIn {
        name: "apple-sd-gothic-neo",
        display_name: "Apple SD Gothic Neo",
        stack: &["Apple SD Gothic Neo", "Malgun Gothic", "sans-serif"],
    },
    SystemStandIn {
        name: "malgun-gothic",
        display_name: "Malgun Gothic",
        stack: &["Malgun Gothic", "Apple SD Gothic Neo", "sans-serif"],
    },
    SystemStandIn {
        name: "system-serif",
        display_name: "Serif",
        stack: &["Georgia", "Times New Roman", "serif"],
    },
    SystemStandIn {
        name: "system-monospace",
        display_name: "Monospace",
        stack: &["ui-monospace", "Menlo", "Consolas", "monospace"],
    },
];

const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-monospace",
    "ui-serif",
    "ui-sans-serif",
    "-apple-system",
];

impl SystemStandIn {
    /// CSS font stack; names with spaces are quoted, generic keywords are not.
    pub fn css_stack(&self) -> String {
        self.stack
            .iter()
            .map(|name| {
                if GENERIC_FAMILIES.contains(name) || !name.contains(' ') {
                    (*name).to_string()
                } else {
                    format!("'{name}'")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
