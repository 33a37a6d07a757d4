//! Variant identifier canonicalization.
//!
//! The same function canonicalizes identifiers when the index is built and
//! when a request is answered. Both call sites must produce byte-identical
//! output for the same logical variant, otherwise lookups miss.

use percent_encoding::percent_decode_str;

use crate::font_service::FontStyle;

/// Canonicalize a raw identifier or a full resource-scheme URL.
///
/// Steps, in order: strip any leading `scheme://` prefix, drop everything from
/// the first `?` or `#`, trim leading/trailing path separators, percent-decode
/// (keeping the undecoded text when decoding does not yield UTF-8), lowercase.
///
/// An empty result means "no identifier"; callers reject it before lookup.
pub fn normalize_variant_id(raw: &str) -> String {
    let mut rest = strip_scheme(raw.trim());
    if let Some(idx) = rest.find(['?', '#']) {
        rest = &rest[..idx];
    }
    let rest = rest.trim_matches(|c| c == '/' || c == '\\');

    let decoded = match percent_decode_str(rest).decode_utf8() {
        Ok(text) => text.into_owned(),
        Err(_) => rest.to_string(),
    };
    decoded.trim().to_lowercase()
}

/// Identifier extracted from a resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentifier {
    /// First path segment, normalized
    pub id: String,
    /// Number of non-empty segments after the first
    pub extra_segments: usize,
}

/// Extract the variant identifier from a request URL.
///
/// Only the first path segment is meaningful; trailing segments are counted
/// so the caller can log the unexpected shape. Returns `None` when nothing is
/// left after normalization.
pub fn extract_request_identifier(url: &str) -> Option<RequestIdentifier> {
    let normalized = normalize_variant_id(url);
    let mut segments = normalized.split(['/', '\\']).filter(|s| !s.is_empty());
    let id = segments.next()?.to_string();
    Some(RequestIdentifier {
        id,
        extra_segments: segments.count(),
    })
}

/// Reduce arbitrary text to an identifier-safe token.
///
/// Lowercases, keeps alphanumerics (any script), `_` and `.`, turns every
/// other run of characters into a single `-`, and trims dashes from the ends.
pub fn sanitize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out.trim_matches('.').to_string()
}

/// Deterministic identifier from family key, weight, style and a
/// source-specific token (usually the source file name, extension included).
///
/// The output is already in normalized form: `normalize_variant_id(id) == id`.
pub fn build_variant_id(family: &str, weight: &str, style: FontStyle, token: &str) -> String {
    [
        sanitize_token(family),
        sanitize_token(weight),
        style.as_str().to_string(),
        sanitize_token(token),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}

/// Canonical form of a declared identifier.
///
/// This is exactly [`normalize_variant_id`], so a request naming the declared
/// id (raw, percent-encoded or scheme-prefixed) finds it. `None` when nothing
/// remains or when the id spans more than one path segment, since a request
/// only ever carries the first segment.
pub fn canonical_declared_id(declared: &str) -> Option<String> {
    let id = normalize_variant_id(declared);
    if id.is_empty() || id.contains(['/', '\\']) {
        return None;
    }
    Some(id)
}

fn strip_scheme(mut s: &str) -> &str {
    while let Some(idx) = s.find("://") {
        let scheme = &s[..idx];
        let is_scheme = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !is_scheme {
            break;
        }
        s = &s[idx + 3..];
    }
    s
}
