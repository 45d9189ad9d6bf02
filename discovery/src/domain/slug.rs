//! Detail-page route segments.
//!
//! A segment starts with the property's canonical UUID and may carry a
//! human-readable suffix (`a1b2c3d4-…-1234567890ab-ocean-villa`). Only the
//! identifier prefix is meaningful; the suffix is decoration.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::PropertyId;

static PROPERTY_ID_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn property_id_prefix_regex() -> &'static Regex {
    PROPERTY_ID_PREFIX_RE.get_or_init(|| {
        let pattern = "(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("property id regex failed to compile: {error}"))
    })
}

/// Extract the canonical identifier a route segment begins with.
///
/// Matching ignores case; the returned identifier keeps the segment's
/// original casing. Returns `None` when the segment does not start with an
/// identifier, in which case no lookup should be attempted.
///
/// # Examples
/// ```
/// use discovery::domain::slug::resolve;
///
/// let id = resolve("a1b2c3d4-e5f6-7890-abcd-1234567890ab-some-title").expect("resolves");
/// assert_eq!(id.as_ref(), "a1b2c3d4-e5f6-7890-abcd-1234567890ab");
/// assert!(resolve("not-a-uuid").is_none());
/// ```
pub fn resolve(segment: &str) -> Option<PropertyId> {
    let matched = property_id_prefix_regex().find(segment)?;
    PropertyId::new(matched.as_str()).ok()
}

/// Lowercase, hyphen-separated rendering of a title.
///
/// Runs of anything other than ASCII letters and digits collapse to a single
/// hyphen; leading and trailing hyphens are dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Build the canonical route segment for a listing.
///
/// The result always resolves back to `id` through [`resolve`].
pub fn property_slug(id: &PropertyId, title: &str) -> String {
    let suffix = slugify(title);
    if suffix.is_empty() {
        id.to_string()
    } else {
        format!("{id}-{suffix}")
    }
}
