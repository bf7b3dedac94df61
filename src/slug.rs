//! Slug derivation and validation.

use crate::error::{SiteError, SiteResult};

/// Maximum slug length in bytes.
const MAX_SLUG_LEN: usize = 128;

/// Convert text into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with
/// hyphens, collapses consecutive hyphens, and trims leading/trailing
/// hyphens. Long results are truncated at a word boundary.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > MAX_SLUG_LEN {
        // result is pure ASCII at this point, byte index is a char boundary.
        let truncated = &result[..MAX_SLUG_LEN];
        // Find a clean break point (don't cut in middle of word)
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Validate a slug: non-empty, at most 128 bytes, characters limited to
/// lowercase ASCII alphanumerics, hyphen, and underscore.
pub fn validate_slug(slug: &str) -> SiteResult<()> {
    if slug.is_empty() {
        return Err(SiteError::InvalidSlug("slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(SiteError::InvalidSlug(format!(
            "slug must be at most {MAX_SLUG_LEN} characters, got {}",
            slug.len()
        )));
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
    {
        return Err(SiteError::InvalidSlug(format!(
            "slug '{slug}' may only contain lowercase letters, digits, hyphens, and underscores"
        )));
    }
    Ok(())
}
