//! Locale records and the startup-validated locale registry.
//!
//! Locales are site-level configuration. A registry is immutable after
//! construction and always holds at least one locale with exactly one
//! marked as the site default.

use serde::{Deserialize, Serialize};

use crate::error::{SiteError, SiteResult};

/// A configured content locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Locale code (e.g., "en", "de", "pt-br").
    pub id: String,

    /// Human-readable label (e.g., "English").
    pub label: String,

    /// Sort weight for locale ordering.
    pub weight: i32,

    /// Whether this is the site default locale.
    pub is_default: bool,
}

impl Locale {
    /// Build a non-default locale with label equal to its id and weight 0.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            weight: 0,
            is_default: false,
        }
    }

    /// Build a default locale with label equal to its id and weight 0.
    pub fn new_default(id: &str) -> Self {
        Self {
            is_default: true,
            ..Self::new(id)
        }
    }
}

/// Validate that a label is non-empty and at most 255 characters.
fn validate_label(label: &str) -> SiteResult<()> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(SiteError::Config("locale label must not be empty".into()));
    }
    if trimmed.len() > 255 {
        return Err(SiteError::Config(format!(
            "locale label must be at most 255 characters, got {}",
            trimmed.len()
        )));
    }
    Ok(())
}

/// Validate that a locale ID follows BCP 47 primary subtag format.
///
/// Accepts: lowercase alpha 2-3 chars, optionally followed by
/// hyphen-separated alphanumeric subtags (e.g., "en", "fr", "pt-br",
/// "zh-hans").
fn validate_locale_id(id: &str) -> SiteResult<()> {
    if id.is_empty() || id.len() > 12 {
        return Err(SiteError::Config(format!(
            "locale ID must be 1-12 characters, got '{id}'"
        )));
    }

    let mut parts = id.split('-');

    // Primary subtag: 2-3 lowercase letters
    match parts.next() {
        Some(primary) if (2..=3).contains(&primary.len()) => {
            if !primary.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(SiteError::Config(format!(
                    "locale ID primary subtag must be lowercase letters, got '{id}'"
                )));
            }
        }
        _ => {
            return Err(SiteError::Config(format!(
                "locale ID must start with a 2-3 letter primary subtag, got '{id}'"
            )));
        }
    }

    // Optional subtags: alphanumeric, 1-8 chars each
    for subtag in parts {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(SiteError::Config(format!(
                "locale ID subtag must be 1-8 alphanumeric characters, got '{subtag}' in '{id}'"
            )));
        }
    }

    Ok(())
}

/// Ordered set of configured locales with a single designated default.
///
/// Immutable after construction; all validation happens in [`LocaleRegistry::new`].
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    /// Locales sorted by (weight, id).
    locales: Vec<Locale>,
    /// Index of the default locale in `locales`.
    default_index: usize,
}

impl LocaleRegistry {
    /// Build a registry from a list of locales.
    ///
    /// Fails with [`SiteError::Config`] when the list is empty, an id or
    /// label is invalid, an id repeats, or the number of default-flagged
    /// locales is not exactly one.
    pub fn new(mut locales: Vec<Locale>) -> SiteResult<Self> {
        if locales.is_empty() {
            return Err(SiteError::Config(
                "locale registry must contain at least one locale".into(),
            ));
        }

        for locale in &locales {
            validate_locale_id(&locale.id)?;
            validate_label(&locale.label)?;
        }

        locales.sort_by(|a, b| (a.weight, &a.id).cmp(&(b.weight, &b.id)));

        let mut seen: Vec<&str> = locales.iter().map(|l| l.id.as_str()).collect();
        seen.sort_unstable();
        if let Some(dup) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(SiteError::Config(format!(
                "duplicate locale id '{}'",
                dup[0]
            )));
        }

        let defaults: Vec<usize> = locales
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_default)
            .map(|(i, _)| i)
            .collect();
        let default_index = match defaults.as_slice() {
            [i] => *i,
            [] => {
                return Err(SiteError::Config(
                    "locale registry has no default locale".into(),
                ));
            }
            _ => {
                return Err(SiteError::Config(format!(
                    "locale registry has {} default locales, expected exactly one",
                    defaults.len()
                )));
            }
        };

        Ok(Self {
            locales,
            default_index,
        })
    }

    /// All configured locales in weight order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// The site default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default_index]
    }

    /// Look up a locale by id.
    pub fn get(&self, id: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.id == id)
    }

    /// Whether the registry contains this locale id.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up a locale by id, failing with [`SiteError::UnknownLocale`].
    pub fn require(&self, id: &str) -> SiteResult<&Locale> {
        self.get(id)
            .ok_or_else(|| SiteError::UnknownLocale(id.to_string()))
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Vec<Locale> {
        vec![Locale::new_default("de"), Locale::new("en")]
    }

    #[test]
    fn registry_with_one_default() {
        let registry = LocaleRegistry::new(sample()).unwrap();
        assert_eq!(registry.default_locale().id, "de");
        assert_eq!(registry.locales().len(), 2);
    }

    #[test]
    fn registry_rejects_empty() {
        assert!(matches!(
            LocaleRegistry::new(vec![]),
            Err(SiteError::Config(_))
        ));
    }

    #[test]
    fn registry_rejects_no_default() {
        let locales = vec![Locale::new("de"), Locale::new("en")];
        assert!(matches!(
            LocaleRegistry::new(locales),
            Err(SiteError::Config(_))
        ));
    }

    #[test]
    fn registry_rejects_two_defaults() {
        let locales = vec![Locale::new_default("de"), Locale::new_default("en")];
        assert!(matches!(
            LocaleRegistry::new(locales),
            Err(SiteError::Config(_))
        ));
    }

    #[test]
    fn registry_rejects_duplicate_ids() {
        let locales = vec![Locale::new_default("de"), Locale::new("de")];
        assert!(matches!(
            LocaleRegistry::new(locales),
            Err(SiteError::Config(_))
        ));
    }

    #[test]
    fn registry_orders_by_weight_then_id() {
        let mut en = Locale::new("en");
        en.weight = -1;
        let locales = vec![Locale::new_default("de"), Locale::new("fr"), en];
        let registry = LocaleRegistry::new(locales).unwrap();
        let ids: Vec<&str> = registry.locales().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["en", "de", "fr"]);
    }

    #[test]
    fn require_unknown_locale() {
        let registry = LocaleRegistry::new(sample()).unwrap();
        assert!(matches!(
            registry.require("fr"),
            Err(SiteError::UnknownLocale(_))
        ));
        assert!(registry.require("en").is_ok());
    }

    #[test]
    fn validate_locale_id_accepts_valid() {
        assert!(validate_locale_id("en").is_ok());
        assert!(validate_locale_id("de").is_ok());
        assert!(validate_locale_id("pt-br").is_ok());
        assert!(validate_locale_id("zh-hans").is_ok());
        assert!(validate_locale_id("ast").is_ok()); // 3-letter primary
    }

    #[test]
    fn validate_locale_id_rejects_invalid() {
        assert!(validate_locale_id("").is_err(), "empty");
        assert!(validate_locale_id("e").is_err(), "too short");
        assert!(validate_locale_id("EN").is_err(), "uppercase");
        assert!(validate_locale_id("en us").is_err(), "space");
        assert!(validate_locale_id("en-").is_err(), "trailing hyphen");
        assert!(validate_locale_id("abcdefghijklm").is_err(), "too long");
    }

    #[test]
    fn locale_serialization_round_trip() {
        let locale = Locale::new_default("de");
        let json = serde_json::to_string(&locale).unwrap();
        let parsed: Locale = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, locale);
    }
}
