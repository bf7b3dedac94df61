//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::error::SiteResult;
use crate::locale::{Locale, LocaleRegistry};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Configured locale ids in order (SENTIERO_LOCALES, comma-separated,
    /// default: "en").
    pub locales: Vec<String>,

    /// Default locale id (SENTIERO_DEFAULT_LOCALE, default: the first
    /// configured locale).
    pub default_locale: String,

    /// Path to the persisted site snapshot (SENTIERO_SITE_FILE, default:
    /// ./site.json).
    pub site_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let locales: Vec<String> = env::var("SENTIERO_LOCALES")
            .unwrap_or_else(|_| "en".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let default_locale = match env::var("SENTIERO_DEFAULT_LOCALE") {
            Ok(value) => value.trim().to_string(),
            Err(_) => locales
                .first()
                .cloned()
                .context("SENTIERO_LOCALES must name at least one locale")?,
        };

        let site_file = env::var("SENTIERO_SITE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("site.json"));

        Ok(Self {
            locales,
            default_locale,
            site_file,
        })
    }

    /// Build the locale registry this configuration describes. Fails
    /// with a config error when the default locale is not among the
    /// configured ones or an id is invalid.
    pub fn registry(&self) -> SiteResult<LocaleRegistry> {
        let locales = self
            .locales
            .iter()
            .enumerate()
            .map(|(weight, id)| Locale {
                id: id.clone(),
                label: id.clone(),
                weight: i32::try_from(weight).unwrap_or(i32::MAX),
                is_default: *id == self.default_locale,
            })
            .collect();
        LocaleRegistry::new(locales)
    }
}
