//! Persisted configuration storage
//!
//! Options are stored JSON-encoded in one file. Loading merges the stored
//! record into the defaults field by field, so configs written by older
//! versions keep their known fields and pick up defaults for new ones.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::types::{CONFIG_VERSION, PrintConfig};

/// Partial configuration as read from storage. Every field is optional;
/// missing fields fall back to the default record on merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub min_page_delay_ms: Option<u64>,
    pub max_page_delay_ms: Option<u64>,
    pub stripped_tables: Option<bool>,
    pub include_cover: Option<bool>,
    pub include_introduction: Option<bool>,
    pub include_backlinks: Option<bool>,
    pub include_title: Option<bool>,
    pub include_genre_suffix: Option<bool>,
    pub include_username: Option<bool>,
    pub include_printed_with_hint: Option<bool>,
    pub fail_on_error: Option<bool>,
    pub download_html: Option<bool>,
    pub include_player_version_maps: Option<bool>,
    pub use_big_map_images: Option<bool>,
    pub heading_on_new_page: Option<bool>,
    pub wait_for_confirmation: Option<bool>,
    pub version: Option<u32>,
}

impl StoredConfig {
    /// Merge this partial record into the defaults.
    ///
    /// Migration rule: a record without a `version` field predates the
    /// versioned schema, whose builds shipped zero pacing bounds. Its pacing
    /// fields are overridden with the current defaults instead of being
    /// honored, and the version is bumped. Versioned records keep their
    /// pacing bounds.
    #[must_use]
    pub fn into_config(self) -> PrintConfig {
        let defaults = PrintConfig::default();
        let unversioned = self.version.is_none();

        let (min_delay, max_delay) = if unversioned {
            log::info!(
                "Migrating unversioned configuration: pacing bounds reset to {}..{} ms",
                defaults.min_page_delay_ms,
                defaults.max_page_delay_ms
            );
            (defaults.min_page_delay_ms, defaults.max_page_delay_ms)
        } else {
            (
                self.min_page_delay_ms.unwrap_or(defaults.min_page_delay_ms),
                self.max_page_delay_ms.unwrap_or(defaults.max_page_delay_ms),
            )
        };

        PrintConfig {
            min_page_delay_ms: min_delay,
            max_page_delay_ms: max_delay,
            stripped_tables: self.stripped_tables.unwrap_or(defaults.stripped_tables),
            include_cover: self.include_cover.unwrap_or(defaults.include_cover),
            include_introduction: self
                .include_introduction
                .unwrap_or(defaults.include_introduction),
            include_backlinks: self.include_backlinks.unwrap_or(defaults.include_backlinks),
            include_title: self.include_title.unwrap_or(defaults.include_title),
            include_genre_suffix: self
                .include_genre_suffix
                .unwrap_or(defaults.include_genre_suffix),
            include_username: self.include_username.unwrap_or(defaults.include_username),
            include_printed_with_hint: self
                .include_printed_with_hint
                .unwrap_or(defaults.include_printed_with_hint),
            fail_on_error: self.fail_on_error.unwrap_or(defaults.fail_on_error),
            download_html: self.download_html.unwrap_or(defaults.download_html),
            include_player_version_maps: self
                .include_player_version_maps
                .unwrap_or(defaults.include_player_version_maps),
            use_big_map_images: self
                .use_big_map_images
                .unwrap_or(defaults.use_big_map_images),
            heading_on_new_page: self
                .heading_on_new_page
                .unwrap_or(defaults.heading_on_new_page),
            wait_for_confirmation: self
                .wait_for_confirmation
                .unwrap_or(defaults.wait_for_confirmation),
            version: CONFIG_VERSION,
        }
        .normalized()
    }
}

/// JSON-file-backed key-value store for the configuration record
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform configuration directory
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().context("No platform configuration directory available")?;
        Ok(Self::new(dir.join("bookbinder").join("options.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, merging stored fields over defaults.
    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<PrintConfig> {
        if !self.path.exists() {
            log::debug!("No saved options at {}, using defaults", self.path.display());
            return Ok(PrintConfig::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read options from {}", self.path.display()))?;
        let stored: StoredConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed options file {}", self.path.display()))?;
        Ok(stored.into_config())
    }

    /// Persist a full configuration record
    pub fn save(&self, config: &PrintConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(config).context("Failed to encode options")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write options to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let stored: StoredConfig =
            serde_json::from_str(r#"{"include_title": false, "version": 1}"#).unwrap();
        let config = stored.into_config();
        assert!(!config.include_title);
        assert!(config.include_cover);
        assert_eq!(config.min_page_delay_ms, PrintConfig::default().min_page_delay_ms);
    }

    #[test]
    fn unversioned_config_gets_pacing_reset() {
        let stored: StoredConfig =
            serde_json::from_str(r#"{"min_page_delay_ms": 0, "max_page_delay_ms": 0}"#).unwrap();
        let config = stored.into_config();
        let defaults = PrintConfig::default();
        assert_eq!(config.min_page_delay_ms, defaults.min_page_delay_ms);
        assert_eq!(config.max_page_delay_ms, defaults.max_page_delay_ms);
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn versioned_config_keeps_pacing() {
        let stored: StoredConfig = serde_json::from_str(
            r#"{"min_page_delay_ms": 10, "max_page_delay_ms": 20, "version": 1}"#,
        )
        .unwrap();
        let config = stored.into_config();
        assert_eq!(config.min_page_delay_ms, 10);
        assert_eq!(config.max_page_delay_ms, 20);
    }

    #[test]
    fn inverted_pacing_bounds_are_normalized_on_load() {
        let stored: StoredConfig = serde_json::from_str(
            r#"{"min_page_delay_ms": 800, "max_page_delay_ms": 100, "version": 1}"#,
        )
        .unwrap();
        let config = stored.into_config();
        assert!(config.min_page_delay_ms <= config.max_page_delay_ms);
    }
}
