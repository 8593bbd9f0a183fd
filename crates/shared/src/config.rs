//! Configuration management for the Jikan portal.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata API settings
    pub api: ApiConfig,

    /// Result caps and validation bounds for listings
    pub listing: ListingConfig,

    /// Interactive search settings
    pub search: SearchConfig,

    /// Logical listing to element id mapping
    pub containers: ContainerIds,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Metadata API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Listing caps and year bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Result cap for free-text anime search
    pub search_limit: u32,

    /// Result cap for the top anime/manga listings
    pub top_limit: u32,

    /// Result cap for the yearly listing
    pub year_limit: u32,

    /// Result cap for the genre listing
    pub genre_limit: u32,

    /// Result cap for free-text manga search
    pub manga_search_limit: u32,

    /// Client-side truncation of the upcoming season listing
    pub upcoming_max: usize,

    /// Client-side truncation of the character list
    pub characters_max: usize,

    /// Earliest accepted year
    pub min_year: i32,

    /// Latest accepted year, also the default yearly listing
    pub max_year: i32,

    /// Genre loaded on genre pages (none = wait for an explicit request)
    pub default_genre: Option<u32>,
}

/// Interactive search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Settling delay in milliseconds
    pub debounce_ms: u64,
}

/// Element ids the page bootstrapper probes for.
///
/// Every logical listing or control maps to exactly one id; there is no
/// fallback from one listing's container to another's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerIds {
    pub anime_list: String,
    pub search_box: String,
    pub year_input: String,
    pub year_button: String,
    pub anime_yearly: String,
    pub anime_upcoming: String,
    pub genre_results: String,
    pub genre_title: String,
    pub anime_detail: String,
    pub anime_characters: String,
    pub manga_list: String,
    pub manga_search_box: String,
    pub manga_detail: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout_secs: 30,
            user_agent: "jikan-portal/0.1.0".to_string(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            search_limit: 23,
            top_limit: 24,
            year_limit: 15,
            genre_limit: 25,
            manga_search_limit: 25,
            upcoming_max: 24,
            characters_max: 1000,
            min_year: 1964,
            max_year: 2025,
            default_genre: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for ContainerIds {
    fn default() -> Self {
        Self {
            anime_list: "anime-list".to_string(),
            search_box: "searchBox".to_string(),
            year_input: "search-year".to_string(),
            year_button: "year-search-btn".to_string(),
            anime_yearly: "anime-yearly".to_string(),
            anime_upcoming: "anime-upcoming".to_string(),
            genre_results: "anime-genre-results".to_string(),
            genre_title: "genre-title".to_string(),
            anime_detail: "anime-detail".to_string(),
            anime_characters: "anime-characters".to_string(),
            manga_list: "manga-list".to_string(),
            manga_search_box: "searchBoxManga".to_string(),
            manga_detail: "manga-detail".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }
}
