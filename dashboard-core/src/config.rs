use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, num::NonZeroUsize, path::PathBuf, time::Duration};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_PAGE_SIZE: usize = 4;
pub const DEFAULT_NOTIFICATION_DISPLAY_MS: u64 = 3000;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_base_url = "http://localhost:8000"
/// entries_page_size = 4
/// notification_display_ms = 3000
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of both the weather service and the entries backend.
    pub api_base_url: String,

    pub entries_page_size: usize,

    pub notification_display_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            entries_page_size: DEFAULT_PAGE_SIZE,
            notification_display_ms: DEFAULT_NOTIFICATION_DISPLAY_MS,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            anyhow!(
                "Invalid api_base_url '{}': {e}.\n\
                 Hint: run `weather-dashboard configure` and enter a URL like \
                 {DEFAULT_API_BASE_URL}.",
                self.api_base_url
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Invalid api_base_url '{}': only http and https are supported.",
                self.api_base_url
            ));
        }

        if self.entries_page_size == 0 {
            return Err(anyhow!(
                "entries_page_size must be at least 1.\n\
                 Hint: run `weather-dashboard configure` to fix it."
            ));
        }

        Ok(())
    }

    /// Convenience helper: replace the base URL, dropping trailing slashes.
    pub fn set_api_base_url(&mut self, url: &str) {
        self.api_base_url = url.trim().trim_end_matches('/').to_string();
    }

    pub fn page_size(&self) -> NonZeroUsize {
        // validate() rejects zero; an unvalidated zero degrades to one per page
        NonZeroUsize::new(self.entries_page_size).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification_display_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_local_service() {
        let cfg = Config::default();
        assert_eq!(cfg.api_base_url, "http://localhost:8000");
        assert_eq!(cfg.page_size().get(), 4);
        assert_eq!(cfg.notification_display(), Duration::from_secs(3));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg = Config::from_toml("api_base_url = \"https://weather.example.com\"\n")
            .expect("valid config");

        assert_eq!(cfg.api_base_url, "https://weather.example.com");
        assert_eq!(cfg.entries_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.notification_display_ms, DEFAULT_NOTIFICATION_DISPLAY_MS);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = Config::from_toml("entries_page_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("entries_page_size must be at least 1"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let cfg = Config { api_base_url: "ftp://example.com".into(), ..Config::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("only http and https"));
    }

    #[test]
    fn set_api_base_url_drops_trailing_slash() {
        let mut cfg = Config::default();
        cfg.set_api_base_url(" http://10.0.0.5:8000/ ");
        assert_eq!(cfg.api_base_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let cfg = Config {
            api_base_url: "http://127.0.0.1:9000".into(),
            entries_page_size: 6,
            notification_display_ms: 1500,
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
