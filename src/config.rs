use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::reconcile::{AppendLayout, ReconcileOptions};
use crate::utils::fuzzy::MATCH_THRESHOLD;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the extraction service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// User configuration, read from `~/.renosheet/rc`
///
/// The file holds `key=value` lines; `#` starts a comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gemini: GeminiSettings,
    pub threshold: u8,
    pub layout: AppendLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiSettings::default(),
            threshold: MATCH_THRESHOLD,
            layout: AppendLayout::default(),
        }
    }
}

impl Config {
    /// Get the configuration file path
    ///
    /// `RENOSHEET_CONFIG` wins over the default location in the home directory.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RENOSHEET_CONFIG") {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".renosheet").join("rc")
    }

    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.gemini.api_key = Some(key.trim().to_string());
            }
        }
        Ok(config)
    }

    /// Load configuration from a file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse rc file content
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                anyhow::bail!("line {}: expected key=value, got '{}'", line_no + 1, line);
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "gemini.api_key" => {
                    config.gemini.api_key = Some(value.to_string()).filter(|v| !v.is_empty());
                }
                "gemini.model" => config.gemini.model = value.to_string(),
                "gemini.endpoint" => config.gemini.endpoint = value.to_string(),
                "gemini.timeout_secs" => {
                    config.gemini.timeout_secs = value
                        .parse()
                        .with_context(|| format!("line {}: invalid timeout '{}'", line_no + 1, value))?;
                }
                "match.threshold" => {
                    let threshold: u8 = value
                        .parse()
                        .with_context(|| format!("line {}: invalid threshold '{}'", line_no + 1, value))?;
                    if threshold > 100 {
                        anyhow::bail!("line {}: threshold must be between 0 and 100", line_no + 1);
                    }
                    config.threshold = threshold;
                }
                "append.layout" => {
                    config.layout = AppendLayout::parse(value).ok_or_else(|| {
                        anyhow::anyhow!(
                            "line {}: append.layout must be 'aligned' or 'schema', got '{}'",
                            line_no + 1,
                            value
                        )
                    })?;
                }
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            threshold: self.threshold,
            layout: self.layout,
        }
    }
}
