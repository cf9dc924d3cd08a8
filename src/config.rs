//! Configuration handling for the TUI

use crate::backend::DEFAULT_BACKEND_URL;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `backend_url`
pub const BACKEND_URL_ENV: &str = "BHARATVOICE_BACKEND_URL";

/// How voice answers are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngine {
    /// A local program prints the transcript
    #[default]
    Command,
    /// A local recorder writes audio that the form service transcribes
    Backend,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SpeechConfig {
    #[serde(default)]
    pub engine: SpeechEngine,
    /// Program to run; voice input is off when unset
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Recognition language, `en-IN` when unset
    pub language: Option<String>,
}

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Form service address
    pub backend_url: Option<String>,
    /// Where generated PDFs are written
    pub download_dir: Option<PathBuf>,
    /// Ask the service to check answers before moving on
    pub validate_answers: Option<bool>,
    /// Per-request timeout; requests wait indefinitely when unset
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub speech: SpeechConfig,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "bharatvoice", "bharatvoice-tui")
}

impl TuiConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from file, writing the defaults on first run
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Self::default();
        if let Err(e) = config.save_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default config");
        } else {
            tracing::info!(path = %path.display(), "wrote default config");
        }
        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: TuiConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Service address; the environment wins over the file
    pub fn backend_url(&self) -> String {
        resolve_backend_url(std::env::var(BACKEND_URL_ENV).ok(), self.backend_url.as_deref())
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn validate_answers(&self) -> bool {
        self.validate_answers.unwrap_or(true)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn resolve_backend_url(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|url| !url.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}
