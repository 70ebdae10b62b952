use crate::api::PrivacyStatus;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Credential file holding the browser request headers.
    #[serde(default = "default_auth_file")]
    pub auth_file: PathBuf,
    /// Directory for the diagnostic log and the per-run skipped/failed logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Supports `${playlist_name}` and `${file_name}` placeholders.
    #[serde(default = "default_description_template")]
    pub playlist_description_template: String,
    #[serde(default)]
    pub privacy_status: PrivacyStatus,
    /// Interface language sent with every API request.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_auth_file() -> PathBuf { "headers_auth.json".into() }
fn default_log_dir() -> PathBuf { "logs".into() }
fn default_description_template() -> String { "Playlist created from ${file_name}".into() }
fn default_language() -> String { "en".into() }

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_file: default_auth_file(),
            log_dir: default_log_dir(),
            playlist_description_template: default_description_template(),
            privacy_status: PrivacyStatus::default(),
            language: default_language(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Per-user config location, e.g. `~/.config/ytmusic-csv-import/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ytmusic-csv-import").join("config.toml"))
    }

    /// Explicit path wins; otherwise the per-user file if it exists; otherwise defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(p) = explicit {
            return Self::from_path(p);
        }
        match Self::default_path() {
            Some(p) if p.exists() => Self::from_path(&p),
            _ => Ok(Self::default()),
        }
    }

    pub fn playlist_description(&self, playlist_name: &str, file_name: &str) -> String {
        crate::util::expand_template(&self.playlist_description_template, playlist_name, file_name)
    }
}
