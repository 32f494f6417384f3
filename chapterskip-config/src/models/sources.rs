use std::path::PathBuf;

use chapterskip_model::SkipSettings;
use serde::{Deserialize, Serialize};

use crate::util::non_blank;

pub const ENV_CONFIG_PATH: &str = "CHAPTER_SKIP_CONFIG";
pub const ENV_MATCH: &str = "CHAPTER_SKIP_MATCH";
pub const ENV_CASE_INSENSITIVE: &str = "CHAPTER_SKIP_CASE_INSENSITIVE";
pub const ENV_NOTIFY: &str = "CHAPTER_SKIP_NOTIFY";
pub const ENV_NOTIFY_HEADER: &str = "CHAPTER_SKIP_NOTIFY_HEADER";
pub const ENV_NOTIFY_TIMEOUT: &str = "CHAPTER_SKIP_NOTIFY_TIMEOUT";

/// Raw configuration as defined in a TOML or JSON file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub skip: FileSkipConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSkipConfig {
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    #[serde(default)]
    pub notification: FileNotificationConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileNotificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl FileSkipConfig {
    /// Overlay the values present in the file. Returns whether the file set
    /// a pattern (an empty string counts: it deliberately disables matching).
    pub fn apply_to(&self, settings: &mut SkipSettings) -> bool {
        if let Some(case_insensitive) = self.case_insensitive {
            settings.case_insensitive = case_insensitive;
        }
        if let Some(enabled) = self.notification.enabled {
            settings.notification.enabled = enabled;
        }
        if let Some(header) = &self.notification.header {
            settings.notification.header = header.clone();
        }
        if let Some(timeout_ms) = self.notification.timeout_ms {
            settings.notification.timeout_ms = timeout_ms;
        }
        match &self.match_pattern {
            Some(pattern) => {
                settings.match_pattern = Some(pattern.clone());
                true
            }
            None => false,
        }
    }
}

/// Environment overrides, kept raw so parse errors can name the variable.
/// Blank variables are treated as unset.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub match_pattern: Option<String>,
    pub case_insensitive: Option<String>,
    pub notify: Option<String>,
    pub notify_header: Option<String>,
    pub notify_timeout: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_blank(lookup(key));
        Self {
            config_path: var(ENV_CONFIG_PATH).map(PathBuf::from),
            match_pattern: var(ENV_MATCH),
            case_insensitive: var(ENV_CASE_INSENSITIVE),
            notify: var(ENV_NOTIFY),
            notify_header: var(ENV_NOTIFY_HEADER),
            notify_timeout: var(ENV_NOTIFY_TIMEOUT),
        }
    }
}
