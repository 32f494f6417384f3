use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_HEADER: &str = "Chapter Skip";
pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 3_000;

/// Settings for the transient message shown when a chapter is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NotificationSettings {
    /// Disabling suppresses only the message; seeks are still sent.
    pub enabled: bool,
    pub header: String,
    pub timeout_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            header: DEFAULT_NOTIFICATION_HEADER.to_string(),
            timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT_MS,
        }
    }
}

impl NotificationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn text_for(&self, chapter_name: &str) -> String {
        format!("Skipped {chapter_name}")
    }
}

/// Everything that drives chapter matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkipSettings {
    /// Pattern matched against chapter names. Blank disables skipping.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "match", skip_serializing_if = "Option::is_none")
    )]
    pub match_pattern: Option<String>,
    pub case_insensitive: bool,
    pub notification: NotificationSettings,
}

impl SkipSettings {
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// The configured pattern, or `None` when absent or whitespace-only.
    pub fn pattern(&self) -> Option<&str> {
        self.match_pattern
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
    }
}
