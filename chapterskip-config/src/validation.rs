use chapterskip_core::{ChapterPattern, SkipError};
use thiserror::Error;

use crate::models::Config;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("chapter match pattern rejected: {0}")]
    InvalidPattern(#[source] SkipError),
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Reject settings the skipper cannot use and flag ones likely to misfire.
pub fn apply_guard_rails(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let skip = &config.skip;

    match ChapterPattern::from_settings(skip).map_err(ConfigGuardRailError::InvalidPattern)? {
        None => warnings.push_with_hint(
            "no chapter match pattern configured; chapter skipping is disabled",
            "set `match` under [skip] or CHAPTER_SKIP_MATCH, e.g. \"(?i)intro|recap|credits\"",
        ),
        Some(pattern) if pattern.is_match("") => warnings.push_with_hint(
            format!("pattern '{pattern}' matches an empty string, so every named chapter will be skipped"),
            "anchor or tighten the pattern, e.g. \"^(Intro|Credits)$\"",
        ),
        Some(_) => {}
    }

    let notification = &skip.notification;
    if notification.enabled {
        if notification.timeout_ms == 0 {
            warnings.push(
                "notification timeout is 0ms; clients may not display skip notifications",
            );
        }
        if notification.header.trim().is_empty() {
            warnings.push("notification header is blank");
        }
    }

    Ok(warnings)
}
