use std::{fmt, sync::Arc};

use chapterskip_model::SkipSettings;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};

use crate::error::{Result, SkipError};

/// Compiled chapter-name matcher. Immutable once built; replaced wholesale.
#[derive(Debug, Clone)]
pub struct ChapterPattern {
    regex: Regex,
}

impl ChapterPattern {
    /// Compile `raw` as an unanchored search pattern.
    pub fn compile(raw: &str, case_insensitive: bool) -> Result<Self> {
        RegexBuilder::new(raw)
            .case_insensitive(case_insensitive)
            .build()
            .map(|regex| Self { regex })
            .map_err(|source| SkipError::InvalidPattern {
                pattern: raw.to_string(),
                source: Box::new(source),
            })
    }

    /// Compile the pattern carried by `settings`; `Ok(None)` when blank.
    pub fn from_settings(settings: &SkipSettings) -> Result<Option<Self>> {
        settings
            .pattern()
            .map(|raw| Self::compile(raw, settings.case_insensitive))
            .transpose()
    }

    pub fn is_match(&self, chapter_name: &str) -> bool {
        self.regex.is_match(chapter_name)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Display for ChapterPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

/// Process-wide holder for the active pattern.
///
/// Writers compile outside the lock and only swap the `Arc` under it, so a
/// reader never waits on a compilation and always sees a whole value.
#[derive(Default)]
pub struct PatternSlot {
    active: RwLock<Option<Arc<ChapterPattern>>>,
}

impl fmt::Debug for PatternSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.snapshot();
        f.debug_struct("PatternSlot")
            .field("pattern", &active.as_ref().map(|p| p.as_str()))
            .finish()
    }
}

impl PatternSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pattern; hold on to it for the whole of one evaluation.
    pub fn snapshot(&self) -> Option<Arc<ChapterPattern>> {
        self.active.read().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.active.read().is_some()
    }

    /// Replace the active pattern from raw text.
    ///
    /// Blank input disables matching. A pattern that fails to compile also
    /// disables matching before the error is returned, so a previously valid
    /// pattern never outlives a broken configuration.
    pub fn set_pattern(&self, raw: Option<&str>, case_insensitive: bool) -> Result<()> {
        let compiled = match raw.filter(|raw| !raw.trim().is_empty()) {
            None => None,
            Some(raw) => match ChapterPattern::compile(raw, case_insensitive) {
                Ok(pattern) => Some(Arc::new(pattern)),
                Err(err) => {
                    self.replace(None);
                    return Err(err);
                }
            },
        };
        self.replace(compiled);
        Ok(())
    }

    pub fn apply(&self, settings: &SkipSettings) -> Result<()> {
        self.set_pattern(settings.pattern(), settings.case_insensitive)
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    fn replace(&self, next: Option<Arc<ChapterPattern>>) {
        *self.active.write() = next;
    }
}
