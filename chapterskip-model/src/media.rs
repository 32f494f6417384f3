use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ticks::Ticks;

/// A chapter marker on the playing item.
///
/// Hosts frequently leave chapter names empty (auto-generated markers), so
/// the name stays optional and an unnamed chapter never matches a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chapter {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    pub start_position_ticks: Ticks,
}

impl Chapter {
    pub fn new(name: impl Into<String>, start_position_ticks: Ticks) -> Self {
        Self {
            name: Some(name.into()),
            start_position_ticks,
        }
    }

    pub fn unnamed(start_position_ticks: Ticks) -> Self {
        Self {
            name: None,
            start_position_ticks,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// The item a session is currently playing, as reported by the host.
///
/// `chapters` is ordered by start position and does not change for the
/// lifetime of one playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NowPlayingItem {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<Uuid>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chapters: Vec<Chapter>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub runtime_ticks: Option<Ticks>,
}

impl NowPlayingItem {
    pub fn with_chapters(chapters: Vec<Chapter>, runtime_ticks: Option<Ticks>) -> Self {
        Self {
            chapters,
            runtime_ticks,
            ..Self::default()
        }
    }

    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }
}
