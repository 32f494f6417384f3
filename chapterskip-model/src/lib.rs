//! Core data model definitions shared across the chapter skip crates.
//!
//! Everything here is plain data: identifiers, tick positions, the
//! now-playing item with its chapter list, the session events a host
//! delivers, the skip commands the core produces and the settings that
//! drive matching. Behaviour lives in `chapterskip-core`.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod command;
pub mod events;
pub mod ids;
pub mod media;
pub mod settings;
pub mod ticks;

pub use command::{SkipCommand, SkipReason};
pub use events::{ConfigChanged, PlaybackProgressEvent, SessionEvent};
pub use ids::{SessionId, UserId};
pub use media::{Chapter, NowPlayingItem};
pub use settings::{
    DEFAULT_NOTIFICATION_HEADER, DEFAULT_NOTIFICATION_TIMEOUT_MS,
    NotificationSettings, SkipSettings,
};
pub use ticks::{TICKS_PER_SECOND, Ticks};
