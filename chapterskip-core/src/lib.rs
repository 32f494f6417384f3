//! # Chapter Skip Core
//!
//! Watches playback progress for live sessions and commands a seek past any
//! chapter whose name matches the configured pattern ("Intro", "Recap",
//! "Credits", ...), once per matched chapter boundary per session.
//!
//! ## Architecture
//!
//! - [`chapters`]: pure chapter arithmetic (current chapter, skip target)
//! - [`pattern`]: compiled pattern and the hot-swappable [`PatternSlot`]
//! - [`state`]: per-session last skip target with atomic per-key updates
//! - [`skipper`]: the synchronous decision engine combining the three
//! - [`controller`]: lifecycle, event routing and command dispatch
//! - [`ports`]: collaborator traits the host implements
//! - [`bus`]: in-process implementations of the session and config sources
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chapterskip_core::{
//!     ChapterSkipController, CommandSink, InMemoryConfigSource, InProcSessionEventBus,
//! };
//! use chapterskip_model::SkipSettings;
//!
//! async fn run(sink: Arc<dyn CommandSink>) -> Result<(), Box<dyn std::error::Error>> {
//!     let sessions = Arc::new(InProcSessionEventBus::default());
//!     let config = Arc::new(InMemoryConfigSource::new(SkipSettings::with_pattern(
//!         "(?i)intro|recap|credits",
//!     )));
//!
//!     let controller = ChapterSkipController::new(sessions.clone(), config, sink);
//!     controller.start().await?;
//!     // ... host publishes progress through `sessions` ...
//!     controller.stop().await;
//!     Ok(())
//! }
//! ```

// TODO: Document the remaining public accessors and lift this allow.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// In-process session event bus and configuration source
pub mod bus;

/// Chapter lookup and skip target planning
pub mod chapters;

/// Controller lifecycle and command dispatch
pub mod controller;

/// Error types
pub mod error;

/// Pattern compilation and atomic replacement
pub mod pattern;

/// Collaborator traits
pub mod ports;

/// Synchronous skip decision engine
pub mod skipper;

/// Per-session skip bookkeeping
pub mod state;

pub use bus::{InMemoryConfigSource, InProcSessionEventBus};
pub use chapters::{SkipPlan, current_chapter_index, plan_skip};
pub use controller::ChapterSkipController;
pub use error::{Result, SkipError};
pub use pattern::{ChapterPattern, PatternSlot};
pub use ports::{CommandError, CommandSink, ConfigurationSource, SessionEventSource};
pub use skipper::ChapterSkipper;
pub use state::{Advance, SkipState};
