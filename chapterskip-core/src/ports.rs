//! Collaborator contracts. The host implements these; the controller only
//! ever talks to the outside world through them.

use std::time::Duration;

use async_trait::async_trait;
use chapterskip_model::{ConfigChanged, SessionEvent, SessionId, SkipSettings, Ticks, UserId};
use thiserror::Error;
use tokio::sync::broadcast;

/// Failures a [`CommandSink`] may report. The controller logs them and moves on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("session {0} is not connected")]
    SessionNotFound(SessionId),

    #[error("command rejected by client: {0}")]
    Rejected(String),

    #[error("command transport failed: {0}")]
    Transport(String),
}

/// Host-side stream of playback progress and stop notifications.
pub trait SessionEventSource: Send + Sync {
    fn subscribe_sessions(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Current skip settings plus a change signal.
pub trait ConfigurationSource: Send + Sync {
    /// Read synchronously; called at start and after every change signal.
    fn current(&self) -> SkipSettings;

    fn subscribe_changes(&self) -> broadcast::Receiver<ConfigChanged>;
}

/// Outbound commands addressed to a session's client.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send_seek(
        &self,
        session_id: &SessionId,
        controlling_user: UserId,
        target: Ticks,
    ) -> Result<(), CommandError>;

    async fn send_notification(
        &self,
        session_id: &SessionId,
        header: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), CommandError>;
}
