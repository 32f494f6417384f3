#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ids::{SessionId, UserId},
    media::NowPlayingItem,
    ticks::Ticks,
};

/// Periodic position report for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaybackProgressEvent {
    pub session_id: SessionId,
    /// User controlling the session; seek commands are issued on their behalf.
    pub user_id: UserId,
    /// Absent while the client is still buffering or has not reported yet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub position_ticks: Option<Ticks>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item: NowPlayingItem,
}

/// Session lifecycle notifications delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum SessionEvent {
    PlaybackProgress(PlaybackProgressEvent),
    PlaybackStopped { session_id: SessionId },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionEvent::PlaybackProgress(progress) => &progress.session_id,
            SessionEvent::PlaybackStopped { session_id } => session_id,
        }
    }
}

impl From<PlaybackProgressEvent> for SessionEvent {
    fn from(event: PlaybackProgressEvent) -> Self {
        SessionEvent::PlaybackProgress(event)
    }
}

/// Signal that the skip settings changed; subscribers re-read the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfigChanged {
    /// Monotonic counter bumped on every update.
    pub revision: u64,
}
