use std::fmt;

use chapterskip_model::{
    ConfigChanged, PlaybackProgressEvent, SessionEvent, SessionId, SkipSettings,
};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::ports::{ConfigurationSource, SessionEventSource};

/// In-process fan-out of session events, for hosts that already run inside
/// the same process (and for tests and replays).
///
/// A subscriber that falls more than `capacity` events behind loses the
/// oldest ones. A lost `PlaybackStopped` leaves that session's skip target
/// in place until the controller stops, so size the capacity for the burst
/// of events all live sessions can produce between two router wakeups.
pub struct InProcSessionEventBus {
    sender: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl fmt::Debug for InProcSessionEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcSessionEventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl InProcSessionEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Returns the number of subscribers that will see the event.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn publish_progress(&self, event: PlaybackProgressEvent) -> usize {
        self.publish(SessionEvent::PlaybackProgress(event))
    }

    pub fn publish_stopped(&self, session_id: SessionId) -> usize {
        self.publish(SessionEvent::PlaybackStopped { session_id })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events not yet received by every subscriber.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

impl Default for InProcSessionEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl SessionEventSource for InProcSessionEventBus {
    fn subscribe_sessions(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

/// Settings held in memory; [`InMemoryConfigSource::update`] notifies
/// subscribers after the new value is visible to [`ConfigurationSource::current`].
pub struct InMemoryConfigSource {
    state: RwLock<(SkipSettings, u64)>,
    changes: broadcast::Sender<ConfigChanged>,
}

impl fmt::Debug for InMemoryConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryConfigSource")
            .field("settings", &state.0)
            .field("revision", &state.1)
            .field("subscribers", &self.changes.receiver_count())
            .finish()
    }
}

impl InMemoryConfigSource {
    pub fn new(settings: SkipSettings) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: RwLock::new((settings, 0)),
            changes,
        }
    }

    pub fn update(&self, settings: SkipSettings) -> ConfigChanged {
        let revision = {
            let mut state = self.state.write();
            state.0 = settings;
            state.1 += 1;
            state.1
        };
        let change = ConfigChanged { revision };
        let _ = self.changes.send(change);
        change
    }

    pub fn revision(&self) -> u64 {
        self.state.read().1
    }
}

impl Default for InMemoryConfigSource {
    fn default() -> Self {
        Self::new(SkipSettings::default())
    }
}

impl ConfigurationSource for InMemoryConfigSource {
    fn current(&self) -> SkipSettings {
        self.state.read().0.clone()
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ConfigChanged> {
        self.changes.subscribe()
    }
}
