use chapterskip_model::{SessionId, Ticks};
use dashmap::{DashMap, mapref::entry::Entry};

/// Outcome of [`SkipState::try_advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No skip had been recorded for the session yet.
    First,
    /// The position moved past the previous target; the new target is recorded.
    Advanced { previous: Ticks },
    /// The position is at or before the last target; nothing recorded.
    Suppressed { last_target: Ticks },
}

/// Last skip target per live session.
///
/// Each session key is updated with a single entry operation, so the
/// compare and the write happen under that key's shard lock and nowhere else.
/// Unrelated sessions only contend when they hash to the same shard, and
/// the lock is never held past the map access.
///
/// Entries are removed only by a stop notification or [`SkipState::clear`].
/// If the event source drops a session's stop (a lagged broadcast receiver,
/// for instance) its entry stays until the controller is stopped.
#[derive(Debug, Default)]
pub struct SkipState {
    last_targets: DashMap<SessionId, Ticks>,
}

impl SkipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `target` for the session if `position` is strictly past the
    /// session's previous target (or no target exists yet).
    pub fn try_advance(&self, session_id: &SessionId, position: Ticks, target: Ticks) -> Advance {
        match self.last_targets.entry(session_id.clone()) {
            Entry::Occupied(mut entry) => {
                let last_target = *entry.get();
                if position <= last_target {
                    return Advance::Suppressed { last_target };
                }
                entry.insert(target);
                Advance::Advanced {
                    previous: last_target,
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(target);
                Advance::First
            }
        }
    }

    pub fn last_target(&self, session_id: &SessionId) -> Option<Ticks> {
        self.last_targets.get(session_id).map(|entry| *entry.value())
    }

    pub fn remove(&self, session_id: &SessionId) -> Option<Ticks> {
        self.last_targets
            .remove(session_id)
            .map(|(_, target)| target)
    }

    pub fn clear(&self) {
        self.last_targets.clear();
    }

    pub fn len(&self) -> usize {
        self.last_targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_targets.is_empty()
    }
}
