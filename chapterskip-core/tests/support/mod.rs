#![allow(dead_code)]

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use chapterskip_core::{
    ChapterSkipController, CommandError, CommandSink, InMemoryConfigSource,
    InProcSessionEventBus,
};
use chapterskip_model::{
    Chapter, NowPlayingItem, PlaybackProgressEvent, SessionId, SkipSettings, Ticks, UserId,
};
use tokio::{sync::Mutex as TokioMutex, time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Seek {
        session: SessionId,
        user: UserId,
        target: Ticks,
    },
    Notification {
        session: SessionId,
        header: String,
        text: String,
        timeout: Duration,
    },
}

/// Records every command; optionally fails them all.
#[derive(Default)]
pub struct RecordingSink {
    sent: TokioMutex<Vec<Sent>>,
    fail: bool,
}

impl fmt::Debug for RecordingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSink")
            .field("fail", &self.fail)
            .finish()
    }
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            sent: TokioMutex::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn seek_targets(&self) -> Vec<(SessionId, Ticks)> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|sent| match sent {
                Sent::Seek {
                    session, target, ..
                } => Some((session.clone(), *target)),
                Sent::Notification { .. } => None,
            })
            .collect()
    }

    pub async fn wait_for(&self, expected: usize) {
        let waited = time::timeout(Duration::from_secs(5), async {
            loop {
                if self.sent.lock().await.len() >= expected {
                    break;
                }
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for {expected} commands");
    }

    async fn record(&self, sent: Sent) -> Result<(), CommandError> {
        let session = match &sent {
            Sent::Seek { session, .. } | Sent::Notification { session, .. } => session.clone(),
        };
        self.sent.lock().await.push(sent);
        if self.fail {
            return Err(CommandError::SessionNotFound(session));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandSink for RecordingSink {
    async fn send_seek(
        &self,
        session_id: &SessionId,
        controlling_user: UserId,
        target: Ticks,
    ) -> Result<(), CommandError> {
        self.record(Sent::Seek {
            session: session_id.clone(),
            user: controlling_user,
            target,
        })
        .await
    }

    async fn send_notification(
        &self,
        session_id: &SessionId,
        header: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), CommandError> {
        self.record(Sent::Notification {
            session: session_id.clone(),
            header: header.to_string(),
            text: text.to_string(),
            timeout,
        })
        .await
    }
}

pub struct Harness {
    pub sessions: Arc<InProcSessionEventBus>,
    pub config: Arc<InMemoryConfigSource>,
    pub sink: Arc<RecordingSink>,
    pub controller: ChapterSkipController,
}

impl Harness {
    pub fn new(settings: SkipSettings) -> Self {
        Self::with_sink(settings, RecordingSink::default())
    }

    pub fn with_sink(settings: SkipSettings, sink: RecordingSink) -> Self {
        let sessions = Arc::new(InProcSessionEventBus::new(256));
        let config = Arc::new(InMemoryConfigSource::new(settings));
        let sink = Arc::new(sink);
        let controller =
            ChapterSkipController::new(sessions.clone(), config.clone(), sink.clone());
        Self {
            sessions,
            config,
            sink,
            controller,
        }
    }

    pub fn progress(&self, session: &str, position: u64) {
        self.sessions
            .publish_progress(progress(session, Some(position)));
    }

    pub fn stopped(&self, session: &str) {
        self.sessions.publish_stopped(SessionId::from(session));
    }
}

pub fn episode() -> NowPlayingItem {
    NowPlayingItem::with_chapters(
        vec![
            Chapter::new("Intro", Ticks(0)),
            Chapter::new("Show", Ticks(30_000)),
            Chapter::new("Credits", Ticks(600_000)),
        ],
        Some(Ticks(650_000)),
    )
}

pub fn user() -> UserId {
    UserId(uuid::Uuid::from_u128(0x0191_d2a4_6a4c_7c2a_9c55_0000_0000_0001))
}

pub fn progress(session: &str, position: Option<u64>) -> PlaybackProgressEvent {
    PlaybackProgressEvent {
        session_id: SessionId::from(session),
        user_id: user(),
        position_ticks: position.map(Ticks),
        item: episode(),
    }
}

pub fn intro_and_credits() -> SkipSettings {
    SkipSettings::with_pattern("Intro|Credits")
}
