use std::{
    io::Write,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chapterskip_core::{CommandError, CommandSink};
use chapterskip_model::{SessionId, Ticks, UserId};
use parking_lot::Mutex;
use serde::Serialize;

/// One outbound command as printed by the replay host.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum SinkRecord<'a> {
    Seek {
        session_id: &'a SessionId,
        user_id: UserId,
        target_ticks: Ticks,
        target_clock: String,
    },
    Notification {
        session_id: &'a SessionId,
        header: &'a str,
        text: &'a str,
        timeout_ms: u64,
    },
}

/// Writes every command as a JSON line instead of delivering it to a client.
pub struct JsonLineSink<W> {
    out: Mutex<W>,
    seeks: AtomicUsize,
    notifications: AtomicUsize,
}

impl<W> std::fmt::Debug for JsonLineSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLineSink")
            .field("seeks", &self.seeks.load(Ordering::Relaxed))
            .field("notifications", &self.notifications.load(Ordering::Relaxed))
            .finish()
    }
}

impl JsonLineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            seeks: AtomicUsize::new(0),
            notifications: AtomicUsize::new(0),
        }
    }

    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::Relaxed)
    }

    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, record: &SinkRecord<'_>) -> Result<(), CommandError> {
        let line = serde_json::to_string(record)
            .map_err(|err| CommandError::Rejected(err.to_string()))?;
        let mut out = self.out.lock();
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|err| CommandError::Transport(err.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send + 'static> CommandSink for JsonLineSink<W> {
    async fn send_seek(
        &self,
        session_id: &SessionId,
        controlling_user: UserId,
        target: Ticks,
    ) -> Result<(), CommandError> {
        self.emit(&SinkRecord::Seek {
            session_id,
            user_id: controlling_user,
            target_ticks: target,
            target_clock: target.clock().to_string(),
        })?;
        self.seeks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn send_notification(
        &self,
        session_id: &SessionId,
        header: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), CommandError> {
        self.emit(&SinkRecord::Notification {
            session_id,
            header,
            text,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })?;
        self.notifications.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
