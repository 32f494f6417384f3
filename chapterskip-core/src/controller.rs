use std::{
    any::type_name_of_val,
    fmt,
    sync::Arc,
    time::Duration,
};

use chapterskip_model::{
    ConfigChanged, NotificationSettings, SessionEvent, SkipCommand, SkipSettings,
};
use parking_lot::RwLock;
use tokio::{
    sync::{Mutex, broadcast, broadcast::error::RecvError},
    task::JoinHandle,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info, warn};

use crate::{
    error::{Result, SkipError},
    ports::{CommandSink, ConfigurationSource, SessionEventSource},
    skipper::ChapterSkipper,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Wires a [`ChapterSkipper`] to its collaborators.
///
/// `start` subscribes to session events and configuration changes and primes
/// the pattern; `stop` unsubscribes, waits for in-flight commands and leaves
/// no pattern or session state behind. The controller can be started again
/// after a stop.
pub struct ChapterSkipController {
    skipper: Arc<ChapterSkipper>,
    sessions: Arc<dyn SessionEventSource>,
    config: Arc<dyn ConfigurationSource>,
    dispatcher: CommandDispatcher,
    running: Mutex<Option<Running>>,
}

struct Running {
    shutdown: CancellationToken,
    router: JoinHandle<()>,
    dispatches: TaskTracker,
}

impl fmt::Debug for ChapterSkipController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let running = self
            .running
            .try_lock()
            .map(|guard| guard.is_some())
            .ok();

        f.debug_struct("ChapterSkipController")
            .field("skipper", &self.skipper)
            .field("sessions_type", &type_name_of_val(self.sessions.as_ref()))
            .field("config_type", &type_name_of_val(self.config.as_ref()))
            .field("dispatcher", &self.dispatcher)
            .field("running", &running)
            .finish()
    }
}

impl ChapterSkipController {
    pub fn new(
        sessions: Arc<dyn SessionEventSource>,
        config: Arc<dyn ConfigurationSource>,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        Self {
            skipper: Arc::new(ChapterSkipper::new()),
            sessions,
            config,
            dispatcher: CommandDispatcher {
                sink,
                notification: Arc::new(RwLock::new(NotificationSettings::default())),
            },
            running: Mutex::new(None),
        }
    }

    pub fn skipper(&self) -> &Arc<ChapterSkipper> {
        &self.skipper
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Subscribe to all sources and prime the pattern from current settings.
    ///
    /// An invalid configured pattern does not fail the start: it is logged and
    /// matching stays disabled until a corrected configuration arrives.
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(SkipError::AlreadyRunning);
        }

        // Subscribe before reading settings so a change racing the start is
        // delivered rather than lost.
        let session_rx = self.sessions.subscribe_sessions();
        let config_rx = self.config.subscribe_changes();
        reload_settings(&self.skipper, &self.dispatcher, self.config.as_ref());

        let shutdown = CancellationToken::new();
        let dispatches = TaskTracker::new();
        let router = tokio::spawn(
            EventRouter {
                skipper: Arc::clone(&self.skipper),
                config: Arc::clone(&self.config),
                dispatcher: self.dispatcher.clone(),
                dispatches: dispatches.clone(),
            }
            .run(session_rx, config_rx, shutdown.clone()),
        );

        *running = Some(Running {
            shutdown,
            router,
            dispatches,
        });

        info!(
            target: "chapterskip::router",
            enabled = self.skipper.pattern().is_enabled(),
            "chapter skip controller started"
        );
        Ok(())
    }

    /// Unsubscribe, let queued events and in-flight commands finish, then
    /// clear the pattern and all session state. No-op when not running.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };
        info!(target: "chapterskip::router", "stopping chapter skip controller");

        running.shutdown.cancel();
        match tokio::time::timeout(SHUTDOWN_GRACE, running.router).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(target: "chapterskip::router", "event router failed: {err:?}"),
            Err(_) => warn!(target: "chapterskip::router", "event router timed out during shutdown"),
        }

        running.dispatches.close();
        if tokio::time::timeout(SHUTDOWN_GRACE, running.dispatches.wait())
            .await
            .is_err()
        {
            warn!(
                target: "chapterskip::dispatch",
                pending = running.dispatches.len(),
                "command dispatch timed out during shutdown"
            );
        }

        self.skipper.reset();
        info!(target: "chapterskip::router", "chapter skip controller stopped");
    }
}

/// Pull the current settings into the skipper and the dispatcher. A pattern
/// that fails to compile is logged and leaves matching disabled.
fn reload_settings(
    skipper: &ChapterSkipper,
    dispatcher: &CommandDispatcher,
    config: &dyn ConfigurationSource,
) {
    let settings = config.current();
    *dispatcher.notification.write() = settings.notification.clone();
    apply_pattern(skipper, &settings);
}

fn apply_pattern(skipper: &ChapterSkipper, settings: &SkipSettings) {
    match skipper.apply_settings(settings) {
        Ok(()) => {
            info!(
                target: "chapterskip::config",
                pattern = settings.pattern().unwrap_or(""),
                case_insensitive = settings.case_insensitive,
                enabled = skipper.pattern().is_enabled(),
                "chapter match pattern applied"
            );
        }
        Err(err) => {
            error!(
                target: "chapterskip::config",
                error = %err,
                "chapter skipping disabled until the pattern is corrected"
            );
        }
    }
}

struct EventRouter {
    skipper: Arc<ChapterSkipper>,
    config: Arc<dyn ConfigurationSource>,
    dispatcher: CommandDispatcher,
    dispatches: TaskTracker,
}

impl EventRouter {
    /// Configuration changes are polled ahead of session events so progress
    /// published after a change is always judged by the new pattern.
    async fn run(
        self,
        mut sessions: broadcast::Receiver<SessionEvent>,
        mut changes: broadcast::Receiver<ConfigChanged>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.drain(&mut sessions, &mut changes);
                    debug!(target: "chapterskip::router", "event router shutting down");
                    break;
                }
                change = changes.recv() => match change {
                    Ok(change) => self.on_config_changed(change),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "chapterskip::router", "config listener lagged, skipped {skipped} notifications");
                        self.on_config_changed(ConfigChanged { revision: 0 });
                    }
                    Err(RecvError::Closed) => {
                        debug!(target: "chapterskip::router", "config source closed");
                        self.forward_sessions(&mut sessions, &shutdown).await;
                        break;
                    }
                },
                event = sessions.recv() => match event {
                    Ok(event) => self.on_session_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "chapterskip::router", "session listener lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => {
                        debug!(target: "chapterskip::router", "session source closed");
                        break;
                    }
                },
            }
        }
    }

    /// Session-only loop once the configuration source has gone away.
    async fn forward_sessions(
        &self,
        sessions: &mut broadcast::Receiver<SessionEvent>,
        shutdown: &CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    for _ in 0..sessions.len() {
                        match sessions.try_recv() {
                            Ok(event) => self.on_session_event(event),
                            Err(_) => break,
                        }
                    }
                    break;
                }
                event = sessions.recv() => match event {
                    Ok(event) => self.on_session_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "chapterskip::router", "session listener lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }

    /// Handle what was already queued when the stop was requested.
    fn drain(
        &self,
        sessions: &mut broadcast::Receiver<SessionEvent>,
        changes: &mut broadcast::Receiver<ConfigChanged>,
    ) {
        if !changes.is_empty() {
            while changes.try_recv().is_ok() {}
            self.on_config_changed(ConfigChanged { revision: 0 });
        }
        for _ in 0..sessions.len() {
            match sessions.try_recv() {
                Ok(event) => self.on_session_event(event),
                Err(_) => break,
            }
        }
    }

    fn on_config_changed(&self, change: ConfigChanged) {
        debug!(target: "chapterskip::config", revision = change.revision, "configuration changed");
        reload_settings(&self.skipper, &self.dispatcher, self.config.as_ref());
    }

    fn on_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::PlaybackProgress(progress) => {
                if let Some(command) = self.skipper.evaluate(&progress) {
                    let dispatcher = self.dispatcher.clone();
                    self.dispatches
                        .spawn(async move { dispatcher.dispatch(command).await });
                }
            }
            SessionEvent::PlaybackStopped { session_id } => {
                self.skipper.on_stopped(&session_id);
            }
        }
    }
}

/// Sends the seek and the notification for a decided skip.
#[derive(Clone)]
struct CommandDispatcher {
    sink: Arc<dyn CommandSink>,
    notification: Arc<RwLock<NotificationSettings>>,
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("sink_type", &type_name_of_val(self.sink.as_ref()))
            .field("notification", &*self.notification.read())
            .finish()
    }
}

impl CommandDispatcher {
    /// Both commands are attempted; failures are logged and never retried.
    async fn dispatch(&self, command: SkipCommand) {
        let notification = self.notification.read().clone();
        let session = &command.session_id;

        let seek = self
            .sink
            .send_seek(session, command.user_id, command.target_ticks);

        let (seek_result, notify_result) = if notification.enabled {
            let text = notification.text_for(&command.chapter_name);
            let notify = self.sink.send_notification(
                session,
                &notification.header,
                &text,
                notification.timeout(),
            );
            let (seek_result, notify_result) = tokio::join!(seek, notify);
            (seek_result, Some(notify_result))
        } else {
            (seek.await, None)
        };

        if let Err(err) = seek_result {
            warn!(
                target: "chapterskip::dispatch",
                %session,
                target_ticks = %command.target_ticks,
                error = %err,
                "seek command failed"
            );
        }
        if let Some(Err(err)) = notify_result {
            warn!(
                target: "chapterskip::dispatch",
                %session,
                error = %err,
                "skip notification failed"
            );
        }
    }
}
