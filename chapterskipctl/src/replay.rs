//! Feeds a recorded session log through a live controller.
//!
//! Each non-blank line of the log is one JSON object:
//!
//! ```text
//! {"type":"progress","session_id":"tv","user_id":"…","position_ticks":50000000,"item":{…}}
//! {"type":"stopped","session_id":"tv"}
//! {"type":"configure","skip":{"match":"^Credits$"}}
//! {"type":"configure","reload":true}
//! ```
//!
//! Lines starting with `#` are ignored.

use std::{
    io::BufRead,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use chapterskip_config::ReloadableConfigSource;
use chapterskip_core::{ChapterSkipController, CommandSink, InProcSessionEventBus};
use chapterskip_model::{PlaybackProgressEvent, SessionId, SkipSettings};
use serde::Deserialize;
use tracing::{debug, warn};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayStep {
    Progress(PlaybackProgressEvent),
    Stopped { session_id: SessionId },
    Configure(ConfigureStep),
}

/// Either publish inline settings or re-read the configured file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigureStep {
    pub reload: bool,
    pub skip: Option<SkipSettings>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub progress: usize,
    pub stopped: usize,
    pub configured: usize,
}

pub fn parse_step(line: &str) -> anyhow::Result<Option<ReplayStep>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some).map_err(Into::into)
}

pub async fn replay<R: BufRead>(
    events: R,
    config: Arc<ReloadableConfigSource>,
    sink: Arc<dyn CommandSink>,
) -> anyhow::Result<ReplaySummary> {
    let bus = Arc::new(InProcSessionEventBus::default());
    let controller = ChapterSkipController::new(bus.clone(), config.clone(), sink);
    controller.start().await?;

    let outcome = feed(events, &bus, &config).await;
    controller.stop().await;
    outcome
}

async fn feed<R: BufRead>(
    events: R,
    bus: &InProcSessionEventBus,
    config: &ReloadableConfigSource,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in events.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("failed to read event line {number}"))?;
        let Some(step) =
            parse_step(&line).with_context(|| format!("invalid event on line {number}"))?
        else {
            continue;
        };

        match step {
            ReplayStep::Progress(event) => {
                bus.publish_progress(event);
                summary.progress += 1;
            }
            ReplayStep::Stopped { session_id } => {
                bus.publish_stopped(session_id);
                summary.stopped += 1;
            }
            ReplayStep::Configure(step) => {
                // Earlier progress must be judged by the settings it was
                // recorded under.
                settle(bus).await?;
                apply_configure(config, step, number);
                summary.configured += 1;
            }
        }
    }

    debug!(
        target: "chapterskip::router",
        progress = summary.progress,
        stopped = summary.stopped,
        configured = summary.configured,
        "replay input exhausted"
    );
    Ok(summary)
}

fn apply_configure(config: &ReloadableConfigSource, step: ConfigureStep, line: usize) {
    if let Some(skip) = step.skip {
        config.replace(skip);
    }
    if step.reload {
        if let Err(err) = config.reload() {
            warn!(target: "chapterskip::config", line, error = %err, "configuration reload failed");
        }
    }
}

/// Wait until the router has taken every published event off the bus.
async fn settle(bus: &InProcSessionEventBus) -> anyhow::Result<()> {
    let started = Instant::now();
    while bus.pending() > 0 {
        if started.elapsed() > SETTLE_TIMEOUT {
            bail!("controller did not drain {} pending events", bus.pending());
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
