use chapterskip_model::{PlaybackProgressEvent, SessionId, SkipCommand, SkipSettings};
use tracing::{info, trace};

use crate::{
    chapters::plan_skip,
    error::Result,
    pattern::PatternSlot,
    state::{Advance, SkipState},
};

/// Synchronous decision engine: active pattern plus per-session skip state.
///
/// Every method is non-blocking and safe to call from any number of threads.
/// Dispatching the resulting [`SkipCommand`] is left to the caller.
#[derive(Debug, Default)]
pub struct ChapterSkipper {
    pattern: PatternSlot,
    state: SkipState,
}

impl ChapterSkipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-sensitive shorthand for [`PatternSlot::set_pattern`].
    pub fn set_pattern(&self, raw: Option<&str>) -> Result<()> {
        self.pattern.set_pattern(raw, false)
    }

    pub fn apply_settings(&self, settings: &SkipSettings) -> Result<()> {
        self.pattern.apply(settings)
    }

    pub fn pattern(&self) -> &PatternSlot {
        &self.pattern
    }

    pub fn state(&self) -> &SkipState {
        &self.state
    }

    /// Run the chapter match for one progress report.
    ///
    /// Returns the command to send when the session just entered (or is still
    /// inside, but past its last recorded target) a matched chapter. The new
    /// target is recorded before this returns, so a concurrent report for the
    /// same session cannot produce a second command for the same boundary.
    pub fn evaluate(&self, event: &PlaybackProgressEvent) -> Option<SkipCommand> {
        let session = &event.session_id;

        let Some(pattern) = self.pattern.snapshot() else {
            trace!(target: "chapterskip::skip", %session, "matching disabled");
            return None;
        };
        if !event.item.has_chapters() {
            trace!(target: "chapterskip::skip", %session, "item has no chapters");
            return None;
        }
        let Some(position) = event.position_ticks else {
            trace!(target: "chapterskip::skip", %session, "progress without position");
            return None;
        };

        let plan = plan_skip(&pattern, &event.item, position)?;

        match self.state.try_advance(session, position, plan.target) {
            Advance::Suppressed { last_target } => {
                trace!(
                    target: "chapterskip::skip",
                    %session,
                    position = %position,
                    last_target = %last_target,
                    "already skipped past this chapter"
                );
                None
            }
            advance => {
                info!(
                    target: "chapterskip::skip",
                    %session,
                    chapter = plan.chapter_name,
                    reason = ?plan.reason,
                    from = %position.clock(),
                    to = %plan.target.clock(),
                    first = matches!(advance, Advance::First),
                    "skipping chapter"
                );
                Some(SkipCommand {
                    session_id: session.clone(),
                    user_id: event.user_id,
                    position_ticks: position,
                    target_ticks: plan.target,
                    chapter_name: plan.chapter_name.to_string(),
                    reason: plan.reason,
                })
            }
        }
    }

    /// Forget the session's skip history. Returns whether an entry existed.
    pub fn on_stopped(&self, session_id: &SessionId) -> bool {
        let removed = self.state.remove(session_id);
        trace!(
            target: "chapterskip::skip",
            session = %session_id,
            had_entry = removed.is_some(),
            "session stopped"
        );
        removed.is_some()
    }

    /// Drop the pattern and every session entry.
    pub fn reset(&self) {
        self.pattern.clear();
        self.state.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterskip_model::{Chapter, NowPlayingItem, SkipReason, Ticks, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn episode() -> NowPlayingItem {
        NowPlayingItem::with_chapters(
            vec![
                Chapter::new("Intro", Ticks(0)),
                Chapter::new("Show", Ticks(30_000)),
                Chapter::new("Credits", Ticks(600_000)),
            ],
            Some(Ticks(650_000)),
        )
    }

    fn progress(session: &str, position: Option<u64>) -> PlaybackProgressEvent {
        PlaybackProgressEvent {
            session_id: SessionId::from(session),
            user_id: UserId(uuid_for(session)),
            position_ticks: position.map(Ticks),
            item: episode(),
        }
    }

    fn uuid_for(session: &str) -> uuid::Uuid {
        uuid::Uuid::from_u128(session.bytes().map(u128::from).sum())
    }

    fn skipper() -> ChapterSkipper {
        let skipper = ChapterSkipper::new();
        skipper.set_pattern(Some("Intro|Credits")).unwrap();
        skipper
    }

    #[test]
    fn intro_skips_to_show() {
        let skipper = skipper();
        let command = skipper.evaluate(&progress("s1", Some(5_000))).unwrap();

        assert_eq!(command.target_ticks, Ticks(30_000));
        assert_eq!(command.position_ticks, Ticks(5_000));
        assert_eq!(command.chapter_name, "Intro");
        assert_eq!(command.reason, SkipReason::NextChapter);
        assert_eq!(command.user_id, UserId(uuid_for("s1")));
        assert_eq!(
            skipper.state().last_target(&SessionId::from("s1")),
            Some(Ticks(30_000))
        );
    }

    #[test]
    fn credits_skip_to_end_of_content() {
        let skipper = skipper();
        let command = skipper.evaluate(&progress("s1", Some(605_000))).unwrap();

        assert_eq!(command.target_ticks, Ticks(650_000));
        assert_eq!(command.reason, SkipReason::EndOfContent);
    }

    #[test]
    fn stale_progress_after_skip_is_ignored() {
        let skipper = skipper();
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_some());
        assert!(skipper.evaluate(&progress("s1", Some(20_000))).is_none());
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_none());
        assert!(skipper.evaluate(&progress("s1", Some(30_000))).is_none());
    }

    #[test]
    fn missing_position_changes_nothing() {
        let skipper = skipper();
        assert!(skipper.evaluate(&progress("s1", None)).is_none());
        assert!(skipper.state().is_empty());
    }

    #[test]
    fn stop_gives_the_session_a_fresh_start() {
        let skipper = skipper();
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_some());

        assert!(skipper.on_stopped(&SessionId::from("s1")));
        assert!(skipper.state().is_empty());

        let command = skipper.evaluate(&progress("s1", Some(5_000))).unwrap();
        assert_eq!(command.target_ticks, Ticks(30_000));
        assert!(!skipper.on_stopped(&SessionId::from("unknown")));
    }

    #[test]
    fn disabled_pattern_never_skips() {
        let skipper = ChapterSkipper::new();
        for position in [1, 5_000, 29_999, 605_000, 649_999] {
            assert!(skipper.evaluate(&progress("s1", Some(position))).is_none());
        }

        skipper.set_pattern(Some("Intro")).unwrap();
        skipper.set_pattern(Some("")).unwrap();
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_none());
        assert!(skipper.state().is_empty());
    }

    #[test]
    fn no_chapters_no_skip() {
        let skipper = skipper();
        let mut event = progress("s1", Some(5_000));
        event.item.chapters.clear();
        assert!(skipper.evaluate(&event).is_none());
    }

    #[test]
    fn sessions_do_not_share_skip_history() {
        let skipper = skipper();
        assert!(skipper.evaluate(&progress("a", Some(5_000))).is_some());
        assert!(skipper.evaluate(&progress("a", Some(10_000))).is_none());

        let for_b = skipper.evaluate(&progress("b", Some(10_000))).unwrap();
        assert_eq!(for_b.session_id, SessionId::from("b"));
        assert_eq!(for_b.target_ticks, Ticks(30_000));

        skipper.on_stopped(&SessionId::from("b"));
        assert_eq!(
            skipper.state().last_target(&SessionId::from("a")),
            Some(Ticks(30_000))
        );
    }

    #[test]
    fn targets_only_increase_over_a_playback() {
        let skipper = skipper();
        let positions = [
            1, 5_000, 20_000, 29_000, 31_000, 200_000, 600_001, 605_000, 30_000, 640_000,
        ];
        let targets: Vec<_> = positions
            .iter()
            .filter_map(|&position| skipper.evaluate(&progress("s1", Some(position))))
            .map(|command| command.target_ticks)
            .collect();

        assert_eq!(targets, vec![Ticks(30_000), Ticks(650_000)]);
        assert!(targets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn invalid_pattern_disables_until_corrected() {
        let skipper = skipper();
        assert!(skipper.set_pattern(Some("Intro[")).is_err());
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_none());

        skipper.set_pattern(Some("Intro")).unwrap();
        assert!(skipper.evaluate(&progress("s1", Some(5_000))).is_some());
    }

    #[test]
    fn concurrent_reports_fire_once_per_boundary() {
        let skipper = skipper();
        let fired = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for position in [5_000, 6_000, 7_000, 20_000] {
                        if skipper.evaluate(&progress("shared", Some(position))).is_some() {
                            fired.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_sessions_each_fire_once() {
        let skipper = skipper();
        let fired = AtomicUsize::new(0);
        let sessions: Vec<String> = (0..16).map(|n| format!("session-{n}")).collect();

        std::thread::scope(|scope| {
            for session in &sessions {
                let (skipper, fired) = (&skipper, &fired);
                scope.spawn(move || {
                    for _ in 0..4 {
                        if skipper.evaluate(&progress(session, Some(5_000))).is_some() {
                            fired.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(fired.load(Ordering::SeqCst), sessions.len());
        assert_eq!(skipper.state().len(), sessions.len());
    }
}
