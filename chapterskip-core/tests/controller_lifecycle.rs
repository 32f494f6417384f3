//! End-to-end coverage of the controller: events in through the in-process
//! bus, commands out through a recording sink.

mod support;

use std::time::Duration;

use chapterskip_core::SkipError;
use chapterskip_model::{SessionId, SkipSettings, Ticks};
use support::{Harness, RecordingSink, Sent, intro_and_credits, user};

#[tokio::test]
async fn intro_progress_sends_seek_and_notification() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    harness.progress("tv", 5_000);
    harness.sink.wait_for(2).await;
    harness.controller.stop().await;

    let sent = harness.sink.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.contains(&Sent::Seek {
        session: SessionId::from("tv"),
        user: user(),
        target: Ticks(30_000),
    }));
    assert!(sent.contains(&Sent::Notification {
        session: SessionId::from("tv"),
        header: "Chapter Skip".to_string(),
        text: "Skipped Intro".to_string(),
        timeout: Duration::from_secs(3),
    }));
}

#[tokio::test]
async fn repeated_progress_inside_skipped_region_sends_once() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    for position in [5_000, 6_000, 20_000, 29_999, 5_000] {
        harness.progress("tv", position);
    }
    harness.controller.stop().await;

    assert_eq!(
        harness.sink.seek_targets().await,
        vec![(SessionId::from("tv"), Ticks(30_000))]
    );
}

#[tokio::test]
async fn credits_skip_to_end_then_nothing_more() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    harness.progress("tv", 605_000);
    harness.progress("tv", 610_000);
    harness.controller.stop().await;

    assert_eq!(
        harness.sink.seek_targets().await,
        vec![(SessionId::from("tv"), Ticks(650_000))]
    );
}

#[tokio::test]
async fn stopped_session_starts_fresh() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    harness.progress("tv", 5_000);
    harness.stopped("tv");
    harness.progress("tv", 5_000);
    harness.controller.stop().await;

    assert_eq!(
        harness.sink.seek_targets().await,
        vec![
            (SessionId::from("tv"), Ticks(30_000)),
            (SessionId::from("tv"), Ticks(30_000)),
        ]
    );
}

#[tokio::test]
async fn interleaved_sessions_are_independent() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    harness.progress("a", 5_000);
    harness.progress("b", 7_000);
    harness.progress("a", 8_000);
    harness.stopped("b");
    harness.progress("a", 9_000);
    harness.controller.stop().await;

    let mut targets = harness.sink.seek_targets().await;
    targets.sort();
    assert_eq!(
        targets,
        vec![
            (SessionId::from("a"), Ticks(30_000)),
            (SessionId::from("b"), Ticks(30_000)),
        ]
    );
}

#[tokio::test]
async fn configuration_change_swaps_pattern() {
    let harness = Harness::new(SkipSettings::default());
    harness.controller.start().await.expect("start");
    assert!(!harness.controller.skipper().pattern().is_enabled());

    harness.progress("tv", 5_000);
    harness.config.update(SkipSettings::with_pattern("Intro"));
    harness.progress("tv", 6_000);
    harness.controller.stop().await;

    assert_eq!(
        harness.sink.seek_targets().await,
        vec![(SessionId::from("tv"), Ticks(30_000))]
    );
}

#[tokio::test]
async fn invalid_pattern_disables_matching_until_fixed() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    harness.config.update(SkipSettings::with_pattern("Intro("));
    harness.progress("tv", 5_000);
    harness.config.update(SkipSettings::with_pattern("Credits"));
    harness.progress("tv", 605_000);
    harness.controller.stop().await;

    assert_eq!(
        harness.sink.seek_targets().await,
        vec![(SessionId::from("tv"), Ticks(650_000))]
    );
}

#[tokio::test]
async fn invalid_pattern_at_start_still_starts_disabled() {
    let harness = Harness::new(SkipSettings::with_pattern("[unclosed"));
    harness.controller.start().await.expect("start");
    assert!(harness.controller.is_running().await);
    assert!(!harness.controller.skipper().pattern().is_enabled());

    harness.progress("tv", 5_000);
    harness.controller.stop().await;
    assert!(harness.sink.sent().await.is_empty());
}

#[tokio::test]
async fn disabled_notifications_still_seek() {
    let mut settings = intro_and_credits();
    settings.notification.enabled = false;
    let harness = Harness::new(settings);
    harness.controller.start().await.expect("start");

    harness.progress("tv", 5_000);
    harness.controller.stop().await;

    let sent = harness.sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(matches!(sent[0], Sent::Seek { target: Ticks(30_000), .. }));
}

#[tokio::test]
async fn sink_failures_do_not_retrigger() {
    let harness = Harness::with_sink(intro_and_credits(), RecordingSink::failing());
    harness.controller.start().await.expect("start");

    harness.progress("tv", 5_000);
    harness.progress("tv", 10_000);
    harness.controller.stop().await;

    assert_eq!(harness.sink.seek_targets().await.len(), 1);
}

#[tokio::test]
async fn stop_clears_state_and_ignores_later_events() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");
    harness.progress("tv", 5_000);
    harness.controller.stop().await;

    assert!(!harness.controller.is_running().await);
    assert!(harness.controller.skipper().state().is_empty());
    assert!(!harness.controller.skipper().pattern().is_enabled());
    assert_eq!(harness.sessions.subscriber_count(), 0);

    harness.progress("tv", 5_000);
    assert_eq!(harness.sink.seek_targets().await.len(), 1);
}

#[tokio::test]
async fn restart_after_stop_resubscribes() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");
    harness.progress("tv", 5_000);
    harness.controller.stop().await;

    harness.controller.start().await.expect("restart");
    harness.progress("tv", 5_000);
    harness.controller.stop().await;

    assert_eq!(harness.sink.seek_targets().await.len(), 2);
}

#[tokio::test]
async fn double_start_is_rejected() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    let err = harness.controller.start().await.unwrap_err();
    assert!(matches!(err, SkipError::AlreadyRunning));

    harness.controller.stop().await;
    harness.controller.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_sessions_each_skip_once() {
    let harness = Harness::new(intro_and_credits());
    harness.controller.start().await.expect("start");

    for round in 0..5u64 {
        for session in 0..20 {
            harness.progress(&format!("session-{session}"), 5_000 + round * 1_000);
        }
    }
    harness.controller.stop().await;

    let targets = harness.sink.seek_targets().await;
    assert_eq!(targets.len(), 20);
    assert!(targets.iter().all(|(_, target)| *target == Ticks(30_000)));
}
