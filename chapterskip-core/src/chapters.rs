//! Pure chapter arithmetic: where the position is, and where a skip lands.
//!
//! Nothing here touches session state; [`crate::skipper::ChapterSkipper`]
//! layers the per-session guard on top of [`plan_skip`].

use chapterskip_model::{Chapter, NowPlayingItem, SkipReason, Ticks};

use crate::pattern::ChapterPattern;

/// Where a skip out of the current chapter should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPlan<'a> {
    /// Name of the matched chapter containing the position.
    pub chapter_name: &'a str,
    pub target: Ticks,
    pub reason: SkipReason,
}

/// Index of the chapter containing `position`: the last chapter that starts
/// strictly before it. `None` when the position precedes every chapter.
pub fn current_chapter_index(chapters: &[Chapter], position: Ticks) -> Option<usize> {
    chapters
        .iter()
        .rposition(|chapter| chapter.start_position_ticks < position)
}

/// Decide whether the position sits in a matched chapter and where to jump.
///
/// The jump skips the whole run of matched (or unnamed) chapters following
/// the current one. When that run reaches the end of the list the jump goes
/// to the item's runtime, provided the runtime is known and not yet reached.
pub fn plan_skip<'a>(
    pattern: &ChapterPattern,
    item: &'a NowPlayingItem,
    position: Ticks,
) -> Option<SkipPlan<'a>> {
    let chapters = item.chapters.as_slice();
    let index = current_chapter_index(chapters, position)?;
    let chapter_name = chapters[index]
        .name()
        .filter(|name| pattern.is_match(name))?;

    let following = &chapters[index + 1..];
    if let Some(next) = following
        .iter()
        .find(|chapter| chapter.name().is_some_and(|name| !pattern.is_match(name)))
    {
        return Some(SkipPlan {
            chapter_name,
            target: next.start_position_ticks,
            reason: SkipReason::NextChapter,
        });
    }

    let runtime = item.runtime_ticks.filter(|runtime| position < *runtime)?;
    Some(SkipPlan {
        chapter_name,
        target: runtime,
        reason: SkipReason::EndOfContent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> ChapterPattern {
        ChapterPattern::compile(raw, false).unwrap()
    }

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

    #[test]
    fn locates_chapter_by_strict_start() {
        let item = episode();
        assert_eq!(current_chapter_index(&item.chapters, Ticks(0)), None);
        assert_eq!(current_chapter_index(&item.chapters, Ticks(1)), Some(0));
        assert_eq!(current_chapter_index(&item.chapters, Ticks(30_000)), Some(0));
        assert_eq!(current_chapter_index(&item.chapters, Ticks(30_001)), Some(1));
        assert_eq!(current_chapter_index(&item.chapters, Ticks(900_000)), Some(2));
    }

    #[test]
    fn intro_jumps_to_next_unmatched_chapter() {
        let item = episode();
        let plan = plan_skip(&pattern("Intro|Credits"), &item, Ticks(5_000)).unwrap();
        assert_eq!(plan.chapter_name, "Intro");
        assert_eq!(plan.target, Ticks(30_000));
        assert_eq!(plan.reason, SkipReason::NextChapter);
    }

    #[test]
    fn trailing_credits_jump_to_runtime() {
        let item = episode();
        let plan = plan_skip(&pattern("Intro|Credits"), &item, Ticks(605_000)).unwrap();
        assert_eq!(plan.chapter_name, "Credits");
        assert_eq!(plan.target, Ticks(650_000));
        assert_eq!(plan.reason, SkipReason::EndOfContent);
    }

    #[test]
    fn unmatched_chapter_is_left_alone() {
        let item = episode();
        assert_eq!(plan_skip(&pattern("Intro|Credits"), &item, Ticks(40_000)), None);
    }

    #[test]
    fn consecutive_matches_and_unnamed_markers_are_skipped_as_one_run() {
        let item = NowPlayingItem::with_chapters(
            vec![
                Chapter::new("Recap", Ticks(0)),
                Chapter::unnamed(Ticks(10_000)),
                Chapter::new("Intro", Ticks(20_000)),
                Chapter::new("Act One", Ticks(50_000)),
            ],
            None,
        );
        let plan = plan_skip(&pattern("Recap|Intro"), &item, Ticks(1)).unwrap();
        assert_eq!(plan.target, Ticks(50_000));
        assert_eq!(plan.chapter_name, "Recap");
    }

    #[test]
    fn unnamed_current_chapter_never_matches() {
        let item = NowPlayingItem::with_chapters(
            vec![Chapter::unnamed(Ticks(0)), Chapter::new("Show", Ticks(100))],
            Some(Ticks(1_000)),
        );
        assert_eq!(plan_skip(&pattern(".*"), &item, Ticks(50)), None);
    }

    #[test]
    fn end_of_content_needs_known_unreached_runtime() {
        let mut item = episode();
        item.runtime_ticks = None;
        assert_eq!(plan_skip(&pattern("Credits"), &item, Ticks(605_000)), None);

        item.runtime_ticks = Some(Ticks(605_000));
        assert_eq!(plan_skip(&pattern("Credits"), &item, Ticks(605_000)), None);
    }

    #[test]
    fn empty_chapter_list_has_no_plan() {
        let item = NowPlayingItem::default();
        assert_eq!(plan_skip(&pattern("Intro"), &item, Ticks(5)), None);
    }
}
