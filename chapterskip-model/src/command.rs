#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ids::{SessionId, UserId},
    ticks::Ticks,
};

/// Why a skip lands where it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkipReason {
    /// Jump to the start of the next chapter that does not match.
    NextChapter,
    /// The matched run reaches the last chapter; jump to the item's runtime.
    EndOfContent,
}

/// A decided skip, ready to be dispatched to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkipCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Position reported by the progress event that triggered the skip.
    pub position_ticks: Ticks,
    pub target_ticks: Ticks,
    /// Name of the matched chapter the position fell in.
    pub chapter_name: String,
    pub reason: SkipReason,
}
