use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by each renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Surface,
    Border,
    GridLine,

    HeaderBackground,
    HeaderText,
    LabelColumnBackground,

    TextPrimary,
    TextMuted,

    WeekendColumn,
    TodayColumn,
    WorkWindow,
    NowLine,

    StatusPending,
    StatusInProgress,
    StatusCompleted,
    StatusOverdue,
    StatusOnHold,
    StatusCancelled,
    StatusNoShow,

    /// Border for bars that fall outside the owner's work window.
    OutsideWindowBorder,
}
