//! Draw status values and poll cadence selection.

use std::time::Duration;

/// Free-text values the status field carries in the base.
pub const STATUS_NOT_STARTED: &str = "待开始";
pub const STATUS_PREPARING: &str = "准备中";
pub const STATUS_READY: &str = "已就绪";
pub const STATUS_COMPLETED: &str = "已完成";

/// Active phases poll fast to catch operator actions quickly.
pub const FAST_POLL: Duration = Duration::from_millis(500);
/// Completed and unrecognized statuses poll slowly to reduce load.
pub const SLOW_POLL: Duration = Duration::from_millis(2000);

/// Lifecycle of a draw as driven by the status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    NotStarted,
    Preparing,
    Ready,
    Completed,
}

impl DrawStatus {
    /// Map a status cell's text to a known status. Any other text is
    /// unrecognized and causes no transition.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            STATUS_NOT_STARTED => Some(Self::NotStarted),
            STATUS_PREPARING => Some(Self::Preparing),
            STATUS_READY => Some(Self::Ready),
            STATUS_COMPLETED => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::Preparing => STATUS_PREPARING,
            Self::Ready => STATUS_READY,
            Self::Completed => STATUS_COMPLETED,
        }
    }
}

/// Poll interval for the currently reconciled status text.
///
/// Keyed off the reconciled status, not wall-clock elapsed time: the loop
/// must swap intervals whenever this value changes, not only on startup.
pub fn poll_interval(status_text: &str) -> Duration {
    match DrawStatus::parse(status_text) {
        Some(DrawStatus::NotStarted | DrawStatus::Preparing | DrawStatus::Ready) => FAST_POLL,
        Some(DrawStatus::Completed) | None => SLOW_POLL,
    }
}
