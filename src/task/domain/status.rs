//! Task status and the allowed-edges table of the status state machine.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    Open,
    /// Task is being worked on.
    InProgress,
    /// Work is stalled on something outside the task.
    Blocked,
    /// Task has been completed.
    Done,
    /// Task has been abandoned.
    Cancelled,
}

/// Every allowed `(from, to)` status edge. Any pair not listed is rejected.
pub const ALLOWED_TRANSITIONS: [(TaskStatus, TaskStatus); 7] = [
    (TaskStatus::Open, TaskStatus::InProgress),
    (TaskStatus::Open, TaskStatus::Cancelled),
    (TaskStatus::InProgress, TaskStatus::Blocked),
    (TaskStatus::InProgress, TaskStatus::Done),
    (TaskStatus::InProgress, TaskStatus::Cancelled),
    (TaskStatus::Blocked, TaskStatus::InProgress),
    (TaskStatus::Blocked, TaskStatus::Cancelled),
];

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Blocked,
        Self::Done,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when `(self, target)` is an allowed edge.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, target))
    }

    /// Returns `true` when no edge leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "open" | "todo" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
