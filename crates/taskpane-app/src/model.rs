// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Open,
    InProgress,
    Closed,
    Cancelled,
}

impl TaskState {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Closed, Self::Cancelled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Active tasks live in the left pane; everything else is finished.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    /// Case-sensitive: `"clo"` is a prefix, `"Clo"` is not.
    pub fn is_prefix_of_any(candidate: &str) -> bool {
        Self::ALL
            .iter()
            .any(|state| state.as_str().starts_with(candidate))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    pub spoc: Option<String>,
    pub state: TaskState,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub closed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub cancelled: usize,
    /// Mean days from creation to close over closed tasks; 0.0 when none exist.
    pub avg_completion_days: f64,
}

impl Stats {
    pub fn total(&self) -> usize {
        self.open + self.in_progress + self.closed + self.cancelled
    }
}

/// One consistent read of the store. Views swap the whole thing at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSnapshot {
    pub active: Vec<Task>,
    pub closed: Vec<Task>,
    pub stats: Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pane {
    #[default]
    Active,
    Closed,
}

impl Pane {
    pub const fn toggle(self) -> Self {
        match self {
            Self::Active => Self::Closed,
            Self::Closed => Self::Active,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Active => "Active Tasks",
            Self::Closed => "Closed Tasks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditColumn {
    Content,
    State,
}

impl EditColumn {
    pub const fn toggle(self) -> Self {
        match self {
            Self::Content => Self::State,
            Self::State => Self::Content,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::State => "state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AppMode {
    #[default]
    Normal,
    Edit(EditColumn),
}

#[cfg(test)]
mod tests {
    use super::{EditColumn, Pane, TaskState};

    #[test]
    fn state_parse_and_label_agree() {
        for state in TaskState::ALL {
            assert_eq!(TaskState::parse(state.as_str()), Some(state));
        }
        assert_eq!(TaskState::parse("Open"), None);
        assert_eq!(TaskState::parse("bogus"), None);
        assert_eq!(TaskState::parse(""), None);
    }

    #[test]
    fn prefix_check_is_case_sensitive() {
        assert!(TaskState::is_prefix_of_any(""));
        assert!(TaskState::is_prefix_of_any("c"));
        assert!(TaskState::is_prefix_of_any("in_"));
        assert!(TaskState::is_prefix_of_any("cancelled"));
        assert!(!TaskState::is_prefix_of_any("openc"));
        assert!(!TaskState::is_prefix_of_any("C"));
        assert!(!TaskState::is_prefix_of_any("closedd"));
    }

    #[test]
    fn active_states_split_the_enum() {
        let active: Vec<_> = TaskState::ALL
            .into_iter()
            .filter(|state| state.is_active())
            .collect();
        assert_eq!(active, vec![TaskState::Open, TaskState::InProgress]);
    }

    #[test]
    fn toggles_are_involutions() {
        assert_eq!(Pane::Active.toggle().toggle(), Pane::Active);
        assert_eq!(Pane::Active.toggle(), Pane::Closed);
        assert_eq!(EditColumn::Content.toggle(), EditColumn::State);
        assert_eq!(EditColumn::State.toggle().toggle(), EditColumn::State);
    }
}
