// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppMode, EditColumn, Pane, Task, TaskId, TaskSnapshot, TaskState, ValidationError};

/// The row an edit session was opened on. Commits resolve against this,
/// never against whatever happens to be focused at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTarget {
    pub pane: Pane,
    pub row: usize,
    pub task_id: TaskId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Content(String),
    State(TaskState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub task_id: TaskId,
    pub change: TaskChange,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub snapshot: TaskSnapshot,
    pub pane: Pane,
    pub cursor: usize,
    pub mode: AppMode,
    pub edit_buffer: String,
    pub edit_target: Option<EditTarget>,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    TogglePane,
    FocusPane(Pane),
    NextRow,
    PrevRow,
    EnterEdit,
    CancelEdit,
    Commit,
    ToggleEditColumn,
    DeleteChar,
    InsertChar(char),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    QuitRequested,
    PaneChanged(Pane),
    CursorMoved(usize),
    ModeChanged(AppMode),
    BufferChanged,
    InputRejected(char),
    CommitRequested(PendingEdit),
    ValidationFailed(ValidationError),
    StatusUpdated(String),
    StatusCleared,
}

impl ViewModel {
    pub fn new(snapshot: TaskSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn list(&self, pane: Pane) -> &[Task] {
        match pane {
            Pane::Active => &self.snapshot.active,
            Pane::Closed => &self.snapshot.closed,
        }
    }

    pub fn focused_list(&self) -> &[Task] {
        self.list(self.pane)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.focused_list().get(self.cursor)
    }

    /// The task the current edit session is bound to, if it is still where
    /// the session left it.
    pub fn edit_task(&self) -> Option<&Task> {
        let target = self.edit_target?;
        self.list(target.pane)
            .get(target.row)
            .filter(|task| task.id == target.task_id)
    }

    pub fn cursor_in_bounds(&self) -> bool {
        self.cursor < self.focused_list().len().max(1)
    }

    /// Swaps in a freshly loaded snapshot and re-establishes the cursor bound.
    pub fn replace_snapshot(&mut self, snapshot: TaskSnapshot) {
        self.snapshot = snapshot;
        self.clamp_cursor();
        if matches!(self.mode, AppMode::Edit(_)) && self.edit_task().is_none() {
            self.reset_edit();
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match (self.mode, command) {
            (_, AppCommand::ClearStatus) => {
                if self.status_line.take().is_some() {
                    vec![AppEvent::StatusCleared]
                } else {
                    Vec::new()
                }
            }
            (AppMode::Normal, AppCommand::Quit) => vec![AppEvent::QuitRequested],
            (AppMode::Normal, AppCommand::TogglePane) => self.focus(self.pane.toggle()),
            (AppMode::Normal, AppCommand::FocusPane(pane)) => {
                if pane == self.pane {
                    Vec::new()
                } else {
                    self.focus(pane)
                }
            }
            (AppMode::Normal, AppCommand::NextRow) => self.move_cursor(1),
            (AppMode::Normal, AppCommand::PrevRow) => self.move_cursor(-1),
            (AppMode::Normal, AppCommand::EnterEdit) => self.enter_edit(),
            (AppMode::Edit(_), AppCommand::CancelEdit) => {
                self.reset_edit();
                vec![AppEvent::ModeChanged(self.mode)]
            }
            (AppMode::Edit(column), AppCommand::Commit) => self.commit(column),
            (AppMode::Edit(column), AppCommand::ToggleEditColumn) => self.switch_column(column),
            (AppMode::Edit(_), AppCommand::DeleteChar) => {
                if self.edit_buffer.pop().is_some() {
                    vec![AppEvent::BufferChanged]
                } else {
                    Vec::new()
                }
            }
            (AppMode::Edit(column), AppCommand::InsertChar(ch)) => self.insert_char(column, ch),
            _ => Vec::new(),
        }
    }

    fn focus(&mut self, pane: Pane) -> Vec<AppEvent> {
        self.pane = pane;
        self.cursor = 0;
        vec![AppEvent::PaneChanged(pane), AppEvent::CursorMoved(0)]
    }

    fn move_cursor(&mut self, delta: isize) -> Vec<AppEvent> {
        let len = self.focused_list().len();
        let next = if len == 0 {
            0
        } else if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor
                .saturating_add(delta.unsigned_abs())
                .min(len - 1)
        };
        if next == self.cursor {
            return Vec::new();
        }
        self.cursor = next;
        vec![AppEvent::CursorMoved(next)]
    }

    fn clamp_cursor(&mut self) {
        let len = self.focused_list().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn enter_edit(&mut self) -> Vec<AppEvent> {
        if self.pane != Pane::Active {
            return Vec::new();
        }
        let Some(task) = self.selected_task() else {
            return Vec::new();
        };
        let target = EditTarget {
            pane: self.pane,
            row: self.cursor,
            task_id: task.id,
        };
        self.edit_buffer = task.content.clone();
        self.edit_target = Some(target);
        self.mode = AppMode::Edit(EditColumn::Content);
        vec![AppEvent::ModeChanged(self.mode)]
    }

    fn switch_column(&mut self, column: EditColumn) -> Vec<AppEvent> {
        let next = column.toggle();
        self.edit_buffer = match (next, self.edit_task()) {
            (EditColumn::Content, Some(task)) => task.content.clone(),
            (EditColumn::State, Some(task)) => task.state.as_str().to_owned(),
            (_, None) => String::new(),
        };
        self.mode = AppMode::Edit(next);
        vec![AppEvent::ModeChanged(self.mode), AppEvent::BufferChanged]
    }

    fn insert_char(&mut self, column: EditColumn, ch: char) -> Vec<AppEvent> {
        if column == EditColumn::State {
            let mut candidate = self.edit_buffer.clone();
            candidate.push(ch);
            if !TaskState::is_prefix_of_any(&candidate) {
                return vec![AppEvent::InputRejected(ch)];
            }
        }
        self.edit_buffer.push(ch);
        vec![AppEvent::BufferChanged]
    }

    fn commit(&mut self, column: EditColumn) -> Vec<AppEvent> {
        let task_id = self.edit_task().map(|task| task.id);
        let buffer = std::mem::take(&mut self.edit_buffer);
        self.reset_edit();

        let mut events = vec![AppEvent::ModeChanged(self.mode)];
        let Some(task_id) = task_id else {
            return events;
        };

        match column {
            EditColumn::Content => events.push(AppEvent::CommitRequested(PendingEdit {
                task_id,
                change: TaskChange::Content(buffer),
            })),
            EditColumn::State => match TaskState::parse(&buffer) {
                Some(state) => events.push(AppEvent::CommitRequested(PendingEdit {
                    task_id,
                    change: TaskChange::State(state),
                })),
                None => {
                    let error = ValidationError::InvalidState(buffer);
                    events.push(self.set_status(error.to_string()));
                    events.push(AppEvent::ValidationFailed(error));
                }
            },
        }
        events
    }

    fn reset_edit(&mut self) {
        self.mode = AppMode::Normal;
        self.edit_buffer.clear();
        self.edit_target = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}
