// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod render;

pub use render::{FOOTER_TEXT, fit_to_width, render, render_grid, render_view, stats_lines};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{cursor, execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;
use taskpane_app::{
    AppCommand, AppEvent, AppMode, Pane, PendingEdit, Stats, Task, TaskChange, TaskId,
    TaskSnapshot, TaskState, ViewModel,
};

/// Everything the UI needs from storage. All calls are synchronous and
/// complete before control returns to the loop.
pub trait AppRuntime {
    fn load_active(&mut self) -> Result<Vec<Task>>;
    fn load_closed(&mut self) -> Result<Vec<Task>>;
    fn load_stats(&mut self) -> Result<Stats>;
    fn update_content(&mut self, task_id: TaskId, content: &str) -> Result<()>;
    fn update_state(&mut self, task_id: TaskId, state: TaskState) -> Result<()>;

    fn load_snapshot(&mut self) -> Result<TaskSnapshot> {
        Ok(TaskSnapshot {
            active: self.load_active()?,
            closed: self.load_closed()?,
            stats: self.load_stats()?,
        })
    }
}

pub trait EventSource {
    /// Blocks until the next terminal event.
    fn next_event(&mut self) -> Result<Event>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<Event> {
        event::read().context("read event")
    }
}

/// Raw mode plus alternate screen for as long as the guard lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        if let Err(error) = execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = disable_raw_mode();
            return Err(error).context("enter alternate screen");
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    }
}

/// Loads the initial snapshot, takes over the terminal, and runs until the
/// user quits or a store/terminal error occurs.
pub fn run_in_terminal<R: AppRuntime>(view: &mut ViewModel, runtime: &mut R) -> Result<()> {
    refresh_view(view, runtime).context("load tasks")?;

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    run_app(&mut terminal, &mut CrosstermEvents, view, runtime)
}

pub fn run_app<B, E, R>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    view: &mut ViewModel,
    runtime: &mut R,
) -> Result<()>
where
    B: Backend,
    E: EventSource,
    R: AppRuntime,
{
    loop {
        terminal
            .draw(|frame| render(frame, view))
            .context("draw frame")?;

        match events.next_event()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(view, runtime, key)? {
                    return Ok(());
                }
            }
            Event::Resize(_, _) => {}
            _ => {}
        }
    }
}

/// Returns true when the loop should exit.
pub fn handle_key_event<R: AppRuntime>(
    view: &mut ViewModel,
    runtime: &mut R,
    key: KeyEvent,
) -> Result<bool> {
    view.dispatch(AppCommand::ClearStatus);
    let Some(command) = command_for_key(view.mode, key) else {
        return Ok(false);
    };

    for app_event in view.dispatch(command) {
        match app_event {
            AppEvent::QuitRequested => return Ok(true),
            AppEvent::CommitRequested(edit) => commit_edit(view, runtime, &edit)?,
            AppEvent::ValidationFailed(error) => log::warn!("edit rejected: {error}"),
            AppEvent::InputRejected(ch) => log::debug!("state input rejected: {ch:?}"),
            _ => {}
        }
    }
    Ok(false)
}

pub fn command_for_key(mode: AppMode, key: KeyEvent) -> Option<AppCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match mode {
        AppMode::Normal => match key.code {
            KeyCode::Char('c') if ctrl => Some(AppCommand::Quit),
            _ if ctrl || alt => None,
            KeyCode::Char('q') | KeyCode::Esc => Some(AppCommand::Quit),
            KeyCode::Tab => Some(AppCommand::TogglePane),
            KeyCode::Char('l') | KeyCode::Right => Some(AppCommand::FocusPane(Pane::Closed)),
            KeyCode::Char('h') | KeyCode::Left => Some(AppCommand::FocusPane(Pane::Active)),
            KeyCode::Char('j') | KeyCode::Down => Some(AppCommand::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(AppCommand::PrevRow),
            KeyCode::Char('i') => Some(AppCommand::EnterEdit),
            _ => None,
        },
        AppMode::Edit(_) => match key.code {
            KeyCode::Esc => Some(AppCommand::CancelEdit),
            KeyCode::Enter => Some(AppCommand::Commit),
            KeyCode::Tab => Some(AppCommand::ToggleEditColumn),
            KeyCode::Backspace => Some(AppCommand::DeleteChar),
            KeyCode::Char(ch) if !ctrl && !alt => Some(AppCommand::InsertChar(ch)),
            _ => None,
        },
    }
}

/// Writes one edit, then reloads every list so the panes and the stats
/// change together.
pub fn commit_edit<R: AppRuntime>(
    view: &mut ViewModel,
    runtime: &mut R,
    edit: &PendingEdit,
) -> Result<()> {
    match &edit.change {
        TaskChange::Content(content) => runtime
            .update_content(edit.task_id, content)
            .with_context(|| format!("update task {} content", edit.task_id))?,
        TaskChange::State(state) => runtime
            .update_state(edit.task_id, *state)
            .with_context(|| format!("update task {} state", edit.task_id))?,
    }
    refresh_view(view, runtime).context("reload tasks")?;

    match &edit.change {
        TaskChange::Content(_) => log::info!("task {} content saved", edit.task_id),
        TaskChange::State(state) => log::info!("task {} moved to {}", edit.task_id, state.as_str()),
    }
    view.set_status(format!("saved task {}", edit.task_id));
    Ok(())
}

pub fn refresh_view<R: AppRuntime>(view: &mut ViewModel, runtime: &mut R) -> Result<()> {
    let snapshot = runtime.load_snapshot()?;
    view.replace_snapshot(snapshot);
    Ok(())
}
