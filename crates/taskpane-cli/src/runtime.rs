// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use taskpane_app::{Stats, Task, TaskId, TaskSnapshot, TaskState};
use taskpane_db::Store;

pub struct DbRuntime<'a> {
    store: &'a Store,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl taskpane_tui::AppRuntime for DbRuntime<'_> {
    fn load_active(&mut self) -> Result<Vec<Task>> {
        self.store.list_active()
    }

    fn load_closed(&mut self) -> Result<Vec<Task>> {
        self.store.list_closed()
    }

    fn load_stats(&mut self) -> Result<Stats> {
        self.store.stats()
    }

    fn update_content(&mut self, task_id: TaskId, content: &str) -> Result<()> {
        self.store.update_content(task_id, content)
    }

    fn update_state(&mut self, task_id: TaskId, state: TaskState) -> Result<()> {
        self.store.update_state(task_id, state)
    }

    fn load_snapshot(&mut self) -> Result<TaskSnapshot> {
        self.store.snapshot()
    }
}
