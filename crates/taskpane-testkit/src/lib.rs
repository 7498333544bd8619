// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::path::PathBuf;
use taskpane_app::{Task, TaskId, TaskState};
use time::{Duration, OffsetDateTime};

const VERBS: [&str; 12] = [
    "Review", "Draft", "Fix", "Migrate", "Document", "Refactor", "Audit", "Deploy", "Triage",
    "Benchmark", "Archive", "Prototype",
];

const SUBJECTS: [&str; 14] = [
    "billing export",
    "login flow",
    "nightly backup",
    "release notes",
    "search index",
    "on-call rota",
    "vendor contract",
    "CI pipeline",
    "onboarding guide",
    "metrics dashboard",
    "cache eviction",
    "license audit",
    "payment webhook",
    "error budget",
];

const CONTACTS: [&str; 10] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Quinn", "Parker", "Rowan", "Hayden",
];

/// Inputs for a task row, independent of any store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSeed {
    pub content: String,
    pub spoc: Option<String>,
    pub state: TaskState,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for task fixtures; the same seed always yields the same tasks.
#[derive(Debug, Clone)]
pub struct TaskFaker {
    rng: DeterministicRng,
}

impl TaskFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn content(&mut self) -> String {
        format!("{} {}", self.pick(&VERBS), self.pick(&SUBJECTS))
    }

    pub fn spoc(&mut self) -> Option<String> {
        if self.rng.bool() {
            Some(self.pick(&CONTACTS).to_owned())
        } else {
            None
        }
    }

    pub fn state(&mut self) -> TaskState {
        TaskState::ALL[self.rng.int_n(TaskState::ALL.len())]
    }

    pub fn task_seed(&mut self) -> TaskSeed {
        let days_ago = i64::try_from(self.rng.int_n(60)).unwrap_or(0) + 1;
        TaskSeed {
            content: self.content(),
            spoc: self.spoc(),
            state: self.state(),
            created_at: reference_now() - Duration::days(days_ago),
        }
    }

    pub fn task_seeds(&mut self, count: usize) -> Vec<TaskSeed> {
        (0..count).map(|_| self.task_seed()).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

/// An in-memory task for view and render tests.
pub fn sample_task(id: i64, content: &str, state: TaskState) -> Task {
    let created_at = reference_now();
    Task {
        id: TaskId::new(id),
        content: content.to_owned(),
        spoc: None,
        state,
        created_at,
        updated_at: created_at,
        closed_at: (state == TaskState::Closed).then(|| created_at + Duration::days(2)),
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("taskpane.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

fn reference_now() -> OffsetDateTime {
    // 2026-02-19T12:34:56Z
    OffsetDateTime::from_unix_timestamp(1_771_504_496).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
