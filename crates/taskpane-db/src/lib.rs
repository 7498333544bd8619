// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, Row, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use taskpane_app::{Stats, Task, TaskId, TaskSnapshot, TaskState};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "taskpane";

const TASK_COLUMNS: &str =
    "id, task_content, task_spoc, task_state, created_at, updated_at, closed_at";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "task",
    &[
        "id",
        "created_at",
        "updated_at",
        "closed_at",
        "task_state",
        "task_content",
        "task_spoc",
    ],
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredObject {
    name: &'static str,
    kind: &'static str,
    create_sql: &'static str,
}

const REQUIRED_OBJECTS: &[RequiredObject] = &[
    RequiredObject {
        name: "idx_task_state",
        kind: "index",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_task_state ON task (task_state);",
    },
    RequiredObject {
        name: "trg_task_touch_updated_at",
        kind: "trigger",
        create_sql: "
            CREATE TRIGGER IF NOT EXISTS trg_task_touch_updated_at
            AFTER UPDATE ON task
            FOR EACH ROW
            WHEN NEW.updated_at = OLD.updated_at
            BEGIN
              UPDATE task
              SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
              WHERE id = NEW.id;
            END;
        ",
    },
];

/// (content, spoc, state, days since creation, days to close)
const DEMO_TASKS: &[(&str, Option<&str>, TaskState, i64, Option<i64>)] = &[
    ("Rotate staging credentials", Some("Avery"), TaskState::Open, 3, None),
    ("Write release notes for 1.4", Some("Jordan"), TaskState::InProgress, 5, None),
    ("Triage flaky integration tests", None, TaskState::Open, 1, None),
    ("Migrate nightly backup to new bucket", Some("Riley"), TaskState::InProgress, 9, None),
    ("Renew TLS certificate for api host", Some("Morgan"), TaskState::Closed, 14, Some(2)),
    ("Draft on-call handbook", Some("Casey"), TaskState::Closed, 30, Some(11)),
    ("Evaluate second CDN vendor", None, TaskState::Cancelled, 21, None),
    ("Fix timezone bug in billing export", Some("Quinn"), TaskState::Closed, 7, Some(1)),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub content: String,
    pub spoc: Option<String>,
    pub state: TaskState,
    pub created_at: OffsetDateTime,
    /// Ignored unless `state` is closed; a closed task without one is stamped now.
    pub closed_at: Option<OffsetDateTime>,
}

#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        log::info!("opened task database at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_objects(&self.conn)
    }

    pub fn list_active(&self) -> Result<Vec<Task>> {
        self.list_where_state_in(TaskState::Open, TaskState::InProgress)
            .context("query active tasks")
    }

    pub fn list_closed(&self) -> Result<Vec<Task>> {
        self.list_where_state_in(TaskState::Closed, TaskState::Cancelled)
            .context("query closed tasks")
    }

    pub fn stats(&self) -> Result<Stats> {
        let (open, in_progress, closed, cancelled, avg_completion_days): (
            i64,
            i64,
            i64,
            i64,
            f64,
        ) = self
            .conn
            .query_row(
                "
                SELECT
                  COUNT(CASE WHEN task_state = 'open' THEN 1 END),
                  COUNT(CASE WHEN task_state = 'in_progress' THEN 1 END),
                  COUNT(CASE WHEN task_state = 'closed' THEN 1 END),
                  COUNT(CASE WHEN task_state = 'cancelled' THEN 1 END),
                  COALESCE(
                    AVG(
                      CASE
                        WHEN task_state = 'closed' AND closed_at IS NOT NULL
                        THEN julianday(closed_at) - julianday(created_at)
                      END
                    ),
                    0.0
                  )
                FROM task
                ",
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .context("query task stats")?;

        Ok(Stats {
            open: usize::try_from(open).unwrap_or(0),
            in_progress: usize::try_from(in_progress).unwrap_or(0),
            closed: usize::try_from(closed).unwrap_or(0),
            cancelled: usize::try_from(cancelled).unwrap_or(0),
            avg_completion_days,
        })
    }

    /// All three reads, in the order a view reload performs them.
    pub fn snapshot(&self) -> Result<TaskSnapshot> {
        Ok(TaskSnapshot {
            active: self.list_active()?,
            closed: self.list_closed()?,
            stats: self.stats()?,
        })
    }

    pub fn get_task(&self, task_id: TaskId) -> Result<Task> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM task WHERE id = ?"),
                params![task_id.get()],
                task_from_row,
            )
            .with_context(|| format!("load task {task_id}"))
    }

    pub fn update_content(&self, task_id: TaskId, content: &str) -> Result<()> {
        let now = now_timestamp()?;
        let rows_affected = self
            .conn
            .execute(
                "UPDATE task SET task_content = ?, updated_at = ? WHERE id = ?",
                params![content, now, task_id.get()],
            )
            .with_context(|| format!("update task {task_id} content"))?;
        if rows_affected == 0 {
            bail!("task {task_id} not found -- reload and choose an existing task");
        }
        log::debug!("updated content of task {task_id}");
        Ok(())
    }

    pub fn update_state(&self, task_id: TaskId, state: TaskState) -> Result<()> {
        let now = now_timestamp()?;
        let rows_affected = self
            .conn
            .execute(
                "
                UPDATE task
                SET
                  task_state = ?1,
                  updated_at = ?2,
                  closed_at = CASE WHEN ?1 = 'closed' THEN ?2 ELSE closed_at END
                WHERE id = ?3
                ",
                params![state.as_str(), now, task_id.get()],
            )
            .with_context(|| format!("update task {task_id} state to {}", state.as_str()))?;
        if rows_affected == 0 {
            bail!("task {task_id} not found -- reload and choose an existing task");
        }
        log::debug!("moved task {task_id} to {}", state.as_str());
        Ok(())
    }

    pub fn create_task(&self, task: &NewTask) -> Result<TaskId> {
        let closed_at = match (task.state, task.closed_at) {
            (TaskState::Closed, Some(closed_at)) => {
                if closed_at < task.created_at {
                    bail!("task {:?} cannot close before it was created", task.content);
                }
                Some(closed_at)
            }
            (TaskState::Closed, None) => Some(OffsetDateTime::now_utc()),
            _ => None,
        };
        let created_at = format_timestamp(task.created_at)?;
        let closed_at = closed_at.map(format_timestamp).transpose()?;

        self.conn
            .execute(
                "
                INSERT INTO task (
                  task_content, task_spoc, task_state,
                  created_at, updated_at, closed_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                ",
                params![
                    task.content,
                    task.spoc,
                    task.state.as_str(),
                    created_at,
                    created_at,
                    closed_at,
                ],
            )
            .with_context(|| format!("insert task {:?}", task.content))?;

        Ok(TaskId::new(self.conn.last_insert_rowid()))
    }

    pub fn seed_demo_data(&self) -> Result<()> {
        let now = OffsetDateTime::now_utc();
        for (content, spoc, state, age_days, close_after_days) in DEMO_TASKS {
            let created_at = now - Duration::days(*age_days);
            self.create_task(&NewTask {
                content: (*content).to_owned(),
                spoc: spoc.map(str::to_owned),
                state: *state,
                created_at,
                closed_at: close_after_days.map(|days| created_at + Duration::days(days)),
            })
            .context("seed demo tasks")?;
        }
        Ok(())
    }

    fn list_where_state_in(&self, first: TaskState, second: TaskState) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM task WHERE task_state IN (?, ?) ORDER BY id ASC"
            ))
            .context("prepare task list query")?;
        let rows = stmt
            .query_map(params![first.as_str(), second.as_str()], task_from_row)
            .context("query tasks")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect tasks")
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TASKPANE_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TASKPANE_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("taskpane.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let state_raw: String = row.get(3)?;
    let state = TaskState::parse(&state_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown task state {state_raw}"),
            )),
        )
    })?;

    let created_at_raw: String = row.get(4)?;
    let updated_at_raw: String = row.get(5)?;
    let closed_at_raw: Option<String> = row.get(6)?;

    Ok(Task {
        id: TaskId::new(row.get(0)?),
        content: row.get(1)?,
        spoc: row.get(2)?,
        state,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
        closed_at: parse_opt_datetime(closed_at_raw).map_err(to_sql_error)?,
    })
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point taskpane at a task database or start from an empty file"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; migrate the database before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_objects(conn: &Connection) -> Result<()> {
    for object in REQUIRED_OBJECTS {
        conn.execute_batch(object.create_sql)
            .with_context(|| format!("ensure required {} `{}`", object.kind, object.name))?;
    }

    let existing = schema_object_names(conn)?;
    let missing = REQUIRED_OBJECTS
        .iter()
        .filter(|object| !existing.contains(object.name))
        .map(|object| object.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required schema objects: {}; migrate the database before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn schema_object_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type IN ('index', 'trigger')
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare schema object names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query schema object names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect schema object names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_timestamp() -> Result<String> {
    format_timestamp(OffsetDateTime::now_utc())
}

// Millisecond UTC, matching what the schema defaults and trigger write.
fn format_timestamp(value: OffsetDateTime) -> Result<String> {
    value
        .to_offset(time::UtcOffset::UTC)
        .format(&format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .context("format timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) =
        OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339)
    {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn parse_opt_datetime(raw: Option<String>) -> Result<Option<OffsetDateTime>> {
    raw.as_deref().map(parse_datetime).transpose()
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}
