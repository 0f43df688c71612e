//! Plan document store.
//!
//! Each plan is one row in `plans`; its nested todos and notes are kept as
//! JSON documents in the same row so every operation touches exactly one
//! document.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::models::*;

const PLAN_COLUMNS: &str = "id, title, todos, notes, creation_date";

/// Handle to the plan store.
///
/// Cloning is cheap and shares the same connection. The handle is opened
/// explicitly at startup, handed to the router as state, and closed with
/// [`Database::close`] at shutdown.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened plan store at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Location of the store when none is configured.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "planboard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("planboard.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Close the underlying connection.
    ///
    /// The connection is only closed here when this is the last handle;
    /// otherwise it closes when the remaining clones are dropped.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
                conn.close()
                    .map_err(|(_, e)| e)
                    .context("Failed to close database")?;
                tracing::debug!("Plan store closed");
            }
            Err(_) => {
                tracing::debug!("Plan store still shared; connection closes with the last handle");
            }
        }
        Ok(())
    }

    // ============================================================
    // Plan operations
    // ============================================================

    /// All plans, newest first.
    pub fn list_plans(&self) -> Result<Vec<Plan>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM plans ORDER BY creation_date DESC, rowid DESC",
            PLAN_COLUMNS
        ))?;

        let plans = stmt
            .query_map([], plan_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(plans)
    }

    pub fn get_plan(&self, id: Uuid) -> Result<Option<Plan>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        fetch_plan(&conn, id)
    }

    pub fn create_plan(&self, input: CreatePlanInput) -> Result<Plan> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = now();

        let plan = Plan {
            id: Uuid::new_v4(),
            title: input.title.filter(|t| !t.is_empty()),
            todos: resolve_todos(input.todos, &[], now),
            notes: resolve_notes(input.notes, &[], now),
            creation_date: now,
        };

        conn.execute(
            "INSERT INTO plans (id, title, todos, notes, creation_date) VALUES (?, ?, ?, ?, ?)",
            (
                plan.id.to_string(),
                &plan.title,
                serde_json::to_string(&plan.todos)?,
                serde_json::to_string(&plan.notes)?,
                format_datetime(plan.creation_date),
            ),
        )?;

        Ok(plan)
    }

    /// Replace the fields present in `input`, leaving the rest untouched.
    ///
    /// The read and the write happen under one lock, so an update is a single
    /// read-modify-write of the document. Returns `None` if no plan has `id`.
    pub fn update_plan(&self, id: Uuid, input: UpdatePlanInput) -> Result<Option<Plan>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mut plan) = fetch_plan(&conn, id)? else {
            return Ok(None);
        };
        let now = now();

        if let Some(title) = input.title {
            plan.title = title.filter(|t| !t.is_empty());
        }
        if let Some(todos) = input.todos {
            plan.todos = resolve_todos(todos, &plan.todos, now);
        }
        if let Some(notes) = input.notes {
            plan.notes = resolve_notes(notes, &plan.notes, now);
        }

        conn.execute(
            "UPDATE plans SET title = ?, todos = ?, notes = ? WHERE id = ?",
            (
                &plan.title,
                serde_json::to_string(&plan.todos)?,
                serde_json::to_string(&plan.notes)?,
                id.to_string(),
            ),
        )?;

        Ok(Some(plan))
    }

    pub fn delete_plan(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM plans WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn fetch_plan(conn: &Connection, id: Uuid) -> Result<Option<Plan>> {
    let plan = conn
        .query_row(
            &format!("SELECT {} FROM plans WHERE id = ?", PLAN_COLUMNS),
            [id.to_string()],
            plan_from_row,
        )
        .optional()?;
    Ok(plan)
}

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: parse_uuid(row, 0)?,
        title: row.get(1)?,
        todos: json_column(row, 2)?,
        notes: json_column(row, 3)?,
        creation_date: parse_datetime(row, 4)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Current time at the precision the store keeps, so a plan returned from a
/// write compares equal to the same plan read back.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width UTC timestamps sort lexicographically in time order.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_timestamps_sort_in_time_order() {
        let earlier = DateTime::parse_from_rfc3339("2026-10-19T09:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_datetime(earlier) < format_datetime(later));
        assert_eq!(format_datetime(earlier), "2026-10-19T09:05:00.000000Z");
    }

    fn insert_raw(db: &Database, id: &str, creation_date: &str) {
        let conn = db.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO plans (id, title, todos, notes, creation_date) VALUES (?, NULL, '[]', '[]', ?)",
            (id, creation_date),
        )
        .unwrap();
    }

    fn store() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn stored_precision_round_trips() {
        let db = store();
        let created = db
            .create_plan(CreatePlanInput {
                title: None,
                todos: vec![TodoInput::new("Milk")],
                notes: vec![],
            })
            .unwrap();
        let fetched = db.get_plan(created.id).unwrap().unwrap();
        assert_eq!(fetched.creation_date, created.creation_date);
    }

    #[test]
    fn corrupt_id_is_an_error_not_a_nil_id() {
        let db = store();
        insert_raw(&db, "garbage", "2026-10-19T09:05:00.000000Z");

        assert!(db.list_plans().is_err());
    }

    #[test]
    fn corrupt_creation_date_is_an_error() {
        let db = store();
        let id = Uuid::new_v4();
        insert_raw(&db, &id.to_string(), "yesterday");

        assert!(db.list_plans().is_err());
        assert!(db.get_plan(id).is_err());
    }
}
