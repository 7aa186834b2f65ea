use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::schema::SCHEMA;
use super::{Snapshot, SnapshotStore};
use crate::error::{Error, Result};
use crate::workspace::WorkspaceState;

const FORMAT_VERSION: i64 = 1;

pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory store, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

impl SnapshotStore for SqliteSnapshotStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let row: Option<(i64, String, String)> = self
            .conn()
            .query_row(
                "SELECT format_version, state, saved_at FROM snapshots WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((version, state, saved_at)) = row else {
            return Ok(None);
        };
        if version != FORMAT_VERSION {
            return Err(Error::Config(format!(
                "unsupported snapshot format version {version}"
            )));
        }

        Ok(Some(Snapshot {
            state: serde_json::from_str(&state)?,
            saved_at: parse_datetime(&saved_at),
        }))
    }

    fn save(&self, state: &WorkspaceState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.conn().execute(
            "INSERT INTO snapshots (id, format_version, state, saved_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                format_version = excluded.format_version,
                state = excluded.state,
                saved_at = excluded.saved_at",
            params![FORMAT_VERSION, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.conn().execute("DELETE FROM snapshots", [])?;
        Ok(())
    }
}
