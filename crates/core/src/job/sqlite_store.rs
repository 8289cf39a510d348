//! SQLite-backed run state store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::store::{JobRecord, RunStateError, RunStateStore};
use super::types::{JobId, JobStatus};

/// SQLite-backed run state store.
///
/// One database file holds the state of one usecase.
pub struct SqliteRunStateStore {
    conn: Mutex<Connection>,
}

/// Raw column values of a `job_states` row.
struct RawRecord {
    job_id: String,
    status: String,
    attempts: u32,
    log_path: Option<String>,
    updated_at: String,
}

impl SqliteRunStateStore {
    /// Open (or create) the state database at `path`.
    pub fn new(path: &Path) -> Result<Self, RunStateError> {
        let conn = Connection::open(path).map_err(|e| {
            RunStateError::Database(format!("{}: {}", path.display(), e))
        })?;
        Self::initialize_schema(&conn)
            .map_err(|e| RunStateError::Database(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, RunStateError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RunStateError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Conventional state file of a usecase: `<dir>/<usecase>.status.db`.
    pub fn path_for(dir: &Path, usecase: &str) -> PathBuf {
        dir.join(format!("{}.status.db", usecase))
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RunStateError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS job_states (
                job_id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                log_path TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_job_states_status ON job_states(status);
            "#,
        )
        .map_err(|e| RunStateError::Database(e.to_string()))
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawRecord> {
        Ok(RawRecord {
            job_id: row.get(0)?,
            status: row.get(1)?,
            attempts: row.get(2)?,
            log_path: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn raw_to_record(raw: RawRecord) -> Result<JobRecord, RunStateError> {
        let status: JobStatus = raw.status.parse().map_err(|reason| RunStateError::Corrupt {
            job_id: raw.job_id.clone(),
            reason,
        })?;

        let updated_at = DateTime::parse_from_rfc3339(&raw.updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RunStateError::Corrupt {
                job_id: raw.job_id.clone(),
                reason: format!("invalid timestamp '{}': {}", raw.updated_at, e),
            })?;

        Ok(JobRecord {
            job_id: JobId::from(raw.job_id),
            status,
            attempts: raw.attempts,
            log_path: raw.log_path.map(PathBuf::from),
            updated_at,
        })
    }
}

impl RunStateStore for SqliteRunStateStore {
    fn load(&self) -> Result<HashMap<JobId, JobRecord>, RunStateError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT job_id, status, attempts, log_path, updated_at FROM job_states")
            .map_err(|e| RunStateError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_raw)
            .map_err(|e| RunStateError::Database(e.to_string()))?;

        let mut records = HashMap::new();
        for row_result in rows {
            let raw = row_result.map_err(|e| RunStateError::Database(e.to_string()))?;
            let record = Self::raw_to_record(raw)?;
            records.insert(record.job_id.clone(), record);
        }

        Ok(records)
    }

    fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, RunStateError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT job_id, status, attempts, log_path, updated_at FROM job_states WHERE job_id = ?",
            params![job_id.as_str()],
            Self::row_to_raw,
        );

        match result {
            Ok(raw) => Self::raw_to_record(raw).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RunStateError::Database(e.to_string())),
        }
    }

    fn save(&self, record: &JobRecord) -> Result<(), RunStateError> {
        let conn = self.conn.lock().unwrap();

        let log_path = record
            .log_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());

        conn.execute(
            r#"
            INSERT INTO job_states (job_id, status, attempts, log_path, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(job_id) DO UPDATE SET
                status = excluded.status,
                attempts = excluded.attempts,
                log_path = excluded.log_path,
                updated_at = excluded.updated_at
            "#,
            params![
                record.job_id.as_str(),
                record.status.as_str(),
                record.attempts,
                log_path,
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RunStateError::Database(e.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), RunStateError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM job_states", [])
            .map_err(|e| RunStateError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_store() -> SqliteRunStateStore {
        SqliteRunStateStore::in_memory().unwrap()
    }

    fn record(id: &str, status: JobStatus, attempts: u32) -> JobRecord {
        JobRecord {
            job_id: JobId::from(id),
            status,
            attempts,
            log_path: Some(PathBuf::from(format!("/tmp/log/{}.log", id))),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = create_test_store();
        assert!(store.load().unwrap().is_empty());
        assert!(store.get(&JobId::from("missing")).unwrap().is_none());
    }

    #[test]
    fn test_save_and_get() {
        let store = create_test_store();
        let saved = record("ingestion/mhs-n19/2009-04-01/2009-04-07", JobStatus::Done, 2);
        store.save(&saved).unwrap();

        let fetched = store.get(&saved.job_id).unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Done);
        assert_eq!(fetched.attempts, 2);
        assert_eq!(fetched.log_path, saved.log_path);
    }

    #[test]
    fn test_save_is_upsert() {
        let store = create_test_store();
        store.save(&record("job-a", JobStatus::Running, 1)).unwrap();
        store.save(&record("job-a", JobStatus::Failed, 3)).unwrap();
        store.save(&record("job-b", JobStatus::Done, 1)).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        let a = &records[&JobId::from("job-a")];
        assert_eq!(a.status, JobStatus::Failed);
        assert_eq!(a.attempts, 3);
    }

    #[test]
    fn test_clear() {
        let store = create_test_store();
        store.save(&record("job-a", JobStatus::Done, 1)).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_based_store_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = SqliteRunStateStore::path_for(temp_dir.path(), "usecase02");
        assert!(db_path.ends_with("usecase02.status.db"));

        {
            let store = SqliteRunStateStore::new(&db_path).unwrap();
            store.save(&record("job-a", JobStatus::Done, 1)).unwrap();
        }

        assert!(db_path.exists());
        let reopened = SqliteRunStateStore::new(&db_path).unwrap();
        let fetched = reopened.get(&JobId::from("job-a")).unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Done);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let store = create_test_store();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO job_states (job_id, status, attempts, updated_at) VALUES ('x', 'exploded', 1, ?)",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        let result = store.load();
        assert!(matches!(result, Err(RunStateError::Corrupt { .. })));
    }

    #[test]
    fn test_non_database_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not a sqlite database, just some text padding it out").unwrap();
        writeln!(file, "{}", "x".repeat(512)).unwrap();

        let result = SqliteRunStateStore::new(file.path());
        assert!(matches!(result, Err(RunStateError::Database(_))));
    }
}
