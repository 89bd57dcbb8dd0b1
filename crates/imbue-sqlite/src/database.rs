//! Named SQLite databases with per-platform storage profiles

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, info};

use crate::dataset::{Dataset, ImportMode};
use crate::error::StoreError;
use crate::value::{Row, SqlValue};

/// Where a database keeps its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// File-backed database under the data directory.
    Durable,
    /// In-memory database restored from, and explicitly persisted to, a
    /// snapshot file.
    Ephemeral,
}

/// How a named database stores its data and shapes its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreProfile {
    pub mode: StorageMode,
    /// Synthesize a column-description row at the head of every non-empty
    /// query result.
    pub leading_column_metadata: bool,
}

impl StoreProfile {
    pub fn durable() -> Self {
        Self {
            mode: StorageMode::Durable,
            leading_column_metadata: false,
        }
    }

    pub fn ephemeral() -> Self {
        Self {
            mode: StorageMode::Ephemeral,
            leading_column_metadata: false,
        }
    }

    pub fn with_leading_column_metadata(mut self) -> Self {
        self.leading_column_metadata = true;
        self
    }
}

/// A named database plus the profile it was opened under.
pub struct SqliteDatabase {
    name: String,
    conn: Mutex<Connection>,
    profile: StoreProfile,
    /// Snapshot file for ephemeral databases; `None` for durable ones.
    snapshot_path: Option<PathBuf>,
}

impl SqliteDatabase {
    /// Open the database `<dir>/<name>.db` under the given profile.
    ///
    /// Durable databases read and write the file directly. Ephemeral ones
    /// load the file into memory when it exists and write it back only on
    /// [`persist`](Self::persist).
    pub fn create(dir: &Path, name: &str, profile: StoreProfile) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let db_path = dir.join(format!("{}.db", name));
        match profile.mode {
            StorageMode::Durable => {
                let conn = Connection::open(&db_path)?;
                Self::configure(&conn)?;
                info!(database = %name, path = %db_path.display(), "opened durable database");
                Ok(Self {
                    name: name.to_string(),
                    conn: Mutex::new(conn),
                    profile,
                    snapshot_path: None,
                })
            }
            StorageMode::Ephemeral => {
                let mut conn = Connection::open_in_memory()?;
                Self::configure(&conn)?;
                if db_path.exists() {
                    Self::restore_snapshot(&mut conn, &db_path)?;
                    info!(database = %name, path = %db_path.display(), "restored snapshot");
                } else {
                    info!(database = %name, "opened empty ephemeral database");
                }
                Ok(Self {
                    name: name.to_string(),
                    conn: Mutex::new(conn),
                    profile,
                    snapshot_path: Some(db_path),
                })
            }
        }
    }

    /// Open a throwaway in-memory database with no snapshot file.
    pub fn in_memory(name: &str, profile: StoreProfile) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Ok(Self {
            name: name.to_string(),
            conn: Mutex::new(conn),
            profile,
            snapshot_path: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> StoreProfile {
        self.profile
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Import a seed dataset inside one transaction.
    ///
    /// Full mode drops and recreates every table in the dataset first, so a
    /// repeated import replaces table contents wholesale instead of stacking
    /// duplicates. Returns the number of inserted rows.
    pub fn import(&self, dataset: &Dataset) -> Result<usize, StoreError> {
        dataset.validate()?;
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let mut inserted = 0;
        for table in &dataset.tables {
            if dataset.mode == ImportMode::Full {
                tx.execute_batch(&table.drop_sql())?;
            }
            tx.execute_batch(&table.create_sql())?;
            let sql = table.insert_sql();
            let mut stmt = tx.prepare(&sql)?;
            for row in &table.values {
                let params: Vec<SqlValue> = row.iter().map(SqlValue::from_json).collect();
                inserted += stmt.execute(params_from_iter(params.iter()))?;
            }
        }
        tx.commit()?;
        info!(
            database = %self.name,
            tables = dataset.tables.len(),
            rows = inserted,
            "imported seed dataset"
        );
        Ok(inserted)
    }

    /// Run a write statement. Returns the change count; constraint failures
    /// come back as [`StoreError::Conflict`].
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(map_constraint)
    }

    /// Run a read statement and collect every row, in engine return order.
    ///
    /// Under a profile with `leading_column_metadata`, a non-empty result
    /// gains a synthetic first row describing the columns.
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|column| column.to_string())
            .collect();
        let mut raw = stmt.query(params_from_iter(params.iter()))?;
        let mut rows: Vec<Row> = Vec::new();
        while let Some(r) = raw.next()? {
            let mut row = Row::new();
            for (index, column) in columns.iter().enumerate() {
                row.insert(column.clone(), r.get::<_, SqlValue>(index)?);
            }
            rows.push(row);
        }
        if self.profile.leading_column_metadata && !rows.is_empty() {
            rows.insert(0, Self::column_metadata_row(&columns));
        }
        Ok(rows)
    }

    /// True when `table` exists in this database.
    pub fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Write the current contents to the snapshot file.
    ///
    /// Only meaningful for ephemeral databases; durable ones report
    /// [`StoreError::NotPersistent`].
    pub fn persist(&self) -> Result<(), StoreError> {
        let path = self
            .snapshot_path
            .as_ref()
            .ok_or_else(|| StoreError::NotPersistent(self.name.clone()))?;
        let conn = self.lock()?;
        let mut target = Connection::open(path)?;
        let backup = Backup::new(&conn, &mut target)?;
        backup.run_to_completion(64, Duration::from_millis(5), None)?;
        debug!(database = %self.name, path = %path.display(), "persisted snapshot");
        Ok(())
    }

    fn configure(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    fn restore_snapshot(conn: &mut Connection, path: &Path) -> Result<(), StoreError> {
        let source = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let backup = Backup::new(&source, conn)?;
        backup.run_to_completion(64, Duration::from_millis(5), None)?;
        Ok(())
    }

    fn column_metadata_row(columns: &[String]) -> Row {
        let mut row = Row::new();
        row.insert(
            "columns".to_string(),
            SqlValue::Text(serde_json::to_string(columns).unwrap_or_default()),
        );
        row
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

fn map_constraint(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return StoreError::Conflict(e.to_string());
        }
    }
    StoreError::Database(e)
}
