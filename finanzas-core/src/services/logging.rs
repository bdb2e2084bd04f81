//! Event log - privacy-safe structured events in `logs.duckdb`
//!
//! Only event names, routes, commands, HTTP statuses and error messages are
//! recorded. Tokens, passwords, emails and amounts never reach the log.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::log_migrations::{BOOTSTRAP_MIGRATION, LOG_MIGRATIONS};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unix time in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Millisecond timestamp in the high bits, a process-local sequence below
fn next_id() -> u64 {
    ((now_ms() as u64) << 16) | (SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFFF)
}

/// Which front end produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Embedded,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Embedded => "embedded",
        }
    }
}

/// An event about to be recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    /// CLI command that produced the event
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Route name the event navigates to
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub route: Option<String>,
    pub http_status: Option<i32>,
    pub error_message: Option<String>,
}

impl LogEntry {
    const COLUMNS: &'static str = "id, timestamp, entry_point, app_version, platform, \
         event, command, route, http_status, error_message";

    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            entry_point: row.get(2)?,
            app_version: row.get(3)?,
            platform: row.get(4)?,
            event: row.get(5)?,
            command: row.get(6)?,
            route: row.get(7)?,
            http_status: row.get(8)?,
            error_message: row.get(9)?,
        })
    }
}

/// Size and content summary of the event log
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_entries: u64,
    pub error_count: u64,
    pub database_path: PathBuf,
    pub database_size_bytes: u64,
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open `logs.duckdb` in `app_dir`, creating and migrating it as needed
    pub fn new(
        app_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = app_dir.join("logs.duckdb");
        let service = Self {
            conn: Mutex::new(Connection::open(&db_path)?),
            db_path,
            entry_point,
            app_version: app_version.into(),
        };
        service.migrate()?;
        Ok(service)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;

        // Idempotent, so it always runs before the applied set is read
        conn.execute_batch(BOOTSTRAP_MIGRATION.1)?;

        let applied: Vec<String> = conn
            .prepare("SELECT migration_name FROM sys_migrations")?
            .query_map([], |row| row.get(0))?
            .collect::<duckdb::Result<_>>()?;

        for (name, sql) in LOG_MIGRATIONS {
            if applied.iter().any(|a| a == name) {
                continue;
            }
            if *name != BOOTSTRAP_MIGRATION.0 {
                conn.execute_batch(sql)?;
            }
            conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
        }
        Ok(())
    }

    /// Record an event, stamped with entry point, version and platform
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO sys_logs (id, timestamp, entry_point, app_version, platform, \
             event, command, route, http_status, error_message) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                next_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                std::env::consts::OS,
                &event.event,
                &event.command,
                &event.route,
                event.http_status.map(i32::from),
                &event.error_message,
            ],
        )?;
        Ok(())
    }

    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    fn select(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_logs {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            LogEntry::COLUMNS,
            filter
        );
        let entries = conn
            .prepare(&sql)?
            .query_map([limit as i64], LogEntry::from_row)?
            .collect::<duckdb::Result<_>>()?;
        Ok(entries)
    }

    /// Newest entries first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select("", limit)
    }

    /// Newest failed entries first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select("WHERE error_message IS NOT NULL", limit)
    }

    fn count_where(&self, filter: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM sys_logs {}", filter);
        Ok(self.lock()?.query_row(&sql, [], |row| row.get(0))?)
    }

    pub fn count(&self) -> Result<u64> {
        self.count_where("")
    }

    pub fn stats(&self) -> Result<LogStats> {
        Ok(LogStats {
            total_entries: self.count()?,
            error_count: self.count_where("WHERE error_message IS NOT NULL")?,
            database_path: self.db_path.clone(),
            database_size_bytes: std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0),
        })
    }

    /// Delete entries stamped before `timestamp_ms`
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let deleted = self
            .lock()?
            .execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Delete entries older than `days` days
    pub fn delete_older_than(&self, days: u64) -> Result<u64> {
        self.delete_before(now_ms() - days as i64 * DAY_MS)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
