//! # SQLite Record Store
//!
//! A [`RecordStore`] over a SQLite database with a small fixed pool of
//! connections. Every connection registers the `BIRTH_YEAR` scalar
//! function from the configured [`BirthYearRule`], so SQL derives birth
//! years through the same code as the rest of the crate.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OpenFlags};

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::value::{Params, RowSet, SqlValue};
use super::{RecordStore, StoreSession};
use crate::engine::birth_year::{BirthYearRule, BIRTH_YEAR_FUNCTION};
use crate::engine::columns;
use crate::observability::Logger;

/// Pooled SQLite store
pub struct SqliteStore {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
    size: usize,
    acquire_timeout: Duration,
}

impl SqliteStore {
    /// Open the configured database. File databases are opened read-only.
    pub fn open(config: &StoreConfig, rule: BirthYearRule) -> StoreResult<Self> {
        let size = if config.is_in_memory() {
            1
        } else {
            config.pool_size.max(1)
        };

        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(open_connection(config, rule)?);
        }

        Logger::info(
            "STORE_OPENED",
            &[("path", &config.path), ("pool_size", &size.to_string())],
        );

        Ok(Self {
            idle: Mutex::new(connections),
            available: Condvar::new(),
            size,
            acquire_timeout: Duration::from_millis(config.acquire_timeout_ms),
        })
    }

    /// Writable single-connection in-memory store
    pub fn open_in_memory(rule: BirthYearRule) -> StoreResult<Self> {
        Self::open(&StoreConfig::in_memory(), rule)
    }

    /// Run `f` against a pooled connection. Used to load fixtures into
    /// in-memory stores; the engine itself only reads.
    pub fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let session = self.checkout()?;
        f(session.connection()?).map_err(StoreError::from)
    }

    /// Total number of pooled connections
    pub fn pool_size(&self) -> usize {
        self.size
    }

    /// Connections currently not checked out
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn checkout(&self) -> StoreResult<PooledSession<'_>> {
        let deadline = Instant::now() + self.acquire_timeout;
        let mut idle = self.idle.lock().map_err(|_| pool_poisoned())?;

        loop {
            if let Some(conn) = idle.pop() {
                return Ok(PooledSession {
                    store: self,
                    conn: Some(conn),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StoreError::PoolExhausted(whole_millis(self.acquire_timeout)));
            }

            let (guard, _) = self
                .available
                .wait_timeout(idle, deadline - now)
                .map_err(|_| pool_poisoned())?;
            idle = guard;
        }
    }

    fn release(&self, conn: Connection) {
        match self.idle.lock() {
            Ok(mut idle) => {
                idle.push(conn);
                self.available.notify_one();
            }
            Err(_) => Logger::warn("STORE_RELEASE_FAILED", &[("reason", "pool lock poisoned")]),
        }
    }
}

impl RecordStore for SqliteStore {
    fn acquire(&self) -> StoreResult<Box<dyn StoreSession + '_>> {
        Ok(Box::new(self.checkout()?))
    }
}

/// A checked-out connection, returned to the pool on drop
pub struct PooledSession<'a> {
    store: &'a SqliteStore,
    conn: Option<Connection>,
}

impl PooledSession<'_> {
    fn connection(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::Connection("session already released".to_string()))
    }
}

impl StoreSession for PooledSession<'_> {
    fn query(&mut self, sql: &str, params: &Params) -> StoreResult<RowSet> {
        run_query(self.connection()?, sql, params)
    }
}

impl Drop for PooledSession<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.store.release(conn);
        }
    }
}

/// DDL for the admissions table as the engine reads it
pub fn admissions_schema(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            {name} TEXT,
            {region} TEXT,
            {birth} TEXT,
            {sex} TEXT,
            {diagnosis} TEXT,
            {center} TEXT,
            {admission} TEXT,
            {contact_end} TEXT,
            {stay} INTEGER
        )",
        table = table,
        name = columns::NAME,
        region = columns::REGION,
        birth = columns::BIRTH_DATE,
        sex = columns::SEX,
        diagnosis = columns::DIAGNOSIS,
        center = columns::CENTER,
        admission = columns::ADMISSION_DATE,
        contact_end = columns::CONTACT_END_DATE,
        stay = columns::LENGTH_OF_STAY,
    )
}

fn open_connection(config: &StoreConfig, rule: BirthYearRule) -> StoreResult<Connection> {
    let conn = if config.is_in_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }
    .map_err(|e| StoreError::Connection(format!("{}: {}", config.path, e)))?;

    register_birth_year(&conn, rule)
        .map_err(|e| StoreError::Connection(format!("register {}: {}", BIRTH_YEAR_FUNCTION, e)))?;

    Ok(conn)
}

fn register_birth_year(conn: &Connection, rule: BirthYearRule) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        BIRTH_YEAR_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| {
            let year = match ctx.get_raw(0) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .ok()
                    .and_then(|raw| rule.normalize(raw)),
                _ => None,
            };
            Ok(year.map(i64::from))
        },
    )
}

fn run_query(conn: &Connection, sql: &str, params: &Params) -> StoreResult<RowSet> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let names: Vec<String> = params.keys().map(|k| format!(":{}", k)).collect();
    let bound: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .zip(params.values())
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    let mut rows = stmt.query(bound.as_slice())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(from_value_ref(row.get_ref(idx)?));
        }
        out.push(values);
    }

    Ok(RowSet::new(columns, out))
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::from(*i),
            SqlValue::Real(f) => ToSqlOutput::from(*f),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn pool_poisoned() -> StoreError {
    StoreError::Connection("connection pool lock poisoned".to_string())
}
