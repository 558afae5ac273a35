use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Context;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OpenFlags};
use serde_json::Value;

use super::query::{Condition, Filter, FindOptions, Projection};
use super::JobStore;
use crate::errors::StoreError;

/// SQLite VM instructions between deadline checks.
const PROGRESS_OPS: i32 = 1_000;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Document store backed by SQLite: one row per JSON document, grouped by collection.
#[derive(Clone)]
pub struct SqliteJobStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoreStats {
    pub collection: String,
    pub documents: u64,
    pub first_inserted_at: Option<String>,
    pub last_inserted_at: Option<String>,
}

impl SqliteJobStore {
    pub fn open(path: &Path, collection: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_connection(conn, collection)
    }

    /// Opens an existing database without creating it.
    pub fn open_read_only(path: &Path, collection: &str) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_connection(conn, collection)
    }

    pub fn memory(collection: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::from_connection(conn, collection)
    }

    fn from_connection(conn: Connection, collection: &str) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(super::schema::DDL)?;
        Ok(())
    }

    pub fn insert_documents(&self, docs: &[Value]) -> anyhow::Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let inserted_at = chrono::Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents(collection, doc_json, inserted_at) VALUES (?1, ?2, ?3)",
            )?;
            for doc in docs {
                if !doc.is_object() {
                    anyhow::bail!("documents must be JSON objects, got: {}", doc);
                }
                stmt.execute(params![self.collection, serde_json::to_string(doc)?, inserted_at])?;
            }
        }
        tx.commit()?;
        tracing::info!(event = "documents_inserted", collection = %self.collection, count = docs.len());
        Ok(docs.len())
    }

    /// Imports a JSON-lines file, or a file holding one JSON array of documents.
    pub fn import_file(&self, path: &Path) -> anyhow::Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let docs: Vec<Value> = if raw.trim_start().starts_with('[') {
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse JSON array in {}", path.display()))?
        } else {
            let mut docs = Vec::new();
            for (i, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let doc = serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid JSON", path.display(), i + 1))?;
                docs.push(doc);
            }
            docs
        };

        self.insert_documents(&docs)
    }

    pub fn stats(&self) -> anyhow::Result<StoreStats> {
        let conn = self.lock()?;
        let (documents, first, last) = conn.query_row(
            "SELECT count(*), min(inserted_at), max(inserted_at) FROM documents WHERE collection = ?1",
            params![self.collection],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )?;
        Ok(StoreStats {
            collection: self.collection.clone(),
            documents: documents as u64,
            first_inserted_at: first,
            last_inserted_at: last,
        })
    }
}

impl JobStore for SqliteJobStore {
    fn find(
        &self,
        filter: &Filter,
        projection: &Projection,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        let (sql, binds) = build_select(&self.collection, filter, options.limit)?;
        let conn = self.lock()?;

        let timed = !options.max_time.is_zero();
        if timed {
            let deadline = Instant::now() + options.max_time;
            conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
        }
        let raw = select_docs(&conn, &sql, &binds);
        if timed {
            conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);
        }

        let raw = raw.map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::OperationInterrupted =>
            {
                tracing::warn!(event = "store_timeout", max_time_ms = options.max_time.as_millis() as u64);
                StoreError::Timeout(options.max_time)
            }
            e => StoreError::Query(e),
        })?;

        raw.iter()
            .map(|s| {
                let doc: Value = serde_json::from_str(s)?;
                Ok(projection.apply(&doc))
            })
            .collect()
    }
}

fn select_docs(conn: &Connection, sql: &str, binds: &[SqlValue]) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(binds.iter()), |row| {
        row.get::<_, String>(0)
    })?;
    rows.collect()
}

fn build_select(
    collection: &str,
    filter: &Filter,
    limit: Option<u32>,
) -> Result<(String, Vec<SqlValue>), StoreError> {
    let mut sql = String::from("SELECT doc_json FROM documents WHERE collection = ?");
    let mut binds = vec![SqlValue::Text(collection.to_string())];

    for (path, cond) in filter.conditions() {
        let json_path = json_path(path)?;
        match cond {
            Condition::Eq(Value::Null) => {
                sql.push_str(" AND json_extract(doc_json, ?) IS NULL");
                binds.push(SqlValue::Text(json_path));
            }
            Condition::Eq(v) => {
                sql.push_str(" AND json_extract(doc_json, ?) = ?");
                binds.push(SqlValue::Text(json_path));
                binds.push(sql_value(v));
            }
            Condition::In(values) if values.is_empty() => sql.push_str(" AND 0"),
            Condition::In(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!(" AND json_extract(doc_json, ?) IN ({placeholders})"));
                binds.push(SqlValue::Text(json_path));
                binds.extend(values.iter().map(sql_value));
            }
        }
    }

    sql.push_str(" ORDER BY id");
    if let Some(n) = limit {
        sql.push_str(" LIMIT ?");
        binds.push(SqlValue::Integer(i64::from(n)));
    }
    Ok((sql, binds))
}

/// `modelConfig.costConfig` → `$."modelConfig"."costConfig"`.
fn json_path(path: &str) -> Result<String, StoreError> {
    let mut out = String::from("$");
    for seg in path.split('.') {
        if seg.is_empty() || seg.contains('"') {
            return Err(StoreError::InvalidQuery(format!("bad field path '{path}'")));
        }
        out.push_str(&format!(".\"{seg}\""));
    }
    Ok(out)
}

fn sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
