//! # Run History
//!
//! Every `run` can be recorded in a SQLite file: one row per run with its
//! counts and the full JSON report.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use crate::error::Result;
use crate::testing::{RunReport, Tally};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub id: i64,
    pub recorded_at: i64,
    pub base_url: String,
    #[serde(flatten)]
    pub tally: Tally,
    pub duration_ms: u64,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS runs (
         id INTEGER PRIMARY KEY AUTOINCREMENT,
         recorded_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
         base_url TEXT NOT NULL,
         total INTEGER NOT NULL,
         passed INTEGER NOT NULL,
         failed INTEGER NOT NULL,
         errored INTEGER NOT NULL,
         duration_ms INTEGER NOT NULL,
         report_json TEXT NOT NULL
       );",
    )?;
    Ok(())
}

/// Store a finished run and return its id.
pub fn record_run(conn: &Connection, base_url: &str, report: &RunReport) -> Result<i64> {
    let report_json = serde_json::to_string(report)?;
    conn.execute(
        "INSERT INTO runs (base_url, total, passed, failed, errored, duration_ms, report_json)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            base_url,
            to_sql_int(report.tally.total),
            to_sql_int(report.tally.passed),
            to_sql_int(report.tally.failed),
            to_sql_int(report.tally.errored),
            i64::try_from(report.duration_ms).unwrap_or(i64::MAX),
            report_json,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent runs first.
pub fn recent_runs(conn: &Connection, limit: usize) -> Result<Vec<RunRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, recorded_at, base_url, total, passed, failed, errored, duration_ms
       FROM runs ORDER BY id DESC LIMIT ?1;",
    )?;
    let records = stmt
        .query_map(params![to_sql_int(limit)], run_record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn load_report(conn: &Connection, id: i64) -> Result<Option<RunReport>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT report_json FROM runs WHERE id = ?1 LIMIT 1;",
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn run_record_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        recorded_at: row.get(1)?,
        base_url: row.get(2)?,
        tally: Tally {
            total: from_sql_int(row.get(3)?),
            passed: from_sql_int(row.get(4)?),
            failed: from_sql_int(row.get(5)?),
            errored: from_sql_int(row.get(6)?),
        },
        duration_ms: u64::try_from(row.get::<_, i64>(7)?).unwrap_or_default(),
    })
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}
