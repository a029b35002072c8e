// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use jobtrack_app::{JobId, RawRecord, UserId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const APP_NAME: &str = "jobtrack";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("jobs", &["id", "user_id", "data", "created_at"])];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[RequiredIndex {
    name: "idx_jobs_user_created",
    create_sql: "CREATE INDEX IF NOT EXISTS idx_jobs_user_created ON jobs (user_id, created_at);",
}];

struct DemoApplication {
    position: &'static str,
    company: &'static str,
    status: &'static str,
    application_date: &'static str,
    interview_date: Option<&'static str>,
    country: &'static str,
    expectation: &'static str,
    description: &'static str,
    saved_at: &'static str,
}

const DEMO_APPLICATIONS: &[DemoApplication] = &[
    DemoApplication {
        position: "Frontend Developer",
        company: "ABC Corp",
        status: "Applied",
        application_date: "2025-07-21",
        interview_date: None,
        country: "United States",
        expectation: "Remote, $70,000 - $90,000",
        description: "We're looking for a passionate React developer to join our frontend team.",
        saved_at: "2025-07-30T14:00:00Z",
    },
    DemoApplication {
        position: "Backend Developer",
        company: "XYZ Ltd",
        status: "Interviewed",
        application_date: "2025-07-14",
        interview_date: Some("2025-07-28"),
        country: "United States",
        expectation: "Hybrid, $85,000 - $110,000",
        description: "Develop and maintain scalable APIs using Node.js and PostgreSQL.",
        saved_at: "2025-07-29T11:15:00Z",
    },
    DemoApplication {
        position: "Fullstack Developer",
        company: "DevHub",
        status: "Offered",
        application_date: "2025-07-02",
        interview_date: Some("2025-07-16"),
        country: "United States",
        expectation: "On-site, $80,000 - $105,000",
        description: "Build modern web apps using React, Node.js, and MongoDB.",
        saved_at: "2025-07-28T09:45:00Z",
    },
    DemoApplication {
        position: "Site Reliability Engineer",
        company: "Northwind Traders",
        status: "Rejected",
        application_date: "2025-06-30",
        interview_date: Some("2025-07-08"),
        country: "Canada",
        expectation: "Remote, CA$120,000",
        description: "Own the on-call rotation and the Kubernetes platform.",
        saved_at: "2025-07-25T16:20:00Z",
    },
    DemoApplication {
        position: "Data Engineer",
        company: "Contoso",
        status: "Applied",
        application_date: "2025-07-18",
        interview_date: None,
        country: "Ireland",
        expectation: "Hybrid, EUR 75,000",
        description: "Batch and streaming pipelines feeding the analytics warehouse.",
        saved_at: "2025-07-24T08:05:00Z",
    },
    DemoApplication {
        position: "Mobile Developer",
        company: "Fabrikam",
        status: "Interviewed",
        application_date: "2025-07-09",
        interview_date: Some("2025-07-22"),
        country: "Germany",
        expectation: "On-site, EUR 68,000",
        description: "Ship the Kotlin and Swift clients for the booking app.",
        saved_at: "2025-07-23T13:40:00Z",
    },
    DemoApplication {
        position: "Platform Engineer",
        company: "Tailspin Toys",
        status: "Applied",
        application_date: "2025-07-20",
        interview_date: None,
        country: "Netherlands",
        expectation: "Remote",
        description: "Internal developer platform and CI tooling.",
        saved_at: "2025-07-22T10:10:00Z",
    },
    DemoApplication {
        position: "Security Analyst",
        company: "Woodgrove Bank",
        status: "Rejected",
        application_date: "2025-06-24",
        interview_date: None,
        country: "United Kingdom",
        expectation: "Hybrid, GBP 60,000",
        description: "Threat detection and incident response for retail banking.",
        saved_at: "2025-07-21T17:55:00Z",
    },
    DemoApplication {
        position: "Machine Learning Engineer",
        company: "Adventure Works",
        status: "Interviewed",
        application_date: "2025-07-01",
        interview_date: Some("2025-07-19"),
        country: "Spain",
        expectation: "Remote, EUR 70,000",
        description: "Recommendation models and the feature store behind them.",
        saved_at: "2025-07-20T12:30:00Z",
    },
    DemoApplication {
        position: "QA Automation Engineer",
        company: "Litware",
        status: "Applied",
        application_date: "2025-07-15",
        interview_date: None,
        country: "Portugal",
        expectation: "",
        description: "",
        saved_at: "2025-07-19T09:00:00Z",
    },
    DemoApplication {
        position: "Embedded Developer",
        company: "Proseware",
        status: "Offered",
        application_date: "2025-06-20",
        interview_date: Some("2025-07-03"),
        country: "Sweden",
        expectation: "On-site, SEK 650,000",
        description: "Firmware for battery management systems.",
        saved_at: "2025-07-18T15:25:00Z",
    },
    DemoApplication {
        position: "Technical Writer",
        company: "Lucerne Publishing",
        status: "Applied",
        application_date: "2025-07-11",
        interview_date: None,
        country: "Canada",
        expectation: "Part-time, remote",
        description: "API reference and onboarding guides.",
        saved_at: "2025-07-17T11:45:00Z",
    },
];

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

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Every record owned by `user_id`, newest first. Equal timestamps fall
    /// back to the higher id first. Rows whose `created_at` cannot be read are
    /// skipped with a warning instead of failing the listing.
    pub fn list_records(&self, user_id: UserId) -> Result<Vec<RawRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, user_id, data, created_at
                FROM jobs
                WHERE user_id = ?
                ORDER BY julianday(created_at) DESC, id DESC
                ",
            )
            .context("prepare jobs query")?;
        let rows = stmt
            .query_map(params![user_id.get()], StoredRow::from_row)
            .context("query jobs")?;

        let stored = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect jobs")?;
        let mut records = Vec::with_capacity(stored.len());
        for row in stored {
            let id = row.id;
            match row.into_record() {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(job = id, "skipping job with unreadable timestamp: {error:#}");
                }
            }
        }
        tracing::debug!(user = %user_id, count = records.len(), "listed job records");
        Ok(records)
    }

    pub fn get_record(&self, user_id: UserId, job_id: JobId) -> Result<Option<RawRecord>> {
        self.conn
            .query_row(
                "
                SELECT id, user_id, data, created_at
                FROM jobs
                WHERE user_id = ? AND id = ?
                ",
                params![user_id.get(), job_id.get()],
                StoredRow::from_row,
            )
            .optional()
            .with_context(|| format!("load job {job_id}"))?
            .map(StoredRow::into_record)
            .transpose()
    }

    pub fn insert_record(&self, user_id: UserId, payload: &Value) -> Result<JobId> {
        self.insert_record_at(user_id, payload, OffsetDateTime::now_utc())
    }

    pub fn insert_record_at(
        &self,
        user_id: UserId,
        payload: &Value,
        created_at: OffsetDateTime,
    ) -> Result<JobId> {
        if !payload.is_object() {
            bail!("job payload must be a JSON object, got {payload}");
        }
        let data = serde_json::to_string(payload).context("encode job payload")?;
        let created_at = format_timestamp(created_at)?;
        self.conn
            .execute(
                "INSERT INTO jobs (user_id, data, created_at) VALUES (?, ?, ?)",
                params![user_id.get(), data, created_at],
            )
            .context("insert job")?;

        let id = JobId::new(self.conn.last_insert_rowid());
        tracing::info!(user = %user_id, job = %id, "inserted job record");
        Ok(id)
    }

    pub fn count_records(&self, user_id: UserId) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM jobs WHERE user_id = ?",
                params![user_id.get()],
                |row| row.get(0),
            )
            .context("count jobs")?;
        usize::try_from(count).map_err(|_| anyhow!("job count {count} is out of range"))
    }

    /// Sample applications for `--demo`. Returns the number inserted.
    pub fn seed_demo(&self, user_id: UserId) -> Result<usize> {
        for demo in DEMO_APPLICATIONS {
            let mut payload = json!({
                "position": demo.position,
                "company": demo.company,
                "status": demo.status,
                "applicationDate": demo.application_date,
                "country": demo.country,
                "expectation": demo.expectation,
                "description": demo.description,
            });
            if let Some(interview_date) = demo.interview_date {
                payload["interviewDate"] = Value::String(interview_date.to_owned());
            }
            let saved_at = parse_datetime(demo.saved_at)?;
            self.insert_record_at(user_id, &payload, saved_at)
                .with_context(|| format!("seed demo job {}", demo.position))?;
        }
        Ok(DEMO_APPLICATIONS.len())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("JOBTRACK_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set JOBTRACK_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("jobtrack.db"))
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

struct StoredRow {
    id: i64,
    user_id: i64,
    data: String,
    created_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            data: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<RawRecord> {
        let created_at = parse_datetime(&self.created_at)
            .with_context(|| format!("read created_at of job {}", self.id))?;
        Ok(RawRecord {
            id: JobId::new(self.id),
            owner_id: UserId::new(self.user_id),
            payload: decode_payload(&self.data),
            created_at,
        })
    }
}

/// Text that is not JSON stays a string so normalization rejects that one
/// record instead of failing the whole fetch.
fn decode_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
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
                "database is missing required table `{table}`; point [storage].db_path at a jobtrack database"
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
                "table `{table}` is missing required columns: {}; recreate the database or add them",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
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

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = OffsetDateTime::parse(
        raw,
        &format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ) {
        return Ok(value);
    }

    if let Ok(value) = OffsetDateTime::parse(
        raw,
        &format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ) {
        return Ok(value);
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

/// Fixed-width UTC, readable by both `parse_datetime` and SQLite's `julianday`.
fn format_timestamp(value: OffsetDateTime) -> Result<String> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
        ))
        .context("format job timestamp")
}

#[cfg(test)]
mod tests {
    use super::{decode_payload, format_timestamp, parse_datetime};
    use anyhow::Result;
    use serde_json::{Value, json};

    #[test]
    fn payload_text_that_is_not_json_stays_a_string() {
        assert_eq!(decode_payload("{\"position\":\"QA\"}"), json!({"position": "QA"}));
        assert_eq!(decode_payload("{broken"), Value::String("{broken".to_owned()));
    }

    #[test]
    fn stored_timestamps_accept_sqlite_and_rfc3339_forms() -> Result<()> {
        let rfc = parse_datetime("2025-07-30T14:00:00Z")?;
        let sqlite = parse_datetime("2025-07-30 14:00:00")?;
        let offset = parse_datetime("2025-07-30 16:00:00+02:00")?;
        assert_eq!(rfc, sqlite);
        assert_eq!(rfc, offset);
        assert!(parse_datetime("yesterday").is_err());
        Ok(())
    }

    #[test]
    fn written_timestamps_are_fixed_width_utc() -> Result<()> {
        let local = parse_datetime("2025-07-30 16:00:00+02:00")?;
        let formatted = format_timestamp(local)?;
        assert_eq!(formatted, "2025-07-30T14:00:00.000000Z");
        assert_eq!(parse_datetime(&formatted)?, local);
        Ok(())
    }
}
