// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use jobtrack_app::{JobId, RawRecord, STATUS_VOCABULARY, UserId};
use serde_json::{Value, json};
use std::path::PathBuf;
use time::macros::{date, datetime};
use time::{Date, Duration, OffsetDateTime};

const POSITIONS: [&str; 14] = [
    "Frontend Developer",
    "Backend Developer",
    "Fullstack Developer",
    "Data Engineer",
    "Site Reliability Engineer",
    "Mobile Developer",
    "Platform Engineer",
    "Security Analyst",
    "QA Automation Engineer",
    "Machine Learning Engineer",
    "Engineering Manager",
    "Technical Writer",
    "Product Designer",
    "Embedded Developer",
];

const COMPANY_PREFIXES: [&str; 12] = [
    "Northwind",
    "Contoso",
    "Fabrikam",
    "Tailspin",
    "Woodgrove",
    "Litware",
    "Proseware",
    "Adatum",
    "Lucerne",
    "Wingtip",
    "Alpine",
    "Coho",
];
const COMPANY_SUFFIXES: [&str; 6] = ["Labs", "Ltd", "Corp", "Systems", "Group", "Studio"];

const COUNTRIES: [&str; 10] = [
    "United States",
    "Canada",
    "Germany",
    "Ireland",
    "Netherlands",
    "Portugal",
    "Spain",
    "Sweden",
    "United Kingdom",
    "Japan",
];

const WORK_TYPES: [&str; 3] = ["Remote", "Hybrid", "On-site"];

/// Applications are spread over the year before this date.
const REFERENCE_DATE: Date = date!(2025-08-01);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeApplication {
    pub position: String,
    pub company: String,
    pub status: String,
    pub application_date: Date,
    pub interview_date: Option<Date>,
    pub country: String,
    pub expectation: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ApplicationFaker {
    rng: DeterministicRng,
}

impl ApplicationFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn application(&mut self) -> FakeApplication {
        let position = self.pick(&POSITIONS).to_owned();
        let company = format!(
            "{} {}",
            self.pick(&COMPANY_PREFIXES),
            self.pick(&COMPANY_SUFFIXES)
        );
        let status = self.pick(&STATUS_VOCABULARY).to_owned();
        let application_date = self.date_before_reference(365);
        // Anything past "Applied" has been through at least one interview.
        let interview_date = (status != "Applied")
            .then(|| offset_date(application_date, 3 + self.rng.int_n(25) as i64));
        let expectation = if self.rng.bool() {
            self.pick(&WORK_TYPES).to_owned()
        } else {
            format!(
                "{}, {}k",
                self.pick(&WORK_TYPES),
                60 + 5 * self.rng.int_n(12)
            )
        };

        FakeApplication {
            description: format!("{position} role at {company}."),
            position,
            company,
            status,
            application_date,
            interview_date,
            country: self.pick(&COUNTRIES).to_owned(),
            expectation,
        }
    }

    pub fn applications(&mut self, count: usize) -> Vec<FakeApplication> {
        (0..count).map(|_| self.application()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn date_before_reference(&mut self, max_days: usize) -> Date {
        offset_date(REFERENCE_DATE, -(self.rng.int_n(max_days) as i64))
    }
}

/// JSON payload in the shape the store keeps. A missing interview date is
/// left out entirely.
pub fn payload_for(application: &FakeApplication) -> Value {
    let mut payload = json!({
        "position": application.position,
        "company": application.company,
        "status": application.status,
        "applicationDate": iso(application.application_date),
        "country": application.country,
        "expectation": application.expectation,
        "description": application.description,
    });
    if let Some(interview_date) = application.interview_date {
        payload["interviewDate"] = Value::String(iso(interview_date));
    }
    payload
}

pub fn raw_record(id: i64, application: &FakeApplication) -> RawRecord {
    RawRecord {
        id: JobId::new(id),
        owner_id: UserId::new(1),
        payload: payload_for(application),
        created_at: fixture_datetime(),
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("jobtrack.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> OffsetDateTime {
    datetime!(2025-07-30 14:00:00 UTC)
}

fn offset_date(base: Date, days: i64) -> Date {
    base.checked_add(Duration::days(days)).unwrap_or(base)
}

fn iso(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
