// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ApplicationRecord, JobId};

pub const NOT_FOUND_MESSAGE: &str = "Job not found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Found(ApplicationRecord),
    NotFound,
}

/// Route segments are decimal record ids; anything else names no record.
pub fn parse_job_id(raw: &str) -> Option<JobId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok().map(JobId::new)
}

pub fn resolve(job_id: &str, records: &[ApplicationRecord]) -> Detail {
    let Some(id) = parse_job_id(job_id) else {
        return Detail::NotFound;
    };
    records
        .iter()
        .find(|record| record.id == id)
        .cloned()
        .map_or(Detail::NotFound, Detail::Found)
}
