// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{ApplicationRecord, JobId, PayloadField, RawRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldProblem {
    #[error("is missing")]
    Missing,
    #[error("is not {expected}")]
    WrongType { expected: &'static str },
    #[error("has invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record {record_id}: field `{}` {problem}", .field.as_str())]
pub struct NormalizationError {
    pub record_id: JobId,
    pub field: PayloadField,
    pub problem: FieldProblem,
}

/// Result of normalizing a whole fetch. Rejected records never reach the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    pub records: Vec<ApplicationRecord>,
    pub rejected: Vec<NormalizationError>,
}

pub fn normalize(raw: &RawRecord) -> Result<ApplicationRecord, NormalizationError> {
    let fields = raw.payload.as_object().ok_or(NormalizationError {
        record_id: raw.id,
        field: PayloadField::Data,
        problem: FieldProblem::WrongType {
            expected: "an object",
        },
    })?;
    let reader = PayloadReader {
        record_id: raw.id,
        fields,
    };

    Ok(ApplicationRecord {
        id: raw.id,
        position: reader.required_text(PayloadField::Position)?,
        company: reader.required_text(PayloadField::Company)?,
        status: reader.required_text(PayloadField::Status)?,
        application_date: reader.required_date(PayloadField::ApplicationDate)?,
        interview_date: reader.optional_date(PayloadField::InterviewDate)?,
        country: reader.required_text(PayloadField::Country)?,
        expectation: reader.required_text(PayloadField::Expectation)?,
        description: reader.required_text(PayloadField::Description)?,
        saved_at: raw.created_at,
    })
}

pub fn normalize_all<'a, I>(raws: I) -> Normalized
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut normalized = Normalized::default();
    for raw in raws {
        match normalize(raw) {
            Ok(record) => normalized.records.push(record),
            Err(error) => normalized.rejected.push(error),
        }
    }
    normalized
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only its date.
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    if let Ok(date) = Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .map(|value| value.date())
}

struct PayloadReader<'a> {
    record_id: JobId,
    fields: &'a Map<String, Value>,
}

impl PayloadReader<'_> {
    fn error(&self, field: PayloadField, problem: FieldProblem) -> NormalizationError {
        NormalizationError {
            record_id: self.record_id,
            field,
            problem,
        }
    }

    fn required_text(&self, field: PayloadField) -> Result<String, NormalizationError> {
        match self.fields.get(field.as_str()) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Null) | None => Err(self.error(field, FieldProblem::Missing)),
            Some(_) => Err(self.error(field, FieldProblem::WrongType { expected: "a string" })),
        }
    }

    fn required_date(&self, field: PayloadField) -> Result<Date, NormalizationError> {
        let raw = self.required_text(field)?;
        parse_iso_date(&raw).ok_or_else(|| self.error(field, FieldProblem::InvalidDate(raw)))
    }

    fn optional_date(&self, field: PayloadField) -> Result<Option<Date>, NormalizationError> {
        match self.fields.get(field.as_str()) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
            Some(Value::String(raw)) => parse_iso_date(raw)
                .map(Some)
                .ok_or_else(|| self.error(field, FieldProblem::InvalidDate(raw.clone()))),
            Some(_) => Err(self.error(field, FieldProblem::WrongType { expected: "a string" })),
        }
    }
}
