// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Map, Value};
use time::Date;
use time::macros::format_description;

use crate::{PayloadField, STATUS_VOCABULARY, parse_iso_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Position,
    Company,
    Status,
    ApplicationDate,
    InterviewDate,
    Country,
    Expectation,
    Description,
}

impl FormField {
    pub const ALL: [Self; 8] = [
        Self::Position,
        Self::Company,
        Self::Status,
        Self::ApplicationDate,
        Self::InterviewDate,
        Self::Country,
        Self::Expectation,
        Self::Description,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Company => "Company",
            Self::Status => "Status",
            Self::ApplicationDate => "Application date",
            Self::InterviewDate => "Interview date",
            Self::Country => "Country",
            Self::Expectation => "Expectation",
            Self::Description => "Description",
        }
    }

    pub const fn payload_field(self) -> PayloadField {
        match self {
            Self::Position => PayloadField::Position,
            Self::Company => PayloadField::Company,
            Self::Status => PayloadField::Status,
            Self::ApplicationDate => PayloadField::ApplicationDate,
            Self::InterviewDate => PayloadField::InterviewDate,
            Self::Country => PayloadField::Country,
            Self::Expectation => PayloadField::Expectation,
            Self::Description => PayloadField::Description,
        }
    }

    /// Status is a choice, not free text.
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::Status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", .field.label())]
pub struct FormError {
    pub field: FormField,
    pub message: String,
}

/// Raw text as typed into the creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFormInput {
    pub position: String,
    pub company: String,
    pub status: String,
    pub application_date: String,
    pub interview_date: String,
    pub country: String,
    pub expectation: String,
    pub description: String,
}

impl ApplicationFormInput {
    pub fn blank() -> Self {
        Self {
            position: String::new(),
            company: String::new(),
            status: STATUS_VOCABULARY[0].to_owned(),
            application_date: String::new(),
            interview_date: String::new(),
            country: String::new(),
            expectation: String::new(),
            description: String::new(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Position => &self.position,
            FormField::Company => &self.company,
            FormField::Status => &self.status,
            FormField::ApplicationDate => &self.application_date,
            FormField::InterviewDate => &self.interview_date,
            FormField::Country => &self.country,
            FormField::Expectation => &self.expectation,
            FormField::Description => &self.description,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Position => &mut self.position,
            FormField::Company => &mut self.company,
            FormField::Status => &mut self.status,
            FormField::ApplicationDate => &mut self.application_date,
            FormField::InterviewDate => &mut self.interview_date,
            FormField::Country => &mut self.country,
            FormField::Expectation => &mut self.expectation,
            FormField::Description => &mut self.description,
        }
    }

    /// Steps the status choice forward (`delta > 0`) or back through the
    /// vocabulary, wrapping at either end.
    pub fn cycle_status(&mut self, delta: isize) {
        let len = STATUS_VOCABULARY.len() as isize;
        let current = STATUS_VOCABULARY
            .iter()
            .position(|status| *status == self.status)
            .map_or(-1, |index| index as isize);
        let next = if current < 0 {
            0
        } else {
            (current + delta).rem_euclid(len) as usize
        };
        self.status = STATUS_VOCABULARY[next].to_owned();
    }

    pub fn validate(&self) -> Result<(), FormError> {
        self.checked_dates().map(|_| ())
    }

    /// Validated payload in the store's JSON shape. Dates are written back
    /// as `YYYY-MM-DD`; a blank interview date is left out.
    pub fn to_payload(&self) -> Result<Value, FormError> {
        let (application_date, interview_date) = self.checked_dates()?;

        let mut payload = Map::new();
        for field in FormField::ALL {
            let key = field.payload_field().as_str().to_owned();
            let value = match field {
                FormField::ApplicationDate => Some(format_iso(application_date)),
                FormField::InterviewDate => interview_date.map(format_iso),
                _ => Some(self.value(field).trim().to_owned()),
            };
            if let Some(value) = value {
                payload.insert(key, Value::String(value));
            }
        }
        Ok(Value::Object(payload))
    }

    fn checked_dates(&self) -> Result<(Date, Option<Date>), FormError> {
        if !STATUS_VOCABULARY.contains(&self.status.as_str()) {
            return Err(FormError {
                field: FormField::Status,
                message: format!("choose one of {}", STATUS_VOCABULARY.join(", ")),
            });
        }

        let application_raw = self.application_date.trim();
        if application_raw.is_empty() {
            return Err(FormError {
                field: FormField::ApplicationDate,
                message: "required -- enter a date as YYYY-MM-DD".to_owned(),
            });
        }
        let application_date = parse_iso_date(application_raw).ok_or_else(|| FormError {
            field: FormField::ApplicationDate,
            message: format!("{application_raw:?} is not a date -- use YYYY-MM-DD"),
        })?;

        let interview_raw = self.interview_date.trim();
        let interview_date = if interview_raw.is_empty() {
            None
        } else {
            Some(parse_iso_date(interview_raw).ok_or_else(|| FormError {
                field: FormField::InterviewDate,
                message: format!("{interview_raw:?} is not a date -- use YYYY-MM-DD or leave blank"),
            })?)
        };

        Ok((application_date, interview_date))
    }
}

fn format_iso(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}
