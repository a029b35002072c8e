// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::Date;

use crate::{ApplicationRecord, DateStyle, MISSING_DATE_SENTINEL};

/// Priority order the status column shipped with. These values do not match
/// the vocabulary records actually use; override via `[grid].status_priority`.
pub const LEGACY_STATUS_PRIORITY: [&str; 3] = ["single", "complicated", "relationship"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKey {
    Position,
    Company,
    Status,
    ApplicationDate,
    InterviewDate,
    Country,
    Expectation,
}

impl ColumnKey {
    pub const ALL: [Self; 7] = [
        Self::Position,
        Self::Company,
        Self::Status,
        Self::ApplicationDate,
        Self::InterviewDate,
        Self::Country,
        Self::Expectation,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Company => "company",
            Self::Status => "status",
            Self::ApplicationDate => "applicationDate",
            Self::InterviewDate => "interviewDate",
            Self::Country => "country",
            Self::Expectation => "expectation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "position" => Some(Self::Position),
            "company" => Some(Self::Company),
            "status" => Some(Self::Status),
            "applicationDate" => Some(Self::ApplicationDate),
            "interviewDate" => Some(Self::InterviewDate),
            "country" => Some(Self::Country),
            "expectation" => Some(Self::Expectation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Date(Date),
    OptionalDate(Option<Date>),
}

impl SortValue<'_> {
    pub fn cmp_natural(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left
                .to_ascii_lowercase()
                .cmp(&right.to_ascii_lowercase()),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (Self::OptionalDate(left), Self::OptionalDate(right)) => left.cmp(right),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomComparator {
    StatusPriority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPriority(Vec<String>);

impl StatusPriority {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(statuses.into_iter().map(Into::into).collect())
    }

    pub fn legacy() -> Self {
        Self::new(LEGACY_STATUS_PRIORITY)
    }

    pub fn statuses(&self) -> &[String] {
        &self.0
    }

    /// Position in the list, or -1 for a status the list does not know.
    pub fn index_of(&self, status: &str) -> i64 {
        self.0
            .iter()
            .position(|known| known == status)
            .map_or(-1, |index| index as i64)
    }

    /// Sign of `index_of(left) - index_of(right)`.
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        (self.index_of(left) - self.index_of(right)).cmp(&0)
    }
}

impl Default for StatusPriority {
    fn default() -> Self {
        Self::legacy()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDefinition {
    pub key: ColumnKey,
    pub label: &'static str,
    pub display: fn(&ApplicationRecord, DateStyle) -> String,
    pub value: fn(&ApplicationRecord) -> SortValue<'_>,
    pub comparator: Option<CustomComparator>,
    pub sortable: bool,
}

const fn column(
    key: ColumnKey,
    label: &'static str,
    display: fn(&ApplicationRecord, DateStyle) -> String,
    value: fn(&ApplicationRecord) -> SortValue<'_>,
) -> ColumnDefinition {
    ColumnDefinition {
        key,
        label,
        display,
        value,
        comparator: None,
        sortable: true,
    }
}

fn standard_columns() -> Vec<ColumnDefinition> {
    vec![
        column(
            ColumnKey::Position,
            "Position",
            |record, _| record.position.clone(),
            |record| SortValue::Text(&record.position),
        ),
        column(
            ColumnKey::Company,
            "Company",
            |record, _| record.company.clone(),
            |record| SortValue::Text(&record.company),
        ),
        ColumnDefinition {
            comparator: Some(CustomComparator::StatusPriority),
            ..column(
                ColumnKey::Status,
                "Status",
                |record, _| record.status.clone(),
                |record| SortValue::Text(&record.status),
            )
        },
        column(
            ColumnKey::ApplicationDate,
            "Applied On",
            |record, style| style.format_date(record.application_date),
            |record| SortValue::Date(record.application_date),
        ),
        column(
            ColumnKey::InterviewDate,
            "Interview",
            |record, style| {
                record.interview_date.map_or_else(
                    || MISSING_DATE_SENTINEL.to_owned(),
                    |date| style.format_date(date),
                )
            },
            |record| SortValue::OptionalDate(record.interview_date),
        ),
        column(
            ColumnKey::Country,
            "Country",
            |record, _| record.country.clone(),
            |record| SortValue::Text(&record.country),
        ),
        column(
            ColumnKey::Expectation,
            "Expectation",
            |record, _| record.expectation.clone(),
            |record| SortValue::Text(&record.expectation),
        ),
    ]
}

/// Built once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    columns: Vec<ColumnDefinition>,
    status_priority: StatusPriority,
}

impl Default for ColumnModel {
    fn default() -> Self {
        Self::new(StatusPriority::legacy())
    }
}

impl ColumnModel {
    pub fn new(status_priority: StatusPriority) -> Self {
        Self {
            columns: standard_columns(),
            status_priority,
        }
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, key: ColumnKey) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn status_priority(&self) -> &StatusPriority {
        &self.status_priority
    }

    /// Ascending comparison for one column. `None` when the column is
    /// unknown or not sortable.
    pub fn compare(
        &self,
        key: ColumnKey,
        left: &ApplicationRecord,
        right: &ApplicationRecord,
    ) -> Option<Ordering> {
        let column = self.get(key).filter(|column| column.sortable)?;
        let order = match column.comparator {
            Some(CustomComparator::StatusPriority) => {
                self.status_priority.compare(&left.status, &right.status)
            }
            None => (column.value)(left).cmp_natural(&(column.value)(right)),
        };
        Some(order)
    }

    pub fn display(&self, key: ColumnKey, record: &ApplicationRecord, style: DateStyle) -> String {
        self.get(key)
            .map(|column| (column.display)(record, style))
            .unwrap_or_default()
    }
}
