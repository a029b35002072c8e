// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ids::*;

pub const LIST_ROUTE: &str = "/job-tracker";
pub const DETAIL_ROUTE_PREFIX: &str = "/job-description/";
pub const MISSING_DATE_SENTINEL: &str = "N/A";

/// Status values the creation form offers. Stored statuses are open-ended.
pub const STATUS_VOCABULARY: [&str; 4] = ["Applied", "Interviewed", "Offered", "Rejected"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadField {
    Data,
    Position,
    Company,
    Status,
    ApplicationDate,
    InterviewDate,
    Country,
    Expectation,
    Description,
}

impl PayloadField {
    pub const STORED: [Self; 8] = [
        Self::Position,
        Self::Company,
        Self::Status,
        Self::ApplicationDate,
        Self::InterviewDate,
        Self::Country,
        Self::Expectation,
        Self::Description,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Position => "position",
            Self::Company => "company",
            Self::Status => "status",
            Self::ApplicationDate => "applicationDate",
            Self::InterviewDate => "interviewDate",
            Self::Country => "country",
            Self::Expectation => "expectation",
            Self::Description => "description",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "data" => Some(Self::Data),
            "position" => Some(Self::Position),
            "company" => Some(Self::Company),
            "status" => Some(Self::Status),
            "applicationDate" => Some(Self::ApplicationDate),
            "interviewDate" => Some(Self::InterviewDate),
            "country" => Some(Self::Country),
            "expectation" => Some(Self::Expectation),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

/// A stored row before normalization. `payload` is whatever the store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: JobId,
    pub owner_id: UserId,
    pub payload: serde_json::Value,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: JobId,
    pub position: String,
    pub company: String,
    pub status: String,
    pub application_date: Date,
    pub interview_date: Option<Date>,
    pub country: String,
    pub expectation: String,
    pub description: String,
    pub saved_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateStyle {
    #[default]
    Iso,
    Us,
    Eu,
}

impl DateStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iso => "iso",
            Self::Us => "us",
            Self::Eu => "eu",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "iso" => Some(Self::Iso),
            "us" => Some(Self::Us),
            "eu" => Some(Self::Eu),
            _ => None,
        }
    }

    pub fn format_date(self, date: Date) -> String {
        let formatted = match self {
            Self::Iso => date.format(&format_description!("[year]-[month]-[day]")),
            Self::Us => date.format(&format_description!("[month]/[day]/[year]")),
            Self::Eu => date.format(&format_description!("[day]/[month]/[year]")),
        };
        formatted.unwrap_or_else(|_| date.to_string())
    }

    pub fn format_timestamp(self, value: OffsetDateTime) -> String {
        let time = value
            .format(&format_description!("[hour]:[minute]"))
            .unwrap_or_default();
        format!("{} at {time}", self.format_date(value.date()))
    }
}

/// Navigation targets. `JobDescription` keeps the raw path segment; the
/// detail view decides whether it names a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    JobTracker,
    JobDescription(String),
}

impl Route {
    pub fn for_job(id: JobId) -> Self {
        Self::JobDescription(id.to_string())
    }

    pub fn path(&self) -> String {
        match self {
            Self::JobTracker => LIST_ROUTE.to_owned(),
            Self::JobDescription(job_id) => format!("{DETAIL_ROUTE_PREFIX}{job_id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Some(Self::JobTracker);
        }
        if trimmed.trim_end_matches('/') == LIST_ROUTE {
            return Some(Self::JobTracker);
        }

        let job_id = trimmed.strip_prefix(DETAIL_ROUTE_PREFIX)?;
        let job_id = job_id.strip_suffix('/').unwrap_or(job_id);
        if job_id.is_empty() || job_id.contains('/') {
            return None;
        }
        Some(Self::JobDescription(job_id.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Form,
}
