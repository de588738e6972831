//! Attendance models: the per-day mark for one member.

use std::fmt;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Canonical textual form of an attendance day.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored attendance state. "Leave" is not representable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

/// A calendar day (not a timestamp), always rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttendanceDate(NaiveDate);

impl AttendanceDate {
    /// Parse a strictly canonical `YYYY-MM-DD` string.
    ///
    /// Non-padded forms such as `2024-3-1` are rejected so that every stored
    /// key compares equal byte-for-byte.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Date is required".to_string()));
        }
        let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
            AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
        })?;
        if date.format(DATE_FORMAT).to_string() != trimmed {
            return Err(AppError::Validation(format!(
                "Invalid date '{}', expected YYYY-MM-DD",
                raw
            )));
        }
        Ok(Self(date))
    }

    /// The current calendar day in the given timezone.
    pub fn today_in(tz: Tz) -> Self {
        Self(Utc::now().with_timezone(&tz).date_naive())
    }
}

impl fmt::Display for AttendanceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// One member's mark for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub member_id: String,
    /// Name at the time of marking; kept after renames and deletions
    pub member_name: String,
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Attendance row joined with the member's current profile for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    /// Member's session, or "N/A" once the member is gone
    pub session: String,
    pub phone_number: String,
    pub profile_photo: String,
}

/// System-authored absence produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAbsence {
    pub member_id: String,
    pub member_name: String,
    pub date: AttendanceDate,
}

/// Request body for marking attendance by hand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for correcting an existing record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for attendance listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    #[serde(default)]
    pub date: Option<String>,
}

/// Request body for the on-demand absence run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoAbsentRequest {
    #[serde(default)]
    pub date: Option<String>,
}

/// Daily head counts for the attendance report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub date: String,
    pub total_members: i64,
    pub present: i64,
    pub absent: i64,
    pub unmarked: i64,
}
