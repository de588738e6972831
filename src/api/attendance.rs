//! Attendance API endpoints, including the on-demand absence run.

use axum::extract::{Path, State};

use super::extract::{Json, Query};
use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AttendanceDate, AttendanceEntry, AttendanceQuery, AttendanceRecord, AttendanceSummary,
    AutoAbsentRequest, MarkAttendanceRequest, UpdateAttendanceRequest,
};
use crate::reconcile::ReconcileSummary;
use crate::AppState;

/// GET /api/attendance - List attendance, optionally for one `date`.
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<Vec<AttendanceEntry>> {
    let date = match query.date.as_deref() {
        Some(raw) if !raw.is_empty() => Some(AttendanceDate::parse(raw)?),
        _ => None,
    };
    success(state.repo.list_attendance(date.as_ref()).await?)
}

/// POST /api/attendance - Mark a member present or absent for a day.
///
/// Replaces the status of an existing record for the same day.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(request): Json<MarkAttendanceRequest>,
) -> ApiResult<AttendanceRecord> {
    if request.member_id.trim().is_empty() {
        return Err(AppError::Validation("Member ID is required".to_string()));
    }
    let date = AttendanceDate::parse(&request.date)?;

    let member = state
        .repo
        .get_member(&request.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", request.member_id)))?;

    let record = state
        .repo
        .mark_attendance(&member, &date, request.status, request.notes)
        .await?;
    success(record)
}

/// GET /api/attendance/summary - Present/absent/unmarked counts for a day.
///
/// Defaults to today in the configured timezone.
pub async fn attendance_summary(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<AttendanceSummary> {
    let date = match query.date.as_deref() {
        Some(raw) if !raw.is_empty() => AttendanceDate::parse(raw)?,
        _ => AttendanceDate::today_in(state.config.timezone),
    };
    success(state.repo.attendance_summary(&date).await?)
}

/// POST /api/attendance/auto-absent - Mark every unmarked member absent for `date`.
///
/// `insertedCount = 0` means the day was already reconciled.
pub async fn auto_absent(
    State(state): State<AppState>,
    Json(request): Json<AutoAbsentRequest>,
) -> ApiResult<ReconcileSummary> {
    let date = request.date.unwrap_or_default();
    match state.reconciler.reconcile(&date).await {
        Ok(summary) => success(summary),
        Err(e) => {
            tracing::warn!(date = %date, "On-demand absence run failed: {}", e);
            Err(e)
        }
    }
}

/// GET /api/attendance/:id - Get a single record.
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AttendanceRecord> {
    match state.repo.get_attendance(&id).await? {
        Some(record) => success(record),
        None => Err(AppError::NotFound(format!(
            "Attendance record {} not found",
            id
        ))),
    }
}

/// PUT /api/attendance/:id - Correct status and/or notes.
pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAttendanceRequest>,
) -> ApiResult<AttendanceRecord> {
    success(state.repo.update_attendance(&id, &request).await?)
}

/// DELETE /api/attendance/:id - Delete a record.
pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_attendance(&id).await?;
    success(())
}
