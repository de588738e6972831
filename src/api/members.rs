//! Member API endpoints.

use axum::extract::{Path, State};

use super::extract::{Json, Query};
use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AttendanceRecord, CreateMemberRequest, Member, MemberFilter, MemberList, MemberStats,
    UpdateMemberRequest,
};
use crate::AppState;

/// GET /api/members - List members with filters and pagination.
pub async fn list_members(
    State(state): State<AppState>,
    Query(filter): Query<MemberFilter>,
) -> ApiResult<MemberList> {
    success(state.repo.list_members(&filter).await?)
}

/// GET /api/members/stats - Head counts for the dashboard.
pub async fn member_stats(State(state): State<AppState>) -> ApiResult<MemberStats> {
    success(state.repo.member_stats().await?)
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Member> {
    match state.repo.get_member(&id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<Member> {
    if request.name.trim().is_empty() || request.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and phone are required".to_string(),
        ));
    }

    success(state.repo.create_member(&request).await?)
}

/// PUT /api/members/:id - Update a member.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<Member> {
    success(state.repo.update_member(&id, &request).await?)
}

/// DELETE /api/members/:id - Delete a member.
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_member(&id).await?;
    success(())
}

/// GET /api/members/:id/attendance - Attendance history of one member.
pub async fn member_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<AttendanceRecord>> {
    success(state.repo.list_member_attendance(&id).await?)
}
