//! Gym member model.

use serde::{Deserialize, Serialize};

/// Membership fee state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FeeStatus {
    #[default]
    Pending,
    Paid,
    #[serde(rename = "Advance Paid")]
    AdvancePaid,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "Pending",
            FeeStatus::Paid => "Paid",
            FeeStatus::AdvancePaid => "Advance Paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(FeeStatus::Pending),
            "Paid" => Some(FeeStatus::Paid),
            "Advance Paid" => Some(FeeStatus::AdvancePaid),
            _ => None,
        }
    }
}

/// Training slot a member is assigned to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Morning,
    Evening,
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "Morning",
            Session::Evening => "Evening",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Morning" => Some(Session::Morning),
            "Evening" => Some(Session::Evening),
            _ => None,
        }
    }
}

/// A person enrolled at the gym.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub fee_status: FeeStatus,
    pub session: Session,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub join_date: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Minimal member projection used when reconciling attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub id: String,
    pub name: String,
}

/// Request body for creating a new member.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub fee_status: FeeStatus,
    #[serde(default)]
    pub session: Session,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Request body for updating an existing member. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub fee_status: Option<FeeStatus>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Query parameters accepted by the member list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFilter {
    /// Case-insensitive substring match on name, phone, email and note
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub fee_status: Option<FeeStatus>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; `0` or missing returns every match
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Pagination block returned with member listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_members: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        if limit == 0 {
            return Self {
                current_page: page,
                total_pages: 1,
                total_members: total,
                has_next_page: false,
                has_prev_page: page > 1,
            };
        }
        let total_pages = ((total.max(0) as u64).div_ceil(limit as u64)) as u32;
        Self {
            current_page: page,
            total_pages,
            total_members: total,
            has_next_page: (page as i64)
                .checked_mul(limit as i64)
                .is_some_and(|seen| seen < total),
            has_prev_page: page > 1,
        }
    }
}

/// A page of members.
#[derive(Debug, Clone, Serialize)]
pub struct MemberList {
    pub members: Vec<Member>,
    pub pagination: Pagination,
}

/// Simple head counts for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub fee_pending: i64,
    pub fee_paid: i64,
    pub fee_advance_paid: i64,
    pub morning: i64,
    pub evening: i64,
}
