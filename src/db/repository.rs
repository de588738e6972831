//! Database repository for CRUD operations.
//!
//! Uses prepared statements; uniqueness is left to the schema constraints.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    AttendanceDate, AttendanceEntry, AttendanceRecord, AttendanceStatus, AttendanceSummary,
    CreateMemberRequest, FeeStatus, Member, MemberFilter, MemberList, MemberRef, MemberStats,
    NewAbsence, Pagination, Session, UpdateAttendanceRequest, UpdateMemberRequest,
};
use crate::reconcile::ReconcileStore;

const MEMBER_COLUMNS: &str = "id, name, phone, email, fee_status, session, is_active, note, image, join_date, created_at, updated_at";

/// Largest page size honoured by the member list; larger values are clamped.
pub const MAX_PAGE_LIMIT: u32 = 500;

const ATTENDANCE_COLUMNS: &str =
    "id, member_id, member_name, date, status, notes, created_at, updated_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List members matching a filter, newest first, with pagination.
    pub async fn list_members(&self, filter: &MemberFilter) -> Result<MemberList, AppError> {
        let page = filter.page.filter(|p| *p > 0).unwrap_or(1);
        let limit = filter.limit.unwrap_or(0).min(MAX_PAGE_LIMIT);

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM members", MEMBER_COLUMNS));
        push_member_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id");
        if limit > 0 {
            let offset = (page as i64 - 1)
                .checked_mul(limit as i64)
                .ok_or_else(|| AppError::Validation(format!("Page {} is out of range", page)))?;
            qb.push(" LIMIT ")
                .push_bind(limit as i64)
                .push(" OFFSET ")
                .push_bind(offset);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        let members = rows.iter().map(member_from_row).collect();
        let total = self.count_members(filter).await?;

        Ok(MemberList {
            members,
            pagination: Pagination::new(page, limit, total),
        })
    }

    /// Count members matching a filter. Paging fields are ignored.
    pub async fn count_members(&self, filter: &MemberFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS count FROM members");
        push_member_filter(&mut qb, filter);
        let row = qb.build().fetch_one(&self.pool).await?;
        Ok(row.get("count"))
    }

    /// Every member as an `(id, name)` pair, oldest first.
    pub async fn member_roster(&self) -> Result<Vec<MemberRef>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM members ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MemberRef {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Create a new member. Fails with `Conflict` when the phone is taken.
    pub async fn create_member(&self, request: &CreateMemberRequest) -> Result<Member, AppError> {
        let name = request.name.trim().to_string();
        let phone = request.phone.trim().to_string();

        let taken = sqlx::query("SELECT 1 FROM members WHERE phone = ?")
            .bind(&phone)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Phone already exists".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let email = trimmed(&request.email);

        // A concurrent insert with the same phone still trips the UNIQUE column.
        sqlx::query(
            "INSERT INTO members (id, name, phone, email, fee_status, session, is_active, note, image, join_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(request.fee_status.as_str())
        .bind(request.session.as_str())
        .bind(request.is_active as i32)
        .bind(&request.note)
        .bind(&request.image)
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(member_id = %id, "Member created");

        Ok(Member {
            id,
            name,
            phone,
            email,
            fee_status: request.fee_status,
            session: request.session,
            is_active: request.is_active,
            note: request.note.clone(),
            image: request.image.clone(),
            join_date: now.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update to a member.
    pub async fn update_member(
        &self,
        id: &str,
        request: &UpdateMemberRequest,
    ) -> Result<Member, AppError> {
        let existing = self
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        let name = match request.name.as_deref().map(str::trim) {
            Some("") => return Err(AppError::Validation("Name cannot be empty".to_string())),
            Some(name) => name.to_string(),
            None => existing.name,
        };
        let phone = match request.phone.as_deref().map(str::trim) {
            Some("") => return Err(AppError::Validation("Phone cannot be empty".to_string())),
            Some(phone) => phone.to_string(),
            None => existing.phone,
        };
        let email = trimmed(&request.email).or(existing.email);
        let fee_status = request.fee_status.unwrap_or(existing.fee_status);
        let session = request.session.unwrap_or(existing.session);
        let is_active = request.is_active.unwrap_or(existing.is_active);
        let note = request.note.clone().or(existing.note);
        let image = request.image.clone().or(existing.image);
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE members SET name = ?, phone = ?, email = ?, fee_status = ?, session = ?, is_active = ?, note = ?, image = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(fee_status.as_str())
        .bind(session.as_str())
        .bind(is_active as i32)
        .bind(&note)
        .bind(&image)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Deleted between read and write
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        Ok(Member {
            id: id.to_string(),
            name,
            phone,
            email,
            fee_status,
            session,
            is_active,
            note,
            image,
            join_date: existing.join_date,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a member. Their attendance history is kept.
    pub async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        tracing::info!(member_id = %id, "Member deleted");
        Ok(())
    }

    /// Head counts by activity, fee status and session.
    pub async fn member_stats(&self) -> Result<MemberStats, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(is_active = 1), 0) AS active,
                COALESCE(SUM(fee_status = 'Pending'), 0) AS fee_pending,
                COALESCE(SUM(fee_status = 'Paid'), 0) AS fee_paid,
                COALESCE(SUM(fee_status = 'Advance Paid'), 0) AS fee_advance_paid,
                COALESCE(SUM(session = 'Morning'), 0) AS morning,
                COALESCE(SUM(session = 'Evening'), 0) AS evening
            FROM members
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.get("total");
        let active: i64 = row.get("active");
        Ok(MemberStats {
            total,
            active,
            inactive: total - active,
            fee_pending: row.get("fee_pending"),
            fee_paid: row.get("fee_paid"),
            fee_advance_paid: row.get("fee_advance_paid"),
            morning: row.get("morning"),
            evening: row.get("evening"),
        })
    }

    // ==================== ATTENDANCE OPERATIONS ====================

    /// List attendance, optionally for one day, joined with current member data.
    pub async fn list_attendance(
        &self,
        date: Option<&AttendanceDate>,
    ) -> Result<Vec<AttendanceEntry>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT a.id, a.member_id, a.member_name, a.date, a.status, a.notes,
                   a.created_at, a.updated_at,
                   m.name AS current_name, m.session AS member_session,
                   m.phone AS member_phone, m.image AS member_image
            FROM attendance a
            LEFT JOIN members m ON m.id = a.member_id
            "#,
        );
        if let Some(date) = date {
            qb.push(" WHERE a.date = ").push_bind(date.to_string());
        }
        qb.push(" ORDER BY a.date DESC, a.member_name");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Attendance history of one member, newest day first.
    pub async fn list_member_attendance(
        &self,
        member_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE member_id = ? ORDER BY date DESC",
            ATTENDANCE_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(attendance_from_row).collect())
    }

    /// Ids of members that already have a record for the day.
    pub async fn marked_member_ids(
        &self,
        date: &AttendanceDate,
    ) -> Result<HashSet<String>, AppError> {
        let rows = sqlx::query("SELECT member_id FROM attendance WHERE date = ?")
            .bind(date.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("member_id")).collect())
    }

    /// Insert an absence unless a record for `(member_id, date)` exists.
    ///
    /// Atomic: never overwrites, and returns `false` when another writer got
    /// there first.
    pub async fn insert_absent_if_missing(&self, absence: &NewAbsence) -> Result<bool, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO attendance (id, member_id, member_name, date, status, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, NULL, ?, ?) ON CONFLICT (member_id, date) DO NOTHING"
        )
        .bind(&id)
        .bind(&absence.member_id)
        .bind(&absence.member_name)
        .bind(absence.date.to_string())
        .bind(AttendanceStatus::Absent.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record a mark for a member on a day, replacing the status of any
    /// existing record for that day.
    pub async fn mark_attendance(
        &self,
        member: &Member,
        date: &AttendanceDate,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> Result<AttendanceRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let date_str = date.to_string();

        sqlx::query(
            r#"
            INSERT INTO attendance (id, member_id, member_name, date, status, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (member_id, date) DO UPDATE SET
                status = excluded.status,
                notes = COALESCE(excluded.notes, attendance.notes),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&member.id)
        .bind(&member.name)
        .bind(&date_str)
        .bind(status.as_str())
        .bind(&notes)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE member_id = ? AND date = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(&member.id)
        .bind(&date_str)
        .fetch_one(&self.pool)
        .await?;

        Ok(attendance_from_row(&row))
    }

    /// Get an attendance record by ID.
    pub async fn get_attendance(&self, id: &str) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM attendance WHERE id = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(attendance_from_row))
    }

    /// Change status and/or notes. The `(member_id, date)` key is immutable.
    pub async fn update_attendance(
        &self,
        id: &str,
        request: &UpdateAttendanceRequest,
    ) -> Result<AttendanceRecord, AppError> {
        let existing = self
            .get_attendance(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance record {} not found", id)))?;

        let status = request.status.unwrap_or(existing.status);
        let notes = request.notes.clone().or(existing.notes);
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("UPDATE attendance SET status = ?, notes = ?, updated_at = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(&notes)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Attendance record {} not found",
                id
            )));
        }

        Ok(AttendanceRecord {
            status,
            notes,
            updated_at: now,
            ..existing
        })
    }

    /// Delete an attendance record.
    pub async fn delete_attendance(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Attendance record {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Present / absent / unmarked counts for a day, against current members.
    pub async fn attendance_summary(
        &self,
        date: &AttendanceDate,
    ) -> Result<AttendanceSummary, AppError> {
        let date_str = date.to_string();
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM members) AS total_members,
                (SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'Present') AS present,
                (SELECT COUNT(*) FROM attendance WHERE date = ? AND status = 'Absent') AS absent,
                (SELECT COUNT(*) FROM members m
                    WHERE NOT EXISTS (
                        SELECT 1 FROM attendance a WHERE a.member_id = m.id AND a.date = ?
                    )) AS unmarked
            "#,
        )
        .bind(&date_str)
        .bind(&date_str)
        .bind(&date_str)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceSummary {
            date: date_str,
            total_members: row.get("total_members"),
            present: row.get("present"),
            absent: row.get("absent"),
            unmarked: row.get("unmarked"),
        })
    }
}

#[async_trait]
impl ReconcileStore for Repository {
    async fn member_roster(&self) -> Result<Vec<MemberRef>, AppError> {
        Repository::member_roster(self).await
    }

    async fn marked_member_ids(&self, date: &AttendanceDate) -> Result<HashSet<String>, AppError> {
        Repository::marked_member_ids(self, date).await
    }

    async fn insert_absent_if_missing(&self, absence: &NewAbsence) -> Result<bool, AppError> {
        Repository::insert_absent_if_missing(self, absence).await
    }
}

// Helper functions for query shaping and row conversion

fn push_member_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MemberFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (");
        for (i, column) in ["name", "phone", "email", "note"].iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        qb.push(")");
    }
    if let Some(fee_status) = filter.fee_status {
        qb.push(" AND fee_status = ").push_bind(fee_status.as_str());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active as i32);
    }
    if let Some(session) = filter.session {
        qb.push(" AND session = ").push_bind(session.as_str());
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    let is_active: i32 = row.get("is_active");
    let fee_status: String = row.get("fee_status");
    let session: String = row.get("session");
    Member {
        id: row.get("id"),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        fee_status: FeeStatus::parse(&fee_status).unwrap_or_default(),
        session: Session::parse(&session).unwrap_or_default(),
        is_active: is_active != 0,
        note: row.get("note"),
        image: row.get("image"),
        join_date: row.get("join_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn attendance_from_row(row: &sqlx::sqlite::SqliteRow) -> AttendanceRecord {
    let status: String = row.get("status");
    AttendanceRecord {
        id: row.get("id"),
        member_id: row.get("member_id"),
        member_name: row.get("member_name"),
        date: row.get("date"),
        // CHECK constraint keeps this to the two stored values
        status: AttendanceStatus::parse(&status).unwrap_or(AttendanceStatus::Absent),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> AttendanceEntry {
    let mut record = attendance_from_row(row);
    let current_name: Option<String> = row.get("current_name");
    let session: Option<String> = row.get("member_session");
    let phone: Option<String> = row.get("member_phone");
    let image: Option<String> = row.get("member_image");
    if let Some(name) = current_name {
        record.member_name = name;
    }
    AttendanceEntry {
        record,
        session: session.unwrap_or_else(|| "N/A".to_string()),
        phone_number: phone.unwrap_or_default(),
        profile_photo: image.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn setup() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("repo.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn new_member(name: &str, phone: &str) -> CreateMemberRequest {
        CreateMemberRequest {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            fee_status: FeeStatus::Pending,
            session: Session::Morning,
            is_active: true,
            note: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let (repo, _dir) = setup().await;
        repo.create_member(&new_member("Asha", "9000000001"))
            .await
            .unwrap();

        let err = repo
            .create_member(&new_member("Other", "9000000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_phone_change_to_taken_number_is_conflict() {
        let (repo, _dir) = setup().await;
        repo.create_member(&new_member("Asha", "9000000001"))
            .await
            .unwrap();
        let ravi = repo
            .create_member(&new_member("Ravi", "9000000002"))
            .await
            .unwrap();

        let err = repo
            .update_member(
                &ravi.id,
                &UpdateMemberRequest {
                    phone: Some("9000000001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_insert_absent_if_missing_never_overwrites() {
        let (repo, _dir) = setup().await;
        let member = repo
            .create_member(&new_member("Asha", "9000000001"))
            .await
            .unwrap();
        let date = AttendanceDate::parse("2024-03-01").unwrap();

        repo.mark_attendance(&member, &date, AttendanceStatus::Present, None)
            .await
            .unwrap();

        let inserted = repo
            .insert_absent_if_missing(&NewAbsence {
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                date,
            })
            .await
            .unwrap();
        assert!(!inserted);

        let history = repo.list_member_attendance(&member.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_mark_attendance_updates_existing_day() {
        let (repo, _dir) = setup().await;
        let member = repo
            .create_member(&new_member("Asha", "9000000001"))
            .await
            .unwrap();
        let date = AttendanceDate::parse("2024-03-01").unwrap();

        let first = repo
            .mark_attendance(
                &member,
                &date,
                AttendanceStatus::Absent,
                Some("sick".to_string()),
            )
            .await
            .unwrap();
        let second = repo
            .mark_attendance(&member, &date, AttendanceStatus::Present, None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, AttendanceStatus::Present);
        assert_eq!(second.notes.as_deref(), Some("sick"));
    }

    #[tokio::test]
    async fn test_attendance_outlives_member() {
        let (repo, _dir) = setup().await;
        let member = repo
            .create_member(&new_member("Asha", "9000000001"))
            .await
            .unwrap();
        let date = AttendanceDate::parse("2024-03-01").unwrap();
        repo.mark_attendance(&member, &date, AttendanceStatus::Present, None)
            .await
            .unwrap();

        repo.delete_member(&member.id).await.unwrap();

        let entries = repo.list_attendance(Some(&date)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.member_name, "Asha");
        assert_eq!(entries[0].session, "N/A");
    }

    #[tokio::test]
    async fn test_member_filters_and_counts() {
        let (repo, _dir) = setup().await;
        repo.create_member(&new_member("Asha Rao", "9000000001"))
            .await
            .unwrap();
        let mut evening = new_member("Ravi Kumar", "9000000002");
        evening.session = Session::Evening;
        evening.fee_status = FeeStatus::Paid;
        repo.create_member(&evening).await.unwrap();
        let mut inactive = new_member("Meena 50%", "9000000003");
        inactive.is_active = false;
        repo.create_member(&inactive).await.unwrap();

        let by_search = repo
            .list_members(&MemberFilter {
                search: Some("ravi".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.members.len(), 1);
        assert_eq!(by_search.members[0].name, "Ravi Kumar");

        let literal_percent = repo
            .count_members(&MemberFilter {
                search: Some("50%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(literal_percent, 1);

        let active = repo
            .count_members(&MemberFilter {
                is_active: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active, 2);

        let paged = repo
            .list_members(&MemberFilter {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.members.len(), 1);
        assert_eq!(paged.pagination.total_pages, 2);
        assert!(paged.pagination.has_prev_page);

        let clamped = repo
            .list_members(&MemberFilter {
                page: Some(u32::MAX),
                limit: Some(u32::MAX),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(clamped.members.is_empty());
        assert!(!clamped.pagination.has_next_page);

        let stats = repo.member_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.fee_paid, 1);
        assert_eq!(stats.evening, 1);
    }
}
