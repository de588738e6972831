//! Daily attendance reconciliation.
//!
//! Fills in an "Absent" record for every member that has no attendance record
//! for a given day. Runs are idempotent and safe to overlap: the store's
//! insert-if-absent primitive is the only guard, no lock is held between the
//! read of marked members and the inserts.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{AttendanceDate, MemberRef, NewAbsence};

/// Storage operations reconciliation depends on.
#[async_trait]
pub trait ReconcileStore: Send + Sync {
    /// Every member, projected to id and name.
    async fn member_roster(&self) -> Result<Vec<MemberRef>, AppError>;

    /// Ids of members that already have a record for `date`.
    async fn marked_member_ids(&self, date: &AttendanceDate) -> Result<HashSet<String>, AppError>;

    /// Atomically insert unless `(member_id, date)` exists. Returns whether a
    /// row was written.
    async fn insert_absent_if_missing(&self, absence: &NewAbsence) -> Result<bool, AppError>;
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub date: String,
    /// Records written by this run
    pub inserted_count: u64,
    /// Members loaded from the roster
    pub considered_members: u64,
}

/// Marks unmarked members absent. Shared by the daily scheduler and the
/// on-demand endpoint.
pub struct Reconciler<S> {
    store: S,
}

impl<S: ReconcileStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile a day given in `YYYY-MM-DD` form.
    ///
    /// Malformed dates fail with `Validation` before storage is touched.
    pub async fn reconcile(&self, date: &str) -> Result<ReconcileSummary, AppError> {
        let date = AttendanceDate::parse(date)?;
        self.reconcile_date(date).await
    }

    /// Reconcile an already validated day.
    ///
    /// A storage error aborts the run; absences inserted before it stay
    /// committed and a re-run picks up the rest.
    pub async fn reconcile_date(&self, date: AttendanceDate) -> Result<ReconcileSummary, AppError> {
        let members = self.store.member_roster().await?;
        let marked = self.store.marked_member_ids(&date).await?;

        let unmarked: Vec<NewAbsence> = members
            .iter()
            .filter(|m| !marked.contains(&m.id))
            .map(|m| NewAbsence {
                member_id: m.id.clone(),
                member_name: m.name.clone(),
                date,
            })
            .collect();

        let mut inserted = 0u64;
        for absence in &unmarked {
            if self.store.insert_absent_if_missing(absence).await? {
                inserted += 1;
            } else {
                // Marked by someone else since the read above
                tracing::debug!(
                    member_id = %absence.member_id,
                    date = %date,
                    "Attendance already recorded, skipping"
                );
            }
        }

        tracing::info!(
            date = %date,
            considered = members.len(),
            unmarked = unmarked.len(),
            inserted,
            "Attendance reconciled"
        );

        Ok(ReconcileSummary {
            date: date.to_string(),
            inserted_count: inserted,
            considered_members: members.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::db::{init_database, Repository};
    use crate::models::{AttendanceStatus, CreateMemberRequest, FeeStatus, Member, Session};
    use tempfile::TempDir;

    /// In-memory store keyed like the real attendance table.
    #[derive(Default)]
    struct MemoryStore {
        members: Vec<MemberRef>,
        records: Mutex<HashMap<(String, String), AttendanceStatus>>,
        calls: AtomicUsize,
        /// Ids "marked by another writer" right after the marked-id read
        race_ids: Vec<String>,
        /// Fail the insert for this member id
        fail_on: Option<String>,
    }

    impl MemoryStore {
        fn with_members(names: &[&str]) -> Self {
            Self {
                members: names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| MemberRef {
                        id: format!("m{}", i + 1),
                        name: name.to_string(),
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn set(&self, member_id: &str, date: &str, status: AttendanceStatus) {
            self.records
                .lock()
                .unwrap()
                .insert((member_id.to_string(), date.to_string()), status);
        }

        fn status(&self, member_id: &str, date: &str) -> Option<AttendanceStatus> {
            self.records
                .lock()
                .unwrap()
                .get(&(member_id.to_string(), date.to_string()))
                .copied()
        }

        fn count_for(&self, date: &str) -> usize {
            self.records
                .lock()
                .unwrap()
                .keys()
                .filter(|(_, d)| d == date)
                .count()
        }
    }

    #[async_trait]
    impl ReconcileStore for MemoryStore {
        async fn member_roster(&self) -> Result<Vec<MemberRef>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.members.clone())
        }

        async fn marked_member_ids(
            &self,
            date: &AttendanceDate,
        ) -> Result<HashSet<String>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let date = date.to_string();
            let ids = self
                .records
                .lock()
                .unwrap()
                .keys()
                .filter(|(_, d)| *d == date)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &self.race_ids {
                self.set(id, &date, AttendanceStatus::Present);
            }
            Ok(ids)
        }

        async fn insert_absent_if_missing(&self, absence: &NewAbsence) -> Result<bool, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.as_deref() == Some(absence.member_id.as_str()) {
                return Err(AppError::Database("disk I/O error".to_string()));
            }
            let key = (absence.member_id.clone(), absence.date.to_string());
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&key) {
                return Ok(false);
            }
            records.insert(key, AttendanceStatus::Absent);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_marks_only_unmarked_members() {
        let store = MemoryStore::with_members(&["A", "B", "C", "D", "E"]);
        store.set("m1", "2024-03-01", AttendanceStatus::Present);
        store.set("m2", "2024-03-01", AttendanceStatus::Present);
        let reconciler = Reconciler::new(store);

        let summary = reconciler.reconcile("2024-03-01").await.unwrap();

        assert_eq!(summary.inserted_count, 3);
        assert_eq!(summary.considered_members, 5);
        assert_eq!(summary.date, "2024-03-01");
        let store = &reconciler.store;
        assert_eq!(store.status("m1", "2024-03-01"), Some(AttendanceStatus::Present));
        assert_eq!(store.status("m2", "2024-03-01"), Some(AttendanceStatus::Present));
        for id in ["m3", "m4", "m5"] {
            assert_eq!(store.status(id, "2024-03-01"), Some(AttendanceStatus::Absent));
        }
    }

    #[tokio::test]
    async fn test_second_run_inserts_nothing() {
        let reconciler = Reconciler::new(MemoryStore::with_members(&["A", "B", "C"]));

        let first = reconciler.reconcile("2024-03-01").await.unwrap();
        let second = reconciler.reconcile("2024-03-01").await.unwrap();

        assert_eq!(first.inserted_count, 3);
        assert_eq!(second.inserted_count, 0);
        assert_eq!(reconciler.store.count_for("2024-03-01"), 3);
    }

    #[tokio::test]
    async fn test_no_members_is_not_an_error() {
        let reconciler = Reconciler::new(MemoryStore::default());

        let summary = reconciler.reconcile("2030-01-01").await.unwrap();

        assert_eq!(summary.inserted_count, 0);
        assert_eq!(summary.considered_members, 0);
    }

    #[tokio::test]
    async fn test_invalid_date_never_touches_storage() {
        let reconciler = Reconciler::new(MemoryStore::with_members(&["A"]));

        let err = reconciler.reconcile("not-a-date").await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(reconciler.store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lost_race_is_skipped_not_counted() {
        let mut store = MemoryStore::with_members(&["A", "B", "C"]);
        store.race_ids = vec!["m2".to_string()];
        let reconciler = Reconciler::new(store);

        let summary = reconciler.reconcile("2024-03-01").await.unwrap();

        assert_eq!(summary.inserted_count, 2);
        assert_eq!(
            reconciler.store.status("m2", "2024-03-01"),
            Some(AttendanceStatus::Present)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_but_keeps_progress() {
        let mut store = MemoryStore::with_members(&["A", "B", "C"]);
        store.fail_on = Some("m2".to_string());
        let reconciler = Reconciler::new(store);

        let err = reconciler.reconcile("2024-03-01").await.unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(
            reconciler.store.status("m1", "2024-03-01"),
            Some(AttendanceStatus::Absent)
        );
        assert_eq!(reconciler.store.status("m3", "2024-03-01"), None);
    }

    // ---- against SQLite ----

    async fn sqlite_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("reconcile.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    async fn add_members(repo: &Repository, count: usize) -> Vec<Member> {
        let mut members = Vec::new();
        for i in 0..count {
            let member = repo
                .create_member(&CreateMemberRequest {
                    name: format!("Member {}", i),
                    phone: format!("90000000{:02}", i),
                    email: None,
                    fee_status: FeeStatus::Pending,
                    session: Session::Morning,
                    is_active: i % 2 == 0,
                    note: None,
                    image: None,
                })
                .await
                .unwrap();
            members.push(member);
        }
        members
    }

    #[tokio::test]
    async fn test_sqlite_every_member_gets_exactly_one_record() {
        let (repo, _dir) = sqlite_repo().await;
        let members = add_members(&repo, 4).await;
        let date = AttendanceDate::parse("2024-03-01").unwrap();
        repo.mark_attendance(&members[0], &date, AttendanceStatus::Present, None)
            .await
            .unwrap();
        let reconciler = Reconciler::new(repo.clone());

        let summary = reconciler.reconcile("2024-03-01").await.unwrap();

        // Inactive members are reconciled too
        assert_eq!(summary.inserted_count, 3);
        for member in &members {
            let history = repo.list_member_attendance(&member.id).await.unwrap();
            assert_eq!(history.len(), 1);
        }
        let first = repo.list_member_attendance(&members[0].id).await.unwrap();
        assert_eq!(first[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_sqlite_manual_correction_survives_rerun() {
        let (repo, _dir) = sqlite_repo().await;
        let members = add_members(&repo, 3).await;
        let reconciler = Reconciler::new(repo.clone());

        reconciler.reconcile("2024-03-01").await.unwrap();
        let record = repo.list_member_attendance(&members[1].id).await.unwrap()[0].clone();
        repo.update_attendance(
            &record.id,
            &crate::models::UpdateAttendanceRequest {
                status: Some(AttendanceStatus::Present),
                notes: None,
            },
        )
        .await
        .unwrap();

        let again = reconciler.reconcile("2024-03-01").await.unwrap();

        assert_eq!(again.inserted_count, 0);
        let after = repo.get_attendance(&record.id).await.unwrap().unwrap();
        assert_eq!(after.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_sqlite_concurrent_runs_never_duplicate() {
        let (repo, _dir) = sqlite_repo().await;
        add_members(&repo, 20).await;
        let reconciler = Arc::new(Reconciler::new(repo.clone()));

        let a = tokio::spawn({
            let r = reconciler.clone();
            async move { r.reconcile("2024-03-01").await }
        });
        let b = tokio::spawn({
            let r = reconciler.clone();
            async move { r.reconcile("2024-03-01").await }
        });
        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(first.inserted_count + second.inserted_count, 20);
        let date = AttendanceDate::parse("2024-03-01").unwrap();
        let rows = repo.list_attendance(Some(&date)).await.unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(repo.marked_member_ids(&date).await.unwrap().len(), 20);
    }
}
