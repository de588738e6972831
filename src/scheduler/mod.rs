//! Daily automatic absence run.
//!
//! Once started, sleeps until the configured local time, reconciles "today"
//! in the business timezone, and repeats. A failed run is logged and the next
//! day's run still happens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::AttendanceDate;
use crate::reconcile::{ReconcileStore, Reconciler};

/// Lifecycle handle for the daily absence loop.
///
/// Created once by the process bootstrapper and shared by reference; the
/// started flag lives here rather than in global state.
pub struct AbsenceScheduler<S> {
    reconciler: Arc<Reconciler<S>>,
    run_at: NaiveTime,
    tz: Tz,
    started: AtomicBool,
    shutdown: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ReconcileStore + 'static> AbsenceScheduler<S> {
    pub fn new(reconciler: Arc<Reconciler<S>>, run_at: NaiveTime, tz: Tz) -> Self {
        Self {
            reconciler,
            run_at,
            tz,
            started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Arm the daily loop. Returns `false` if it was already started.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Absence scheduler already started, ignoring");
            return false;
        }

        let reconciler = self.reconciler.clone();
        let shutdown = self.shutdown.clone();
        let (run_at, tz) = (self.run_at, self.tz);
        let handle = tokio::spawn(async move {
            run_loop(reconciler, run_at, tz, shutdown).await;
        });

        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
        tracing::info!(run_at = %run_at, timezone = %tz, "Absence scheduler started");
        true
    }

    /// Cancel the loop. Safe to call more than once, or before `start`.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        let handle = self.handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("Absence scheduler task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.shutdown.is_cancelled()
    }
}

async fn run_loop<S: ReconcileStore>(
    reconciler: Arc<Reconciler<S>>,
    run_at: NaiveTime,
    tz: Tz,
    shutdown: CancellationToken,
) {
    loop {
        let now = Utc::now().with_timezone(&tz);
        let wait = duration_until_next_run(now, run_at);
        tracing::info!(
            "Next automatic absence run in {} minutes",
            wait.as_secs() / 60
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Absence scheduler received shutdown signal");
                return;
            }
        }

        // Resolved at fire time, never cached
        let today = AttendanceDate::today_in(tz);
        match reconciler.reconcile_date(today).await {
            Ok(summary) => tracing::info!(
                date = %summary.date,
                inserted = summary.inserted_count,
                "Automatic absence run finished"
            ),
            Err(e) => tracing::error!(date = %today, "Automatic absence run failed: {}", e),
        }
    }
}

/// Time from `now` until the next occurrence of `run_at` in `now`'s zone.
fn duration_until_next_run(now: DateTime<Tz>, run_at: NaiveTime) -> Duration {
    let tz = now.timezone();
    let today = now.date_naive();
    let target_date = if now.time() >= run_at {
        today + chrono::Duration::days(1)
    } else {
        today
    };

    let target = target_date
        .and_time(run_at)
        .and_local_timezone(tz)
        .earliest()
        .or_else(|| {
            // run_at falls in a DST gap; fire just after it
            (target_date.and_time(run_at) + chrono::Duration::hours(1))
                .and_local_timezone(tz)
                .earliest()
        });

    match target.map(|t| t.signed_duration_since(now).to_std()) {
        Some(Ok(wait)) if !wait.is_zero() => wait,
        _ => Duration::from_secs(60),
    }
}
