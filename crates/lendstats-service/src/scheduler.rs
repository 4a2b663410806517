//! Periodic background jobs.
//!
//! Each registered job runs on its own task, sleeping until the next firing
//! of its [`FiringPolicy`]. Jobs never overlap with themselves, but different
//! jobs may run concurrently. A failed run is logged and the job waits for its
//! next firing; there is no retry in between.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lendstats_core::{AnalyticsError, Clock};

// ============================================================================
// Jobs
// ============================================================================

/// Outcome of one successful job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Number of keys or members the run acted on.
    pub affected: u64,
    /// Human-readable summary for the log.
    pub summary: String,
}

impl JobReport {
    /// Create a report.
    #[must_use]
    pub fn new(affected: u64, summary: impl Into<String>) -> Self {
        Self {
            affected,
            summary: summary.into(),
        }
    }
}

/// A unit of periodic work.
///
/// `run` must be safe to interleave with request traffic and with other jobs.
#[async_trait]
pub trait Job: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Execute one run.
    async fn run(&self) -> Result<JobReport, AnalyticsError>;
}

/// Run `job` once, logging the outcome.
///
/// Failures are wrapped as `AnalyticsError::SchedulerJobFailure`, logged and
/// returned as `None`; they never propagate to the caller.
pub async fn run_job(job: &dyn Job) -> Option<JobReport> {
    match job.run().await {
        Ok(report) => {
            tracing::info!(
                job = job.name(),
                affected = report.affected,
                summary = %report.summary,
                "Scheduled job completed"
            );
            Some(report)
        }
        Err(e) => {
            let failure = AnalyticsError::SchedulerJobFailure {
                job: job.name().to_string(),
                message: e.to_string(),
            };
            tracing::error!(job = job.name(), error = %failure, "Scheduled job failed");
            None
        }
    }
}

// ============================================================================
// Firing policies
// ============================================================================

/// When a job fires. Calendar policies are evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringPolicy {
    /// Fixed interval after the previous firing.
    Every(Duration),
    /// Once an hour at the given minute.
    HourlyAt {
        /// Minute past the hour (0-59).
        minute: u32,
    },
    /// Once a day at the given time.
    DailyAt {
        /// Hour of day (0-23).
        hour: u32,
        /// Minute past the hour (0-59).
        minute: u32,
    },
}

impl FiringPolicy {
    /// Hourly policy with a validated minute.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if `minute > 59`.
    pub fn hourly_at(minute: u32) -> Result<Self, AnalyticsError> {
        if minute > 59 {
            return Err(AnalyticsError::Configuration(format!(
                "minute out of range: {minute}"
            )));
        }
        Ok(Self::HourlyAt { minute })
    }

    /// Daily policy with a validated time of day.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if `hour > 23` or `minute > 59`.
    pub fn daily_at(hour: u32, minute: u32) -> Result<Self, AnalyticsError> {
        if hour > 23 {
            return Err(AnalyticsError::Configuration(format!(
                "hour out of range: {hour}"
            )));
        }
        if minute > 59 {
            return Err(AnalyticsError::Configuration(format!(
                "minute out of range: {minute}"
            )));
        }
        Ok(Self::DailyAt { hour, minute })
    }

    /// The first firing strictly after `now`.
    #[must_use]
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Self::Every(step) => {
                // A non-positive interval would spin.
                let step = if step > Duration::zero() {
                    step
                } else {
                    Duration::seconds(1)
                };
                now + step
            }
            Self::HourlyAt { minute } => {
                let candidate = now
                    .date_naive()
                    .and_hms_opt(now.hour(), minute.min(59), 0)
                    .map(|t| t.and_utc());
                match candidate {
                    Some(at) if at > now => at,
                    Some(at) => at + Duration::hours(1),
                    None => now + Duration::hours(1),
                }
            }
            Self::DailyAt { hour, minute } => {
                let candidate = now
                    .date_naive()
                    .and_hms_opt(hour.min(23), minute.min(59), 0)
                    .map(|t| t.and_utc());
                match candidate {
                    Some(at) if at > now => at,
                    Some(at) => at + Duration::days(1),
                    None => now + Duration::days(1),
                }
            }
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Registry of periodic jobs.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    entries: Vec<(Arc<dyn Job>, FiringPolicy)>,
}

impl Scheduler {
    /// Create an empty scheduler that reads time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Vec::new(),
        }
    }

    /// Register `job` to fire according to `policy`.
    #[must_use]
    pub fn with_job(mut self, job: Arc<dyn Job>, policy: FiringPolicy) -> Self {
        self.entries.push((job, policy));
        self
    }

    /// Number of registered jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no job is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start every job on its own task; all stop once `cancel` fires.
    #[must_use]
    pub fn spawn(self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let Self { clock, entries } = self;
        entries
            .into_iter()
            .map(|(job, policy)| {
                let clock = clock.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    job_loop(job, policy, clock, cancel).await;
                })
            })
            .collect()
    }
}

async fn job_loop(
    job: Arc<dyn Job>,
    policy: FiringPolicy,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) {
    let mut after = clock.now();
    tracing::info!(job = job.name(), policy = ?policy, "Scheduled job started");

    loop {
        let next = policy.next_after(after);
        let wait = (next - clock.now()).to_std().unwrap_or_default();
        tracing::debug!(job = job.name(), next = %next, "Next firing");

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(job = job.name(), "Scheduled job shutting down");
                break;
            }
            () = tokio::time::sleep(wait) => {
                run_job(job.as_ref()).await;
            }
        }

        after = next.max(clock.now());
    }
}
