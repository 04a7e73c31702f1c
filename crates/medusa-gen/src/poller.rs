//! Bounded poll loop for asynchronous generation jobs
//!
//! Wraps a two-call vendor protocol (create job, fetch status) into a single
//! blocking operation that returns only on a terminal state: success with an
//! asset URL, explicit vendor failure, attempt exhaustion, or cancellation.

use medusa_core::{MedusaError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::job::{GenerationJob, JobState};

/// Handle returned by a successful job-creation call
#[derive(Debug, Clone)]
pub struct JobHandle {
    /// Vendor-assigned job id
    pub id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Normalized vendor status for one poll of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Any non-terminal vendor marker
    InProgress,
    /// Terminal success; the vendor may still have omitted the asset
    Completed { asset_url: Option<String> },
    /// Terminal failure with the vendor-supplied reason, if any
    Failed { reason: Option<String> },
}

/// Poll loop configuration.
///
/// Observed vendor behavior varies widely (seconds to minutes per job), so
/// both knobs are call-site configuration. Defaults are the most
/// conservative values in use: 30 attempts at a 15 second interval.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Maximum number of status checks before giving up
    pub max_attempts: u32,
    /// Delay between status checks
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(15),
        }
    }
}

/// Cancellation signal for an in-flight poll.
///
/// Clonable and thread-safe: an enclosing request handler can hold one clone
/// and cancel from another thread without waiting for attempt exhaustion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation; the poll returns `MedusaError::Cancelled` at its
    /// next check point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Create a job and poll it to completion, returning the asset URL.
///
/// `create` is called exactly once; a creation failure or a handle without
/// an id is fatal (`Creation`). The status loop makes at most
/// `options.max_attempts` checks, sleeping `options.interval` between
/// non-terminal responses. Explicit vendor failure is never retried.
pub fn run_to_completion<C, F>(
    create: C,
    fetch_status: F,
    options: &PollOptions,
    cancel: &CancelToken,
) -> Result<String>
where
    C: FnOnce() -> Result<JobHandle>,
    F: FnMut(&str) -> Result<PollStatus>,
{
    let handle = create().map_err(|e| match e {
        MedusaError::Creation(_) => e,
        other => MedusaError::Creation(other.to_string()),
    })?;
    if handle.id.is_empty() {
        return Err(MedusaError::Creation(
            "Vendor returned a job without an id".to_string(),
        ));
    }

    let mut job = GenerationJob::new(handle.id);
    poll_job(&mut job, fetch_status, options, cancel)
}

/// Poll an already-created job to completion, driving its state machine.
///
/// The job is mutated in place: `state`, `attempts_made`, and on terminal
/// transitions `result_url` / `failure_reason`.
pub fn poll_job<F>(
    job: &mut GenerationJob,
    mut fetch_status: F,
    options: &PollOptions,
    cancel: &CancelToken,
) -> Result<String>
where
    F: FnMut(&str) -> Result<PollStatus>,
{
    for attempt in 1..=options.max_attempts {
        if cancel.is_cancelled() {
            return Err(MedusaError::Cancelled);
        }

        let status = fetch_status(&job.id)?;
        job.attempts_made = attempt;

        match status {
            PollStatus::Completed { asset_url } => {
                job.state = JobState::Completed;
                return match asset_url {
                    Some(url) => {
                        job.result_url = Some(url.clone());
                        Ok(url)
                    }
                    None => Err(MedusaError::MissingAsset(format!(
                        "Job {} completed without an asset URL",
                        job.id
                    ))),
                };
            }
            PollStatus::Failed { reason } => {
                let reason = reason.unwrap_or_else(|| "Unknown reason".to_string());
                job.state = JobState::Failed;
                job.failure_reason = Some(reason.clone());
                return Err(MedusaError::GenerationFailed(reason));
            }
            PollStatus::InProgress => {
                job.state = JobState::InProgress;
                if attempt < options.max_attempts {
                    std::thread::sleep(options.interval);
                    if cancel.is_cancelled() {
                        return Err(MedusaError::Cancelled);
                    }
                }
            }
        }
    }

    Err(MedusaError::Timeout {
        attempts: options.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_options(max_attempts: u32) -> PollOptions {
        PollOptions {
            max_attempts,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn test_completes_after_single_check() {
        let calls = Cell::new(0u32);
        let result = run_to_completion(
            || Ok(JobHandle::new("job-1")),
            |_| {
                calls.set(calls.get() + 1);
                Ok(PollStatus::Completed {
                    asset_url: Some("https://cdn.example.com/out.png".to_string()),
                })
            },
            &fast_options(30),
            &CancelToken::new(),
        );
        assert_eq!(result.unwrap(), "https://cdn.example.com/out.png");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_times_out_after_exactly_max_attempts() {
        let calls = Cell::new(0u32);
        let result = run_to_completion(
            || Ok(JobHandle::new("job-2")),
            |_| {
                calls.set(calls.get() + 1);
                Ok(PollStatus::InProgress)
            },
            &fast_options(7),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(MedusaError::Timeout { attempts: 7 })));
        assert_eq!(calls.get(), 7);
    }

    #[test]
    fn test_explicit_failure_stops_immediately() {
        let calls = Cell::new(0u32);
        let result = run_to_completion(
            || Ok(JobHandle::new("job-3")),
            |_| {
                calls.set(calls.get() + 1);
                Ok(PollStatus::Failed {
                    reason: Some("boom".to_string()),
                })
            },
            &fast_options(30),
            &CancelToken::new(),
        );
        match result {
            Err(MedusaError::GenerationFailed(reason)) => assert_eq!(reason, "boom"),
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failure_without_reason_reports_unknown() {
        let result = run_to_completion(
            || Ok(JobHandle::new("job-4")),
            |_| Ok(PollStatus::Failed { reason: None }),
            &fast_options(30),
            &CancelToken::new(),
        );
        match result {
            Err(MedusaError::GenerationFailed(reason)) => assert_eq!(reason, "Unknown reason"),
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_without_asset_is_missing_asset() {
        let result = run_to_completion(
            || Ok(JobHandle::new("job-5")),
            |_| Ok(PollStatus::Completed { asset_url: None }),
            &fast_options(30),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(MedusaError::MissingAsset(_))));
    }

    #[test]
    fn test_creation_failure_is_fatal_without_polling() {
        let calls = Cell::new(0u32);
        let result = run_to_completion(
            || Err(MedusaError::Provider("connection refused".to_string())),
            |_| {
                calls.set(calls.get() + 1);
                Ok(PollStatus::InProgress)
            },
            &fast_options(30),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(MedusaError::Creation(_))));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_creation_error_is_not_rewrapped() {
        let result = run_to_completion(
            || Err(MedusaError::Creation("no id in response".to_string())),
            |_| Ok(PollStatus::InProgress),
            &fast_options(30),
            &CancelToken::new(),
        );
        match result {
            Err(MedusaError::Creation(msg)) => {
                assert_eq!(msg, "no id in response");
                assert_eq!(msg.matches("Job creation failed").count(), 0);
            }
            other => panic!("expected Creation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_job_id_is_creation_error() {
        let result = run_to_completion(
            || Ok(JobHandle::new("")),
            |_| Ok(PollStatus::InProgress),
            &fast_options(30),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(MedusaError::Creation(_))));
    }

    #[test]
    fn test_cancellation_aborts_the_poll() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let calls = Cell::new(0u32);
        let result = run_to_completion(
            || Ok(JobHandle::new("job-6")),
            |_| {
                calls.set(calls.get() + 1);
                Ok(PollStatus::InProgress)
            },
            &fast_options(30),
            &cancel,
        );
        assert!(matches!(result, Err(MedusaError::Cancelled)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_in_progress_then_completed_transitions_job() {
        let calls = Cell::new(0u32);
        let mut job = GenerationJob::new("job-7");
        let result = poll_job(
            &mut job,
            |_| {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Ok(PollStatus::InProgress)
                } else {
                    Ok(PollStatus::Completed {
                        asset_url: Some("https://cdn.example.com/v.mp4".to_string()),
                    })
                }
            },
            &fast_options(30),
            &CancelToken::new(),
        );
        assert_eq!(result.unwrap(), "https://cdn.example.com/v.mp4");
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.attempts_made, 3);
        assert_eq!(
            job.result_url.as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );
    }

    #[test]
    fn test_failed_job_records_reason() {
        let mut job = GenerationJob::new("job-8");
        let _ = poll_job(
            &mut job,
            |_| {
                Ok(PollStatus::Failed {
                    reason: Some("safety filter".to_string()),
                })
            },
            &fast_options(30),
            &CancelToken::new(),
        );
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.failure_reason.as_deref(), Some("safety filter"));
    }

    #[test]
    fn test_transport_errors_propagate_unchanged() {
        let result = run_to_completion(
            || Ok(JobHandle::new("job-9")),
            |_| Err(MedusaError::Provider("502".to_string())),
            &fast_options(30),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(MedusaError::Provider(_))));
    }
}
