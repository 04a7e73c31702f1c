//! Job tracking for async generation tasks
//!
//! Jobs are transient and in-memory: one per user-initiated generation,
//! created on submission and discarded once the caller has read the
//! terminal state. Only the poller mutates a job's state.

use serde::{Deserialize, Serialize};

/// State of a generation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobState {
    /// Whether no further transitions can occur from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// A tracked generation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    /// Vendor-assigned job id
    pub id: String,
    /// Current state
    pub state: JobState,
    /// Asset URL once completed
    #[serde(default)]
    pub result_url: Option<String>,
    /// Vendor failure reason, if the job failed
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Status checks performed so far
    #[serde(default)]
    pub attempts_made: u32,
    /// ISO 8601 timestamp when submitted
    pub submitted_at: String,
}

impl GenerationJob {
    /// Create a new pending job from a vendor-assigned id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: JobState::Pending,
            result_url: None,
            failure_reason: None,
            attempts_made: 0,
            submitted_at: now_iso8601(),
        }
    }
}

/// Current UTC time as an ISO 8601 string, without an external chrono
/// dependency.
pub(crate) fn now_iso8601() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs();
    let days = secs / 86400;
    let time_secs = secs % 86400;
    let hours = time_secs / 3600;
    let mins = (time_secs % 3600) / 60;
    let s = time_secs % 60;

    let mut y = 1970i64;
    let mut remaining_days = days as i64;
    loop {
        let days_in_year = if is_leap(y) { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        y += 1;
    }
    let month_days = [
        31,
        if is_leap(y) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut m = 0usize;
    for (i, &md) in month_days.iter().enumerate() {
        if remaining_days < md as i64 {
            m = i;
            break;
        }
        remaining_days -= md as i64;
    }

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y,
        m + 1,
        remaining_days + 1,
        hours,
        mins,
        s
    )
}

fn is_leap(y: i64) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = GenerationJob::new("pred-123");
        assert_eq!(job.id, "pred-123");
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.attempts_made, 0);
        assert!(job.result_url.is_none());
        assert!(job.submitted_at.contains('T'));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::InProgress.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn test_job_serialize_roundtrip() {
        let job = GenerationJob::new("gen-42");
        let json = serde_json::to_string(&job).unwrap();
        let parsed: GenerationJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, job.id);
        assert_eq!(parsed.state, JobState::Pending);
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = now_iso8601();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
    }
}
