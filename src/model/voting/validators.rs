//! Pure validation of voting-period data as submitted by clients.
//!
//! Request bodies are untrusted JSON, so these checks run on raw
//! [`Value`]s before anything is deserialized into the typed model.
//! Every check reports through its return value; none of them panic on
//! malformed input.

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::Value;

use crate::model::job::{Job, JobState};

/// The outcome of a validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// Invalid, with a human-readable reason.
    Invalid(String),
}

impl Validation {
    fn fail(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

/// Is the value exactly the string `"Ongoing"` or `"Archived"`?
pub fn valid_period_state(value: &Value) -> bool {
    matches!(value.as_str(), Some("Ongoing") | Some("Archived"))
}

/// Is the value a legal end time: null (the period never expires) or a
/// well-formed RFC 3339 date-time string? The raw string is stored as
/// given; nothing is normalised here.
pub fn valid_end_time(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(raw) => DateTime::parse_from_rfc3339(raw).is_ok(),
        _ => false,
    }
}

/// Validate a `jobVotes` array: its shape, the one-vote-per-pilot
/// invariant, and, when `jobs` is supplied, that every referenced job
/// exists and is active. Without `jobs` the existence and state checks
/// are skipped entirely.
///
/// Entries are scanned in insertion order and the first problem found
/// wins.
pub fn validate_job_votes(value: &Value, jobs: Option<&[Job]>) -> Validation {
    let Some(entries) = value.as_array() else {
        return Validation::fail("jobVotes must be an array");
    };

    let mut seen_pilots: HashSet<&str> = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(job_id) = entry.get("jobId").and_then(Value::as_str) else {
            return Validation::fail(format!("jobVotes entry {index} is missing a jobId"));
        };
        let Some(votes) = entry.get("votes").and_then(Value::as_array) else {
            return Validation::fail(format!("votes for job '{job_id}' must be an array"));
        };

        for vote in votes {
            let Some(pilot_id) = vote.as_str() else {
                return Validation::fail(format!(
                    "votes for job '{job_id}' must contain only pilot IDs"
                ));
            };
            if !seen_pilots.insert(pilot_id) {
                return Validation::fail(format!(
                    "Pilot '{pilot_id}' has voted for more than one job"
                ));
            }
        }

        if let Some(jobs) = jobs {
            match jobs.iter().find(|job| job.id.as_str() == job_id) {
                None => return Validation::fail(format!("Job '{job_id}' does not exist")),
                Some(job) if job.state != JobState::Active => {
                    return Validation::fail(format!("Job '{job_id}' is not active"));
                }
                Some(_) => {}
            }
        }
    }

    Validation::Valid
}

/// Validate a whole voting-period value: state, then end time, then job
/// votes (without a jobs context). The order is fixed and the first
/// failure is the one reported; nothing is aggregated.
pub fn validate_period(value: &Value) -> Validation {
    let state = value.get("state").unwrap_or(&Value::Null);
    if !valid_period_state(state) {
        return Validation::fail(format!("{state} is not a valid voting period state"));
    }
    let end_time = value.get("endTime").unwrap_or(&Value::Null);
    if !valid_end_time(end_time) {
        return Validation::fail(format!("{end_time} is not a valid end time"));
    }
    validate_job_votes(value.get("jobVotes").unwrap_or(&Value::Null), None)
}
