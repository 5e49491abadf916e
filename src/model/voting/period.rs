use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{id::Id, store::JsonFile};

/// States in the voting period lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodState {
    /// Open for votes. At most one period may be ongoing at a time.
    Ongoing,
    /// Closed. Terminal: an archived period never reopens.
    Archived,
}

/// The set of pilots who voted for a specific job within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobVote {
    /// The job being voted for.
    pub job_id: Id,
    /// Pilots who voted for it. A pilot appears in at most one entry
    /// across the whole period.
    pub votes: Vec<Id>,
}

/// An invariant violation on a voting-period mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantViolation(String);

/// A bounded or unbounded window during which pilots vote on jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingPeriod {
    /// Unique ID.
    pub id: Id,
    /// Lifecycle state.
    pub state: PeriodState,
    /// Votes per job, in display order.
    pub job_votes: Vec<JobVote>,
    /// When the period closes, kept as the ISO-8601 string the client
    /// sent (no timezone normalisation). `None` means the period never
    /// expires on its own.
    pub end_time: Option<String>,
}

impl VotingPeriod {
    /// Create a fresh ongoing period.
    pub fn new(job_votes: Vec<JobVote>, end_time: Option<String>) -> Self {
        Self {
            id: Id::new(),
            state: PeriodState::Ongoing,
            job_votes,
            end_time,
        }
    }

    /// The end time parsed for scheduling. `None` if unset or
    /// unparseable; validation rejects unparseable end times on the way
    /// in, so the latter only happens for hand-edited files.
    pub fn end_time_parsed(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.end_time.as_deref()?;
        DateTime::parse_from_rfc3339(raw).ok()
    }

    /// Has this pilot already voted for any job in this period?
    pub fn has_voted(&self, pilot_id: &Id) -> bool {
        self.job_votes
            .iter()
            .any(|entry| entry.votes.contains(pilot_id))
    }

    /// Record a pilot's vote for a job, upholding the one-vote-per-pilot
    /// invariant. A job with no votes yet gets a fresh entry.
    pub fn cast_vote(&mut self, job_id: Id, pilot_id: Id) -> Result<(), InvariantViolation> {
        if self.state != PeriodState::Ongoing {
            return Err(InvariantViolation(format!(
                "Voting period {} is not ongoing",
                self.id
            )));
        }
        if self.has_voted(&pilot_id) {
            return Err(InvariantViolation(format!(
                "Pilot '{pilot_id}' has already voted in this period"
            )));
        }
        match self
            .job_votes
            .iter_mut()
            .find(|entry| entry.job_id == job_id)
        {
            Some(entry) => entry.votes.push(pilot_id),
            None => self.job_votes.push(JobVote {
                job_id,
                votes: vec![pilot_id],
            }),
        }
        Ok(())
    }
}

/// The full contents of `voting-periods.json`: every period ever run,
/// oldest first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VotingPeriodsDocument {
    pub periods: Vec<VotingPeriod>,
}

impl VotingPeriodsDocument {
    /// The single ongoing period: the first entry whose state is
    /// `Ongoing`. Purely a query; [`Self::add`] upholds the
    /// at-most-one invariant.
    pub fn ongoing(&self) -> Option<&VotingPeriod> {
        self.periods
            .iter()
            .find(|period| period.state == PeriodState::Ongoing)
    }

    pub fn ongoing_mut(&mut self) -> Option<&mut VotingPeriod> {
        self.periods
            .iter_mut()
            .find(|period| period.state == PeriodState::Ongoing)
    }

    pub fn find(&self, id: &Id) -> Option<&VotingPeriod> {
        self.periods.iter().find(|period| &period.id == id)
    }

    pub fn find_mut(&mut self, id: &Id) -> Option<&mut VotingPeriod> {
        self.periods.iter_mut().find(|period| &period.id == id)
    }

    /// Append a new period. This is the only way periods enter the
    /// document, which centralises the at-most-one-ongoing invariant.
    pub fn add(&mut self, period: VotingPeriod) -> Result<(), InvariantViolation> {
        if period.state == PeriodState::Ongoing {
            if let Some(existing) = self.ongoing() {
                return Err(InvariantViolation(format!(
                    "Voting period {} is already ongoing",
                    existing.id
                )));
            }
        }
        self.periods.push(period);
        Ok(())
    }

    /// Close the given period. Ongoing to Archived is the only legal
    /// transition; archiving anything else is refused.
    pub fn archive(&mut self, id: &Id) -> Result<(), InvariantViolation> {
        let period = self
            .find_mut(id)
            .ok_or_else(|| InvariantViolation(format!("No voting period with ID {id}")))?;
        if period.state != PeriodState::Ongoing {
            return Err(InvariantViolation(format!(
                "Voting period {id} is already archived"
            )));
        }
        period.state = PeriodState::Archived;
        Ok(())
    }
}

impl JsonFile for VotingPeriodsDocument {
    const FILENAME: &'static str = "voting-periods.json";
}
