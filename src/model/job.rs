use serde::{Deserialize, Serialize};

use crate::model::{id::Id, store::JsonFile};

/// States in the Job lifecycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Posted but not yet taken on. Not eligible for votes.
    #[default]
    Pending,
    /// Open for the group to pursue. Eligible for votes.
    Active,
    /// Finished and paid out.
    Complete,
    /// Given up, or withdrawn by the poster.
    Abandoned,
}

/// A job posting on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique ID.
    pub id: Id,
    /// Job title.
    pub name: String,
    /// Briefing / flavour text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reward offered, as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    /// Faction posting the job, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<Id>,
    /// Lifecycle state.
    pub state: JobState,
}

/// The full contents of `jobs.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobsDocument {
    pub jobs: Vec<Job>,
}

impl JobsDocument {
    pub fn find(&self, id: &Id) -> Option<&Job> {
        self.jobs.iter().find(|job| &job.id == id)
    }

    pub fn find_mut(&mut self, id: &Id) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| &job.id == id)
    }

    /// Remove the job with the given ID, returning it if it was present.
    pub fn remove(&mut self, id: &Id) -> Option<Job> {
        let index = self.jobs.iter().position(|job| &job.id == id)?;
        Some(self.jobs.remove(index))
    }
}

impl JsonFile for JobsDocument {
    const FILENAME: &'static str = "jobs.json";
}
