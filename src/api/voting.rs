use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    job::{JobState, JobsDocument},
    pilot::PilotsDocument,
    store::Repo,
    voting::{
        validators::{valid_end_time, validate_job_votes, validate_period, Validation},
        JobVote, PeriodFinalizers, PeriodState, VotingPeriod, VotingPeriodsDocument,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_periods,
        get_ongoing_period,
        get_period,
        create_period,
        update_period,
        cast_vote,
        archive_period,
    ]
}

#[get("/voting-periods")]
async fn get_periods(periods: Repo<VotingPeriodsDocument>) -> Json<Vec<VotingPeriod>> {
    Json(periods.read().await.periods)
}

#[get("/voting-periods/ongoing")]
async fn get_ongoing_period(
    periods: Repo<VotingPeriodsDocument>,
) -> Result<Json<VotingPeriod>> {
    let doc = periods.read().await;
    let ongoing = doc
        .ongoing()
        .cloned()
        .ok_or_else(|| Error::not_found("Ongoing voting period"))?;
    Ok(Json(ongoing))
}

#[get("/voting-periods/<period_id>")]
async fn get_period(
    period_id: Id,
    periods: Repo<VotingPeriodsDocument>,
) -> Result<Json<VotingPeriod>> {
    let doc = periods.read().await;
    let period = doc
        .find(&period_id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("Voting period {period_id}")))?;
    Ok(Json(period))
}

#[post("/voting-periods", data = "<spec>", format = "json")]
async fn create_period(
    spec: Json<Value>,
    periods: Repo<VotingPeriodsDocument>,
    jobs: Repo<JobsDocument>,
    finalizers: &State<PeriodFinalizers>,
) -> Result<Json<VotingPeriod>> {
    // Validate the untrusted body before deserializing any of it.
    if !spec.is_object() {
        return Err(Error::bad_request("Voting period must be an object"));
    }
    let end_time = spec.get("endTime").cloned().unwrap_or(Value::Null);
    if !valid_end_time(&end_time) {
        return Err(Error::bad_request(format!(
            "{end_time} is not a valid end time"
        )));
    }
    let job_votes = spec
        .get("jobVotes")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let jobs_doc = jobs.read().await;
    if let Validation::Invalid(message) = validate_job_votes(&job_votes, Some(&jobs_doc.jobs)) {
        return Err(Error::bad_request(message));
    }

    // New periods are always ongoing; any state in the body is ignored.
    let period = VotingPeriod::new(
        serde_json::from_value(job_votes)?,
        serde_json::from_value(end_time)?,
    );

    let mut doc = periods.read().await;
    doc.add(period.clone())
        .map_err(|e| Error::bad_request(e.to_string()))?;
    periods.write(&doc).await?;

    finalizers.schedule_period(periods.clone(), &period).await;

    Ok(Json(period))
}

#[put("/voting-periods/<period_id>", data = "<body>", format = "json")]
async fn update_period(
    period_id: Id,
    body: Json<Value>,
    periods: Repo<VotingPeriodsDocument>,
    jobs: Repo<JobsDocument>,
    finalizers: &State<PeriodFinalizers>,
) -> Result<Json<VotingPeriod>> {
    if let Validation::Invalid(message) = validate_period(&body) {
        return Err(Error::bad_request(message));
    }
    let jobs_doc = jobs.read().await;
    if let Validation::Invalid(message) =
        validate_job_votes(body.get("jobVotes").unwrap_or(&Value::Null), Some(&jobs_doc.jobs))
    {
        return Err(Error::bad_request(message));
    }
    let update: PeriodUpdate = serde_json::from_value(body.0)?;

    let mut doc = periods.read().await;
    let period = doc
        .find_mut(&period_id)
        .ok_or_else(|| Error::not_found(format!("Voting period {period_id}")))?;

    // Archival is terminal; an edit cannot reopen a closed period.
    if period.state == PeriodState::Archived && update.state == PeriodState::Ongoing {
        return Err(Error::bad_request(format!(
            "Voting period {period_id} is archived and cannot be reopened"
        )));
    }

    // Replace the mutable fields; the ID is immutable.
    period.state = update.state;
    period.job_votes = update.job_votes;
    period.end_time = update.end_time;
    let period = period.clone();
    periods.write(&doc).await?;

    // Keep the scheduled archival in line with the new end time.
    finalizers.cancel_period(&period.id).await;
    if period.state == PeriodState::Ongoing {
        finalizers.schedule_period(periods.clone(), &period).await;
    }

    Ok(Json(period))
}

#[post("/voting-periods/<period_id>/votes", data = "<vote>", format = "json")]
async fn cast_vote(
    period_id: Id,
    vote: Json<VoteSpec>,
    periods: Repo<VotingPeriodsDocument>,
    jobs: Repo<JobsDocument>,
    pilots: Repo<PilotsDocument>,
) -> Result<Json<VotingPeriod>> {
    let VoteSpec { pilot_id, job_id } = vote.0;

    // The pilot must exist...
    let pilots_doc = pilots.read().await;
    if pilots_doc.find(&pilot_id).is_none() {
        return Err(Error::not_found(format!("Pilot {pilot_id}")));
    }

    // ...and the job must exist and be open for votes.
    let jobs_doc = jobs.read().await;
    let job = jobs_doc
        .find(&job_id)
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;
    if job.state != JobState::Active {
        return Err(Error::bad_request(format!("Job '{job_id}' is not active")));
    }

    let mut doc = periods.read().await;
    let period = doc
        .find_mut(&period_id)
        .ok_or_else(|| Error::not_found(format!("Voting period {period_id}")))?;
    period
        .cast_vote(job_id, pilot_id)
        .map_err(|e| Error::bad_request(e.to_string()))?;
    let period = period.clone();
    periods.write(&doc).await?;

    Ok(Json(period))
}

#[post("/voting-periods/<period_id>/archive")]
async fn archive_period(
    period_id: Id,
    periods: Repo<VotingPeriodsDocument>,
    finalizers: &State<PeriodFinalizers>,
) -> Result<()> {
    let mut doc = periods.read().await;
    if doc.find(&period_id).is_none() {
        return Err(Error::not_found(format!("Voting period {period_id}")));
    }
    doc.archive(&period_id)
        .map_err(|e| Error::bad_request(e.to_string()))?;
    periods.write(&doc).await?;

    // The scheduled finalizer has nothing left to do.
    finalizers.cancel_period(&period_id).await;

    Ok(())
}

/// A single vote: one pilot backing one job.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteSpec {
    pub pilot_id: Id,
    pub job_id: Id,
}

/// The mutable fields of a voting period, deserialized only after the
/// raw body has passed validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodUpdate {
    state: PeriodState,
    #[serde(default)]
    job_votes: Vec<JobVote>,
    #[serde(default)]
    end_time: Option<String>,
}
