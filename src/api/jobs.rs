use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    job::{Job, JobState, JobsDocument},
    store::Repo,
    voting::VotingPeriodsDocument,
};

pub fn routes() -> Vec<Route> {
    routes![get_jobs, get_job, create_job, update_job, delete_job]
}

#[get("/jobs")]
async fn get_jobs(jobs: Repo<JobsDocument>) -> Json<Vec<Job>> {
    Json(jobs.read().await.jobs)
}

#[get("/jobs/<job_id>")]
async fn get_job(job_id: Id, jobs: Repo<JobsDocument>) -> Result<Json<Job>> {
    let doc = jobs.read().await;
    let job = doc
        .find(&job_id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;
    Ok(Json(job))
}

#[post("/jobs", data = "<spec>", format = "json")]
async fn create_job(spec: Json<JobSpec>, jobs: Repo<JobsDocument>) -> Result<Json<Job>> {
    let job = spec.0.into_job(Id::new());
    let mut doc = jobs.read().await;
    doc.jobs.push(job.clone());
    jobs.write(&doc).await?;
    Ok(Json(job))
}

#[put("/jobs/<job_id>", data = "<spec>", format = "json")]
async fn update_job(
    job_id: Id,
    spec: Json<JobSpec>,
    jobs: Repo<JobsDocument>,
) -> Result<Json<Job>> {
    let mut doc = jobs.read().await;
    let job = doc
        .find_mut(&job_id)
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;
    *job = spec.0.into_job(job_id);
    let job = job.clone();
    jobs.write(&doc).await?;
    Ok(Json(job))
}

#[delete("/jobs/<job_id>")]
async fn delete_job(
    job_id: Id,
    jobs: Repo<JobsDocument>,
    periods: Repo<VotingPeriodsDocument>,
) -> Result<()> {
    let mut doc = jobs.read().await;
    doc.remove(&job_id)
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;
    jobs.write(&doc).await?;

    // Drop the job's vote entry from the ongoing period, if present.
    let mut period_doc = periods.read().await;
    if let Some(period) = period_doc.ongoing_mut() {
        let before = period.job_votes.len();
        period.job_votes.retain(|entry| entry.job_id != job_id);
        if period.job_votes.len() != before {
            periods.write(&period_doc).await?;
        }
    }

    Ok(())
}

/// A job as submitted by the client.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub faction_id: Option<Id>,
    /// New jobs default to `Pending` until the GM opens them up.
    #[serde(default)]
    pub state: JobState,
}

impl JobSpec {
    fn into_job(self, id: Id) -> Job {
        Job {
            id,
            name: self.name,
            description: self.description,
            reward: self.reward,
            faction_id: self.faction_id,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        serde::json::serde_json::{self, json},
    };

    use crate::test_client;

    use super::*;

    #[rocket::async_test]
    async fn crud() {
        let (client, _dir) = test_client().await;

        // Empty board to begin with.
        let response = client.get(uri!(get_jobs)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let jobs: Vec<Job> = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(jobs.is_empty());

        // Create a job.
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(
                json!({
                    "name": "Escort the convoy",
                    "description": "Three days through the dust belt.",
                    "reward": "1200 credits",
                    "state": "Active",
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let job: Job = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(job.name, "Escort the convoy");
        assert_eq!(job.state, JobState::Active);

        // It shows up in the list and by ID.
        let response = client.get(uri!(get_jobs)).dispatch().await;
        let jobs: Vec<Job> = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(jobs, vec![job.clone()]);
        let response = client.get(format!("/jobs/{}", job.id)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        // Update it.
        let response = client
            .put(format!("/jobs/{}", job.id))
            .header(ContentType::JSON)
            .body(json!({"name": "Escort the convoy", "state": "Complete"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: Job = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(updated.id, job.id);
        assert_eq!(updated.state, JobState::Complete);
        assert_eq!(updated.reward, None);

        // Delete it.
        let response = client.delete(format!("/jobs/{}", job.id)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let response = client.get(format!("/jobs/{}", job.id)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        // Missing IDs are 404s for update and delete too.
        let response = client
            .put("/jobs/no-such-job")
            .header(ContentType::JSON)
            .body(json!({"name": "ghost"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        let response = client.delete("/jobs/no-such-job").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[rocket::async_test]
    async fn delete_prunes_ongoing_period_votes() {
        use crate::model::pilot::Pilot;
        use crate::model::voting::VotingPeriod;

        let (client, _dir) = test_client().await;

        // An active job with a vote on it in the ongoing period.
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!({"name": "Escort the convoy", "state": "Active"}).to_string())
            .dispatch()
            .await;
        let job: Job = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let response = client
            .post("/pilots")
            .header(ContentType::JSON)
            .body(json!({"callsign": "Nova"}).to_string())
            .dispatch()
            .await;
        let pilot: Pilot = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let response = client
            .post("/voting-periods")
            .header(ContentType::JSON)
            .body(json!({}).to_string())
            .dispatch()
            .await;
        let period: VotingPeriod =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let response = client
            .post(format!("/voting-periods/{}/votes", period.id))
            .header(ContentType::JSON)
            .body(json!({"pilotId": pilot.id, "jobId": job.id}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        // Deleting the job drops its vote entry from the period.
        let response = client.delete(format!("/jobs/{}", job.id)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let response = client.get("/voting-periods/ongoing").dispatch().await;
        let period: VotingPeriod =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(period.job_votes.is_empty());
    }

    #[rocket::async_test]
    async fn new_jobs_default_to_pending() {
        let (client, _dir) = test_client().await;

        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!({"name": "Salvage run"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let job: Job = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(job.state, JobState::Pending);
    }
}
