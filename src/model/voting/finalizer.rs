use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rocket::{
    fairing::{Fairing, Info, Kind},
    futures::future::{BoxFuture, FutureExt},
    tokio::sync::Mutex,
    Build, Rocket,
};

use crate::{
    error::Error,
    model::{
        id::Id,
        store::{Repo, Store},
    },
    scheduled_task::ScheduledTask,
};

use super::period::{PeriodState, VotingPeriod, VotingPeriodsDocument};

/// Map from period IDs to archival tasks.
type TaskMap = HashMap<Id, ScheduledTask<Result<(), Error>>>;

/// Period finalizers: scheduled tasks that archive an ongoing voting
/// period once its end time passes. Periods with no end time never
/// expire and get no task.
pub struct PeriodFinalizers {
    tasks: Arc<Mutex<TaskMap>>,
}

impl PeriodFinalizers {
    /// Create an empty set of period finalizers.
    pub fn new() -> Self {
        Self {
            tasks: Default::default(),
        }
    }

    /// Schedule a finalizer for every ongoing period with an end time.
    pub async fn schedule_periods(&self, store: &Store) {
        let repo = Repo::<VotingPeriodsDocument>::from_store(store);
        let doc = repo.read().await;
        for period in &doc.periods {
            if period.state == PeriodState::Ongoing {
                self.schedule_period(repo.clone(), period).await;
            }
        }
    }

    /// Schedule a finalizer for the given period.
    /// If one already exists, it will be rescheduled.
    pub async fn schedule_period(&self, repo: Repo<VotingPeriodsDocument>, period: &VotingPeriod) {
        let Some(end_time) = period.end_time_parsed() else {
            return;
        };
        let finalizer = Self::finalizer(period.id.clone(), repo, self.tasks.clone());
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.remove(&period.id) {
            task.cancel().await;
        }
        let finalizer_task = ScheduledTask::new(finalizer, end_time.with_timezone(&Utc));
        tasks.insert(period.id.clone(), finalizer_task);
    }

    /// Drop the pending finalizer for the given period, if any. Called
    /// when a period is archived by hand before its end time.
    pub async fn cancel_period(&self, period_id: &Id) {
        if let Some(task) = self.tasks.lock().await.remove(period_id) {
            task.cancel().await;
        }
    }

    /// Archive the period when the time comes.
    /// Since this is a recursive async function (for the retry path),
    /// we must use `BoxFuture` to avoid an infinitely-recursive state
    /// machine.
    fn finalizer(
        period_id: Id,
        repo: Repo<VotingPeriodsDocument>,
        tasks: Arc<Mutex<TaskMap>>,
    ) -> BoxFuture<'static, Result<(), Error>> {
        /// Nested function for error handling.
        async fn archive(period_id: &Id, repo: &Repo<VotingPeriodsDocument>) -> Result<(), Error> {
            debug!("Running finalizer for voting period {period_id}");
            let mut doc = repo.read().await;
            match doc.find_mut(period_id) {
                Some(period) if period.state == PeriodState::Ongoing => {
                    period.state = PeriodState::Archived;
                    repo.write(&doc).await?;
                    info!("Voting period {period_id} reached its end time and was archived");
                }
                _ => debug!("Finalizer for voting period {period_id} had nothing to do"),
            }
            Ok(())
        }

        async move {
            let result = archive(&period_id, &repo).await;
            match result {
                Ok(()) => {
                    tasks.lock().await.remove(&period_id);
                    trace!("Finalizer completed; removed self from list");
                }
                Err(ref e) => {
                    error!("Finalizer for voting period {period_id} failed: {e}");
                    // Re-schedule the finalizer.
                    const RETRY_INTERVAL_SECONDS: i64 = 300;
                    let retry = Self::finalizer(period_id.clone(), repo, tasks.clone());
                    let retry_time = Utc::now() + Duration::seconds(RETRY_INTERVAL_SECONDS);
                    let mut tasks_locked = tasks.lock().await;
                    tasks_locked.insert(period_id.clone(), ScheduledTask::new(retry, retry_time));
                    warn!("Failed finalizer will be retried in {RETRY_INTERVAL_SECONDS} seconds");
                }
            }
            result
        }
        .boxed()
    }
}

impl Default for PeriodFinalizers {
    fn default() -> Self {
        Self::new()
    }
}

/// A fairing that schedules finalizers for all ongoing periods during
/// Rocket ignition, and places a `PeriodFinalizers` into managed state.
/// This fairing depends on the store being available in managed state,
/// and so must be attached after the fairing responsible for that.
pub struct PeriodFinalizerFairing;

#[rocket::async_trait]
impl Fairing for PeriodFinalizerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Period Finalizers",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        info!("Scheduling voting period finalizers...");
        let finalizers = PeriodFinalizers::new();
        let store = match rocket.state::<Store>() {
            Some(store) => store,
            None => {
                error!("Store was not available when scheduling finalizers");
                return Err(rocket);
            }
        };
        finalizers.schedule_periods(store).await;
        info!("...voting period finalizers scheduled!");

        // Manage the state.
        rocket = rocket.manage(finalizers);
        Ok(rocket)
    }
}
