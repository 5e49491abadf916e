//! Flat-file JSON persistence.
//!
//! Each collection owns a single JSON file under the storage root.
//! Reads fail open: a missing or unparseable file yields the empty
//! default document. Writes replace the whole file; there is no
//! locking or atomic rename, so concurrent writers race and the last
//! write wins.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use rocket::{
    request::{self, FromRequest, Request},
    tokio::fs,
    State,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::model::settings::Settings;

/// A document type that can be directly read/written to/from its own
/// JSON file.
pub trait JsonFile: Serialize + DeserializeOwned + Default {
    /// The file name under the storage root.
    const FILENAME: &'static str;
}

/// The storage root holding all collection files.
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store, creating the root directory and seeding the
    /// settings file on first run.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        fs::create_dir_all(&store.root).await?;
        let settings = Repo::<Settings>::from_store(&store);
        if !settings.exists().await {
            settings.write(&Settings::default()).await?;
            info!("Seeded default settings at {}", settings.path().display());
        }
        Ok(store)
    }

    /// Path of the backing file for the given document type.
    fn path_of<T: JsonFile>(&self) -> PathBuf {
        self.root.join(T::FILENAME)
    }
}

/// A typed handle on one collection file.
pub struct Repo<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Repo<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: JsonFile> Repo<T> {
    /// Get a handle on this collection in the given store.
    pub fn from_store(store: &Store) -> Self {
        Self {
            path: store.path_of::<T>(),
            _marker: PhantomData,
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Does the backing file exist yet?
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Load the document, falling back to the empty default if the file
    /// is missing or does not parse. The two causes are logged
    /// distinctly: first-run absence is expected, corruption is not.
    pub async fn read(&self) -> T {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(
                    "{}: not readable ({err}), using empty default",
                    self.path.display()
                );
                return T::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    "{}: does not parse ({err}), using empty default",
                    self.path.display()
                );
                T::default()
            }
        }
    }

    /// Serialize the document pretty-printed and replace the file's
    /// entire contents.
    pub async fn write(&self, doc: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[rocket::async_trait]
impl<'r, T: JsonFile> FromRequest<'r> for Repo<T> {
    type Error = ();

    /// Get the store from the managed state and wrap it in a typed handle.
    ///
    /// Panics iff the [`Store`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = req.guard::<&State<Store>>().await.unwrap();
        request::Outcome::Success(Repo::from_store(store))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, SecondsFormat, Utc};
    use log4rs_test_utils::test_logging::init_logging_once_for;
    use tempfile::TempDir;

    use crate::model::voting::{JobVote, PeriodState, VotingPeriod, VotingPeriodsDocument};

    use super::*;

    async fn open_store() -> (Store, TempDir) {
        init_logging_once_for(["jobboard_backend"], None, None);
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).await.unwrap();
        (store, dir)
    }

    #[rocket::async_test]
    async fn seeds_default_settings() {
        let (store, _dir) = open_store().await;
        let settings = Repo::<Settings>::from_store(&store);
        assert!(settings.exists().await);
        assert_eq!(settings.read().await, Settings::default());
    }

    #[rocket::async_test]
    async fn missing_file_reads_empty() {
        let (store, _dir) = open_store().await;
        let periods = Repo::<VotingPeriodsDocument>::from_store(&store);
        assert!(!periods.exists().await);
        assert!(periods.read().await.periods.is_empty());
    }

    #[rocket::async_test]
    async fn corrupt_file_reads_empty() {
        let (store, _dir) = open_store().await;
        let periods = Repo::<VotingPeriodsDocument>::from_store(&store);
        fs::write(periods.path(), "{\"periods\": [{\"id\":").await.unwrap();
        assert!(periods.read().await.periods.is_empty());
    }

    #[rocket::async_test]
    async fn period_document_round_trip() {
        let (store, _dir) = open_store().await;
        let periods = Repo::<VotingPeriodsDocument>::from_store(&store);

        // Start from the explicit empty shape.
        periods.write(&VotingPeriodsDocument::default()).await.unwrap();
        assert!(periods.read().await.periods.is_empty());

        // One ongoing period ending a week from now.
        let end_time = (Utc::now() + Duration::days(7)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let period = VotingPeriod::new(
            vec![
                JobVote {
                    job_id: "job-1".into(),
                    votes: vec!["pilot-1".into()],
                },
                JobVote {
                    job_id: "job-2".into(),
                    votes: vec![],
                },
            ],
            Some(end_time),
        );
        let mut doc = VotingPeriodsDocument::default();
        doc.add(period.clone()).unwrap();
        periods.write(&doc).await.unwrap();

        let read_back = periods.read().await;
        assert_eq!(read_back.periods.len(), 1);
        assert_eq!(read_back.periods[0], period);

        // Add an archived period that ended yesterday.
        let end_time = (Utc::now() - Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut archived = VotingPeriod::new(vec![], Some(end_time));
        archived.state = PeriodState::Archived;
        let mut doc = read_back;
        doc.add(archived).unwrap();
        periods.write(&doc).await.unwrap();

        let read_back = periods.read().await;
        assert_eq!(read_back.periods.len(), 2);
        let ongoing = read_back
            .periods
            .iter()
            .filter(|p| p.state == PeriodState::Ongoing)
            .count();
        let archived = read_back
            .periods
            .iter()
            .filter(|p| p.state == PeriodState::Archived)
            .count();
        assert_eq!(ongoing, 1);
        assert_eq!(archived, 1);
    }
}
