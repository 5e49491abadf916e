#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod scheduled_task;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StoreFairing};
use crate::logging::LoggerFairing;
use crate::model::voting::PeriodFinalizerFairing;

/// Construct the Rocket instance from the default figment
/// (`Rocket.toml` plus `ROCKET_*` environment variables).
pub fn build() -> Rocket<Build> {
    assemble(rocket::build())
}

/// Mount the API and attach all fairings to the given Rocket instance.
/// Fairing order matters: the store needs the config, and the period
/// finalizers need the store.
fn assemble(base: Rocket<Build>) -> Rocket<Build> {
    base.mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(PeriodFinalizerFairing)
}

/// Build a client against a fresh temporary storage root.
/// The `TempDir` must be kept alive for the duration of the test.
#[cfg(test)]
pub(crate) async fn test_client() -> (rocket::local::asynchronous::Client, tempfile::TempDir) {
    let data_dir = tempfile::tempdir().unwrap();
    let figment = rocket::Config::figment().merge(("data_dir", data_dir.path().to_str().unwrap()));
    let client = rocket::local::asynchronous::Client::tracked(assemble(rocket::custom(figment)))
        .await
        .unwrap();
    (client, data_dir)
}
