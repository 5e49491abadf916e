use std::path::{Path, PathBuf};

use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::store::Store;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    data_dir: PathBuf,
}

impl Config {
    /// Directory holding the JSON collection files.
    /// Configured via `DATA_DIR`.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that opens the JSON file store under the configured data
/// directory, seeding it on first run, and places a [`Store`] into
/// managed state. Depends on [`ConfigFairing`] having run first.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "JSON Store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let data_dir = match rocket.state::<Config>() {
            Some(config) => config.data_dir().to_path_buf(),
            None => {
                error!("Config was not available when opening the store");
                return Err(rocket);
            }
        };
        info!("Opening store in {}...", data_dir.display());
        let store = match Store::open(data_dir).await {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to open store: {e}");
                return Err(rocket);
            }
        };
        info!("...store online!");

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}
