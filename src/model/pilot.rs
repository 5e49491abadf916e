use serde::{Deserialize, Serialize};

use crate::model::{id::Id, store::JsonFile};

/// A pilot in the campaign roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pilot {
    /// Unique ID.
    pub id: Id,
    /// Callsign, as shown on the board.
    pub callsign: String,
    /// Full name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The full contents of `pilots.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PilotsDocument {
    pub pilots: Vec<Pilot>,
}

impl PilotsDocument {
    pub fn find(&self, id: &Id) -> Option<&Pilot> {
        self.pilots.iter().find(|pilot| &pilot.id == id)
    }

    /// Remove the pilot with the given ID, returning it if it was present.
    pub fn remove(&mut self, id: &Id) -> Option<Pilot> {
        let index = self.pilots.iter().position(|pilot| &pilot.id == id)?;
        Some(self.pilots.remove(index))
    }
}

impl JsonFile for PilotsDocument {
    const FILENAME: &'static str = "pilots.json";
}
