use serde::{Deserialize, Serialize};

use crate::model::{id::Id, store::JsonFile};

/// A faction that posts jobs to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    /// Unique ID.
    pub id: Id,
    /// Faction name.
    pub name: String,
    /// Who they are and what they want.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path or URL of the faction emblem image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emblem: Option<String>,
}

/// The full contents of `factions.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FactionsDocument {
    pub factions: Vec<Faction>,
}

impl FactionsDocument {
    pub fn find(&self, id: &Id) -> Option<&Faction> {
        self.factions.iter().find(|faction| &faction.id == id)
    }

    pub fn find_mut(&mut self, id: &Id) -> Option<&mut Faction> {
        self.factions.iter_mut().find(|faction| &faction.id == id)
    }

    /// Remove the faction with the given ID, returning it if it was present.
    pub fn remove(&mut self, id: &Id) -> Option<Faction> {
        let index = self.factions.iter().position(|faction| &faction.id == id)?;
        Some(self.factions.remove(index))
    }
}

impl JsonFile for FactionsDocument {
    const FILENAME: &'static str = "factions.json";
}
