use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    faction::{Faction, FactionsDocument},
    id::Id,
    job::JobsDocument,
    store::Repo,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_factions,
        get_faction,
        create_faction,
        update_faction,
        delete_faction,
    ]
}

#[get("/factions")]
async fn get_factions(factions: Repo<FactionsDocument>) -> Json<Vec<Faction>> {
    Json(factions.read().await.factions)
}

#[get("/factions/<faction_id>")]
async fn get_faction(faction_id: Id, factions: Repo<FactionsDocument>) -> Result<Json<Faction>> {
    let doc = factions.read().await;
    let faction = doc
        .find(&faction_id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("Faction {faction_id}")))?;
    Ok(Json(faction))
}

#[post("/factions", data = "<spec>", format = "json")]
async fn create_faction(
    spec: Json<FactionSpec>,
    factions: Repo<FactionsDocument>,
) -> Result<Json<Faction>> {
    let faction = spec.0.into_faction(Id::new());
    let mut doc = factions.read().await;
    doc.factions.push(faction.clone());
    factions.write(&doc).await?;
    Ok(Json(faction))
}

#[put("/factions/<faction_id>", data = "<spec>", format = "json")]
async fn update_faction(
    faction_id: Id,
    spec: Json<FactionSpec>,
    factions: Repo<FactionsDocument>,
) -> Result<Json<Faction>> {
    let mut doc = factions.read().await;
    let faction = doc
        .find_mut(&faction_id)
        .ok_or_else(|| Error::not_found(format!("Faction {faction_id}")))?;
    *faction = spec.0.into_faction(faction_id);
    let faction = faction.clone();
    factions.write(&doc).await?;
    Ok(Json(faction))
}

#[delete("/factions/<faction_id>")]
async fn delete_faction(
    faction_id: Id,
    factions: Repo<FactionsDocument>,
    jobs: Repo<JobsDocument>,
) -> Result<()> {
    let mut doc = factions.read().await;
    doc.remove(&faction_id)
        .ok_or_else(|| Error::not_found(format!("Faction {faction_id}")))?;
    factions.write(&doc).await?;

    // Clear dangling references from jobs.
    let mut jobs_doc = jobs.read().await;
    let mut changed = false;
    for job in &mut jobs_doc.jobs {
        if job.faction_id.as_ref() == Some(&faction_id) {
            job.faction_id = None;
            changed = true;
        }
    }
    if changed {
        jobs.write(&jobs_doc).await?;
    }

    Ok(())
}

/// A faction as submitted by the client.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emblem: Option<String>,
}

impl FactionSpec {
    fn into_faction(self, id: Id) -> Faction {
        Faction {
            id,
            name: self.name,
            description: self.description,
            emblem: self.emblem,
        }
    }
}
