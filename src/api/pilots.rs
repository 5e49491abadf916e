use rocket::{serde::json::Json, Route};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    pilot::{Pilot, PilotsDocument},
    store::Repo,
};

pub fn routes() -> Vec<Route> {
    routes![get_pilots, get_pilot, create_pilot, update_pilot, delete_pilot]
}

#[get("/pilots")]
async fn get_pilots(pilots: Repo<PilotsDocument>) -> Json<Vec<Pilot>> {
    Json(pilots.read().await.pilots)
}

#[get("/pilots/<pilot_id>")]
async fn get_pilot(pilot_id: Id, pilots: Repo<PilotsDocument>) -> Result<Json<Pilot>> {
    let doc = pilots.read().await;
    let pilot = doc
        .find(&pilot_id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("Pilot {pilot_id}")))?;
    Ok(Json(pilot))
}

#[post("/pilots", data = "<spec>", format = "json")]
async fn create_pilot(spec: Json<PilotSpec>, pilots: Repo<PilotsDocument>) -> Result<Json<Pilot>> {
    let pilot = spec.0.into_pilot(Id::new());
    let mut doc = pilots.read().await;
    doc.pilots.push(pilot.clone());
    pilots.write(&doc).await?;
    Ok(Json(pilot))
}

#[put("/pilots/<pilot_id>", data = "<spec>", format = "json")]
async fn update_pilot(
    pilot_id: Id,
    spec: Json<PilotSpec>,
    pilots: Repo<PilotsDocument>,
) -> Result<Json<Pilot>> {
    let mut doc = pilots.read().await;
    let pilot = doc
        .pilots
        .iter_mut()
        .find(|pilot| pilot.id == pilot_id)
        .ok_or_else(|| Error::not_found(format!("Pilot {pilot_id}")))?;
    *pilot = spec.0.into_pilot(pilot_id);
    let pilot = pilot.clone();
    pilots.write(&doc).await?;
    Ok(Json(pilot))
}

#[delete("/pilots/<pilot_id>")]
async fn delete_pilot(pilot_id: Id, pilots: Repo<PilotsDocument>) -> Result<()> {
    let mut doc = pilots.read().await;
    doc.remove(&pilot_id)
        .ok_or_else(|| Error::not_found(format!("Pilot {pilot_id}")))?;
    pilots.write(&doc).await?;
    Ok(())
}

/// A pilot as submitted by the client.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotSpec {
    pub callsign: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PilotSpec {
    fn into_pilot(self, id: Id) -> Pilot {
        Pilot {
            id,
            callsign: self.callsign,
            name: self.name,
            notes: self.notes,
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

        // Create two pilots.
        for callsign in ["Nova", "Ratchet"] {
            let response = client
                .post(uri!(create_pilot))
                .header(ContentType::JSON)
                .body(json!({"callsign": callsign}).to_string())
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status());
        }

        let response = client.get(uri!(get_pilots)).dispatch().await;
        let pilots: Vec<Pilot> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(pilots.len(), 2);
        assert_eq!(pilots[0].callsign, "Nova");

        // Update the first.
        let id = pilots[0].id.clone();
        let response = client
            .put(format!("/pilots/{id}"))
            .header(ContentType::JSON)
            .body(json!({"callsign": "Nova", "name": "Val Reyes"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: Pilot = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(updated.name.as_deref(), Some("Val Reyes"));

        // Delete the second; one remains.
        let response = client
            .delete(format!("/pilots/{}", pilots[1].id))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let response = client.get(uri!(get_pilots)).dispatch().await;
        let pilots: Vec<Pilot> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(pilots.len(), 1);

        // Missing pilots are 404s.
        let response = client.get("/pilots/no-such-pilot").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
