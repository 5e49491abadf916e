use rocket::{serde::json::Json, Route};

use crate::error::Result;
use crate::model::{settings::Settings, store::Repo};

pub fn routes() -> Vec<Route> {
    routes![get_settings, update_settings]
}

#[get("/settings")]
async fn get_settings(settings: Repo<Settings>) -> Json<Settings> {
    Json(settings.read().await)
}

#[put("/settings", data = "<new_settings>", format = "json")]
async fn update_settings(
    new_settings: Json<Settings>,
    settings: Repo<Settings>,
) -> Result<Json<Settings>> {
    settings.write(&new_settings).await?;
    Ok(new_settings)
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
    async fn get_and_update() {
        let (client, _dir) = test_client().await;

        // The store seeds defaults on first run.
        let response = client.get(uri!(get_settings)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let settings: Settings =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(settings, Settings::default());

        // Replace them.
        let response = client
            .put(uri!(update_settings))
            .header(ContentType::JSON)
            .body(
                json!({
                    "campaignName": "Sector 9 Rush",
                    "motd": "New jobs are up, get voting.",
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(get_settings)).dispatch().await;
        let settings: Settings =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(settings.campaign_name, "Sector 9 Rush");
        assert_eq!(settings.motd.as_deref(), Some("New jobs are up, get voting."));
    }
}
