use serde::{Deserialize, Serialize};

use crate::model::store::JsonFile;

/// Campaign-wide settings. A single document rather than a list; the
/// store seeds the defaults on first run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Campaign display name.
    pub campaign_name: String,
    /// Optional message of the day shown on the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            campaign_name: "Untitled Campaign".to_string(),
            motd: None,
        }
    }
}

impl JsonFile for Settings {
    const FILENAME: &'static str = "settings.json";
}
